//! JSON API mounted at `/api/<resource>`.

use super::{boxed, record_id, PageQuery, RouteFilter};
use crate::resource::Resource;
use crate::state::{run_blocking, with_state, AppState};
use roster_core::{Record, DEFAULT_PAGE_SIZE};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Largest accepted JSON body (100 KiB).
const JSON_BODY_LIMIT: u64 = 100 * 1024;

/// Mounts list/create/read/update/delete for `resource`.
pub fn routes(resource: Resource, state: Arc<AppState>) -> RouteFilter {
    let scope = move || warp::path("api").and(warp::path(resource.segment));
    let json_body = || {
        warp::body::content_length_limit(JSON_BODY_LIMIT).and(warp::body::json::<Record>())
    };

    let list = scope()
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |query, state| list_records(resource, query, state));

    let create = scope()
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |record, state| create_record(resource, record, state));

    let read = scope()
        .and(record_id())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |id, state| read_record(resource, id, state));

    let update = scope()
        .and(record_id())
        .and(warp::path::end())
        .and(warp::put())
        .and(json_body())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |id, record, state| update_record(resource, id, record, state));

    let delete = scope()
        .and(record_id())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_state(state))
        .and_then(move |id, state| delete_record(resource, id, state));

    list.or(create)
        .unify()
        .or(read)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

async fn list_records(
    resource: Resource,
    query: PageQuery,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let page = run_blocking(move || {
        Ok(state
            .service(resource)
            .list(DEFAULT_PAGE_SIZE, query.page_token.as_deref())?)
    })
    .await?;
    Ok(boxed(warp::reply::json(&page)))
}

async fn create_record(
    resource: Resource,
    record: Record,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let created = run_blocking(move || Ok(state.service(resource).create(record)?)).await?;
    Ok(boxed(warp::reply::json(&created)))
}

async fn read_record(
    resource: Resource,
    id: String,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let record = run_blocking(move || Ok(state.service(resource).read(&id)?)).await?;
    Ok(boxed(warp::reply::json(&record)))
}

async fn update_record(
    resource: Resource,
    id: String,
    record: Record,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let updated = run_blocking(move || Ok(state.service(resource).update(&id, record)?)).await?;
    Ok(boxed(warp::reply::json(&updated)))
}

async fn delete_record(
    resource: Resource,
    id: String,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    run_blocking(move || Ok(state.service(resource).delete(&id)?)).await?;
    Ok(boxed(warp::reply::with_status("OK", StatusCode::OK)))
}
