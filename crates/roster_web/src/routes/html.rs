//! Server-rendered pages mounted at `/<resource>`.
//!
//! Add and edit accept multipart forms; an attached image is stored first and
//! its URL written to `imageUrl` before the record is saved.

use super::{boxed, record_id, redirect, PageQuery, RouteFilter};
use crate::error::ApiError;
use crate::form::{read_form, FormSubmission, MAX_FORM_BYTES};
use crate::render::{form_page, list_page, view_page, FormAction};
use crate::resource::Resource;
use crate::state::{run_blocking, with_state, AppState};
use log::info;
use roster_core::{store_optional_image, Record, DEFAULT_PAGE_SIZE};
use std::sync::Arc;
use warp::multipart::FormData;
use warp::{Filter, Rejection, Reply};

/// Mounts list/add/edit/view/delete pages for `resource`.
///
/// Literal segments (`add`, `edit`, `delete`) are matched before the bare
/// `/:id` view route.
pub fn routes(resource: Resource, state: Arc<AppState>) -> RouteFilter {
    let scope = move || warp::path(resource.segment);
    let multipart = || warp::multipart::form().max_length(MAX_FORM_BYTES);

    let list = scope()
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<PageQuery>())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |query, state| list_view(resource, query, state));

    let add_form = scope()
        .and(warp::path("add"))
        .and(warp::path::end())
        .and(warp::get())
        .map(move || {
            boxed(warp::reply::html(form_page(
                resource,
                &Record::default(),
                FormAction::Add,
            )))
        });

    let add_submit = scope()
        .and(warp::path("add"))
        .and(warp::path::end())
        .and(warp::post())
        .and(multipart())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |form, state| add_record(resource, form, state));

    let edit_form = scope()
        .and(record_id())
        .and(warp::path("edit"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |id, state| edit_view(resource, id, state));

    let edit_submit = scope()
        .and(record_id())
        .and(warp::path("edit"))
        .and(warp::path::end())
        .and(warp::post())
        .and(multipart())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |id, form, state| edit_record(resource, id, form, state));

    let delete = scope()
        .and(record_id())
        .and(warp::path("delete"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(Arc::clone(&state)))
        .and_then(move |id, state| delete_record(resource, id, state));

    let view = scope()
        .and(record_id())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(move |id, state| record_view(resource, id, state));

    list.or(add_form)
        .unify()
        .or(add_submit)
        .unify()
        .or(edit_form)
        .unify()
        .or(edit_submit)
        .unify()
        .or(delete)
        .unify()
        .or(view)
        .unify()
        .boxed()
}

async fn list_view(
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
    Ok(boxed(warp::reply::html(list_page(resource, &page))))
}

async fn add_record(
    resource: Resource,
    form: FormData,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let submission = read_form(form).await?;
    let saved = run_blocking(move || {
        let record = attach_image(&state, submission)?;
        Ok(state.service(resource).create(record)?)
    })
    .await?;

    info!(
        "event=record_add module=web status=ok collection={} has_image={}",
        resource.collection,
        saved.image_url.is_some()
    );
    Ok(redirect(resource.record_path(&saved.id)))
}

async fn edit_view(
    resource: Resource,
    id: String,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let record = run_blocking(move || Ok(state.service(resource).read(&id)?)).await?;
    Ok(boxed(warp::reply::html(form_page(
        resource,
        &record,
        FormAction::Edit,
    ))))
}

async fn edit_record(
    resource: Resource,
    id: String,
    form: FormData,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let submission = read_form(form).await?;
    let saved = run_blocking(move || {
        let record = attach_image(&state, submission)?;
        Ok(state.service(resource).update(&id, record)?)
    })
    .await?;

    Ok(redirect(resource.record_path(&saved.id)))
}

async fn record_view(
    resource: Resource,
    id: String,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    let record = run_blocking(move || Ok(state.service(resource).read(&id)?)).await?;
    Ok(boxed(warp::reply::html(view_page(resource, &record))))
}

async fn delete_record(
    resource: Resource,
    id: String,
    state: Arc<AppState>,
) -> Result<Box<dyn Reply>, Rejection> {
    run_blocking(move || Ok(state.service(resource).delete(&id)?)).await?;
    Ok(redirect(resource.html_base()))
}

fn attach_image(state: &AppState, submission: FormSubmission) -> Result<Record, ApiError> {
    let FormSubmission { mut record, image } = submission;
    if let Some(url) = store_optional_image(state.images(), image.as_ref())? {
        record.image_url = Some(url);
    }
    Ok(record)
}
