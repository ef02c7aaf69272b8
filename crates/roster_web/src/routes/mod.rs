//! HTTP route table.
//!
//! # Responsibility
//! - Mount the JSON API and HTML pages once per `Resource`.
//! - Attach request logging and the shared rejection handler.

pub mod api;
pub mod diagnostics;
pub mod html;

use crate::error::{handle_rejection, ApiError};
use crate::resource::RESOURCES;
use crate::state::AppState;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::http::{header::LOCATION, StatusCode};
use warp::{Filter, Rejection, Reply};

/// Common shape of every route group so they can be chained in a loop.
pub type RouteFilter = BoxedFilter<(Box<dyn Reply>,)>;

const ACCESS_LOG_TARGET: &str = "roster::access";

/// `?pageToken=` query accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

/// Builds the complete application filter.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let mut app = diagnostics::routes();

    for resource in RESOURCES {
        app = app
            .or(api::routes(resource, Arc::clone(&state)))
            .unify()
            .or(html::routes(resource, Arc::clone(&state)))
            .unify()
            .boxed();
    }

    if let Some(dir) = state.upload_dir() {
        app = app.or(uploads(dir)).unify().boxed();
    }

    app.with(warp::log(ACCESS_LOG_TARGET))
        .recover(handle_rejection)
}

fn uploads(dir: &Path) -> RouteFilter {
    warp::path("uploads")
        .and(warp::get())
        .and(warp::fs::dir(dir.to_path_buf()))
        .map(|file: warp::fs::File| Box::new(file) as Box<dyn Reply>)
        .boxed()
}

/// Record id path parameter, percent-decoded.
pub(crate) fn record_id() -> impl Filter<Extract = (String,), Error = Rejection> + Clone {
    warp::path::param::<String>().and_then(|raw: String| async move {
        percent_decode_str(&raw)
            .decode_utf8()
            .map(|id| id.into_owned())
            .map_err(|_| {
                Rejection::from(ApiError::BadRequest(format!(
                    "record id `{raw}` is not valid UTF-8"
                )))
            })
    })
}

/// Boxes a reply so differently typed handlers share one route type.
pub(crate) fn boxed<R: Reply + 'static>(reply: R) -> Box<dyn Reply> {
    Box::new(reply)
}

/// `302 Found` pointing at `location`.
pub(crate) fn redirect(location: String) -> Box<dyn Reply> {
    boxed(warp::reply::with_header(
        StatusCode::FOUND,
        LOCATION,
        location,
    ))
}
