//! Root redirect and diagnostic endpoints.

use super::{boxed, redirect, RouteFilter};
use crate::error::ApiError;
use crate::resource::STUDENTS;
use log::{error, info, warn};
use roster_core::core_version;
use warp::{Filter, Rejection, Reply};

/// Mounts `/`, `/logs` and `/errors`.
pub fn routes() -> RouteFilter {
    let root = warp::path::end()
        .and(warp::get())
        .map(|| redirect(STUDENTS.html_base()));

    let logs = warp::path("logs")
        .and(warp::path::end())
        .and(warp::get())
        .map(write_sample_logs);

    let errors = warp::path("errors")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(report_error);

    root.or(logs).unify().or(errors).unify().boxed()
}

/// Writes one line per level so log shipping can be checked end to end.
fn write_sample_logs() -> Box<dyn Reply> {
    info!(
        "event=diagnostics_logs module=web status=ok level=info version={}",
        core_version()
    );
    warn!("event=diagnostics_logs module=web status=ok level=warn");
    error!("event=diagnostics_logs module=web status=ok level=error");
    boxed("Log messages written.")
}

/// Always fails, so error reporting can be checked end to end.
async fn report_error() -> Result<Box<dyn Reply>, Rejection> {
    Err(ApiError::Internal("diagnostic error requested via /errors".to_string()).into())
}
