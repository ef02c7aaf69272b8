use roster_core::{LocalImageStore, MemoryRecordRepository};
use roster_web::{routes, AppState};
use std::sync::Arc;
use warp::http::StatusCode;

fn app_state() -> Arc<AppState> {
    let images = LocalImageStore::new(std::env::temp_dir().join("roster-unused"), "/uploads");
    Arc::new(AppState::new(
        Arc::new(MemoryRecordRepository::new()),
        Arc::new(images),
    ))
}

#[tokio::test]
async fn root_redirects_to_students() {
    let app = routes(app_state());

    let res = warp::test::request().path("/").reply(&app).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(res.headers()["location"], "/students");
}

#[tokio::test]
async fn logs_endpoint_answers_ok() {
    let app = routes(app_state());

    let res = warp::test::request().path("/logs").reply(&app).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body().as_ref(), b"Log messages written.");
}

#[tokio::test]
async fn errors_endpoint_reports_internal_failure() {
    let app = routes(app_state());

    let res = warp::test::request().path("/errors").reply(&app).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let app = routes(app_state());

    let res = warp::test::request().path("/courses").reply(&app).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let uploads = warp::test::request()
        .path("/uploads/missing.png")
        .reply(&app)
        .await;
    assert_eq!(uploads.status(), StatusCode::NOT_FOUND);
}
