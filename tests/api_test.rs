mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use course_catalog::api::router;
use course_catalog::auth::USER_ID_HEADER;
use course_catalog::models::UserRole;
use course_catalog::state::AppState;
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{create_profile, setup_test_db};

const ADMIN_ID: &str = "admin-1";
const USER_ID: &str = "user-1";

async fn setup_app() -> Router {
    let pool = setup_test_db().await;
    create_profile(&pool, ADMIN_ID, UserRole::Admin).await;
    create_profile(&pool, USER_ID, UserRole::User).await;
    router(AppState::new(pool))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, user, body.map(|b| b.to_string())).await
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body)),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is not json")
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let app = setup_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"], json!("ok"));
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = setup_app().await;

    let (status, body) = send(&app, Method::GET, "/admin/courses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send(&app, Method::GET, "/admin/courses", Some(USER_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::GET, "/admin/courses", Some("nobody"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/admin/courses", Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_course_lifecycle_over_http() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/admin/courses",
        Some(ADMIN_ID),
        Some(json!({ "title": "Rust", "slug": "rust", "level": "advanced" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["error"], Value::Null);
    let id = body["data"]["id"].as_str().expect("id").to_string();

    // drafts are not public
    let (_, body) = send(&app, Method::GET, "/courses", None, None).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/admin/courses/{}/publish", id),
        Some(ADMIN_ID),
        Some(json!({ "is_published": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_published"], json!(true));

    let (status, body) = send(&app, Method::GET, "/courses/rust", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], json!("advanced"));

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/admin/courses/{}", id),
        Some(ADMIN_ID),
        Some(json!({ "title": "Rust 2024" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], json!("Rust 2024"));

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/admin/courses/{}", id),
        Some(ADMIN_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/admin/courses/{}", id),
        Some(ADMIN_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_statuses() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/admin/courses",
        Some(ADMIN_ID),
        Some(json!({ "title": "No slug" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"], Value::Null);

    let payload = json!({ "title": "Dup", "slug": "dup" });
    send(&app, Method::POST, "/admin/courses", Some(ADMIN_ID), Some(payload.clone())).await;
    let (status, body) =
        send(&app, Method::POST, "/admin/courses", Some(ADMIN_ID), Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("Курс с таким URL-адресом уже существует"));

    let (status, body) = send(&app, Method::GET, "/courses/missing-slug", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Курс не найден"));
}

#[tokio::test]
async fn test_unreadable_bodies_get_the_envelope() {
    let app = setup_app().await;

    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/admin/courses",
        Some(ADMIN_ID),
        Some("{not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
    assert!(body["error"].as_str().expect("error text").starts_with("Ошибка валидации"));

    let (_, created) = send(
        &app,
        Method::POST,
        "/admin/courses",
        Some(ADMIN_ID),
        Some(json!({ "title": "Rust", "slug": "rust" })),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/admin/courses/{}/publish", id),
        Some(ADMIN_ID),
        Some(json!({ "is_published": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());

    let (status, body) = send_raw(
        &app,
        Method::PATCH,
        &format!("/admin/courses/{}", id),
        Some(ADMIN_ID),
        Some("[1,".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    // the course is untouched
    let (_, body) = send(&app, Method::GET, &format!("/admin/courses/{}", id), Some(ADMIN_ID), None).await;
    assert_eq!(body["data"]["is_published"], json!(false));
}
