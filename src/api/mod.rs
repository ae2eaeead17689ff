use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::middleware;
use axum::routing::post;
use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::auth::require_admin;
use crate::error::AppError;
use crate::models::{ApiResponse, Course};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct TogglePublishRequest {
    is_published: bool,
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/courses", get(list_all_courses).post(create_course))
        .route(
            "/courses/{id}",
            get(get_course).patch(update_course).delete(delete_course),
        )
        .route("/courses/{id}/publish", post(toggle_publish))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_published_courses))
        .route("/courses/{slug}", get(get_course_by_slug))
        .nest("/admin", admin)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> ApiResponse<&'static str> {
    match sqlx::query("select 1").execute(&state.db).await {
        Ok(_) => ApiResponse::ok("ok"),
        Err(e) => {
            error!("health check failed: {}", e);
            AppError::from(e).into()
        }
    }
}

async fn list_published_courses(State(state): State<AppState>) -> ApiResponse<Vec<Course>> {
    state.courses.get_published_courses().await
}

async fn get_course_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResponse<Course> {
    state.courses.get_course_by_slug(&slug).await
}

async fn list_all_courses(State(state): State<AppState>) -> ApiResponse<Vec<Course>> {
    state.courses.get_courses().await
}

async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<Course> {
    state.courses.get_course_by_id(&id).await
}

async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Course>, AppError> {
    let Json(raw) = payload?;
    Ok(state.courses.create_course(&raw).await)
}

async fn update_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Course>, AppError> {
    let Json(mut raw) = payload?;
    if let Some(obj) = raw.as_object_mut() {
        obj.insert("id".to_string(), Value::String(id));
    }
    Ok(state.courses.update_course(&raw).await)
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResponse<()> {
    state.courses.delete_course(&id).await
}

async fn toggle_publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TogglePublishRequest>, JsonRejection>,
) -> Result<ApiResponse<Course>, AppError> {
    let Json(req) = payload?;
    Ok(state.courses.toggle_course_publish(&id, req.is_published).await)
}
