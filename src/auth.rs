use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::UserRole;
use crate::state::AppState;

/// Header carrying the caller's user id, set by the identity proxy in front
/// of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

/// A user is an admin only if their profile says so. Lookup failures deny.
pub async fn is_admin(db: &SqlitePool, user_id: &str) -> bool {
    match repository::find_profile_by_id(db, user_id).await {
        Ok(Some(profile)) => profile.role == UserRole::Admin,
        Ok(None) => false,
        Err(e) => {
            warn!("Error fetching user role for {}: {}", user_id, e);
            false
        }
    }
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AppError::Unauthorized)?;

    if !is_admin(&state.db, user_id).await {
        debug!("admin access denied for {}", user_id);
        return Err(AppError::Forbidden);
    }

    Ok(next.run(req).await)
}
