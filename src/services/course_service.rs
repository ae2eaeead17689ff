use std::sync::Arc;

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::db::{CourseStore, SqliteCourseStore};
use crate::error::{AppError, SLUG_EXISTS_MESSAGE};
use crate::models::{ApiResponse, Course};
use crate::services::validators;

/// Entry point for every course use case.
///
/// Each method resolves to an [`ApiResponse`]; failures are carried inside
/// the envelope rather than returned as `Err`. The service is cheap to clone
/// and callers decide how many instances they keep.
#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn CourseStore>,
}

impl CourseService {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    pub fn from_pool(db: SqlitePool) -> Self {
        Self::new(Arc::new(SqliteCourseStore::new(db)))
    }

    pub async fn get_courses(&self) -> ApiResponse<Vec<Course>> {
        self.store
            .select_all()
            .await
            .map_err(|e| {
                error!("Error fetching courses: {}", e);
                AppError::from(e)
            })
            .into()
    }

    pub async fn get_course_by_id(&self, id: &str) -> ApiResponse<Course> {
        match self.store.select_by_id(id).await {
            Ok(Some(course)) => ApiResponse::ok(course),
            Ok(None) => AppError::NotFound.into(),
            Err(e) => {
                error!("Error fetching course by id {}: {}", id, e);
                AppError::from(e).into()
            }
        }
    }

    pub async fn get_course_by_slug(&self, slug: &str) -> ApiResponse<Course> {
        match self.store.select_by_slug(slug).await {
            Ok(Some(course)) => ApiResponse::ok(course),
            Ok(None) => AppError::NotFound.into(),
            Err(e) => {
                error!("Error fetching course by slug {}: {}", slug, e);
                AppError::from(e).into()
            }
        }
    }

    pub async fn get_published_courses(&self) -> ApiResponse<Vec<Course>> {
        self.store
            .select_published()
            .await
            .map_err(|e| {
                error!("Error fetching published courses: {}", e);
                AppError::from(e)
            })
            .into()
    }

    /// Validates `raw`, rejects a taken slug, then inserts.
    ///
    /// The slug lookup only gives early feedback. Two concurrent creates can
    /// both pass it; the unique index on `courses.slug` decides, and the
    /// loser gets the same conflict message.
    pub async fn create_course(&self, raw: &Value) -> ApiResponse<Course> {
        self.try_create_course(raw).await.into()
    }

    async fn try_create_course(&self, raw: &Value) -> Result<Course, AppError> {
        let input = validators::validate_create_data(raw).map_err(|msg| {
            debug!("Rejected course create: {}", msg);
            AppError::Validation(msg)
        })?;

        if self.slug_taken(&input.slug, None).await {
            warn!("Course slug already exists: {}", input.slug);
            return Err(AppError::Conflict(SLUG_EXISTS_MESSAGE.to_string()));
        }

        let course = self.store.insert(&input).await.map_err(|e| {
            error!("Error creating course: {}", e);
            write_error("создании", &e)
        })?;

        info!("Course created successfully: {}", course.id);
        Ok(course)
    }

    /// Validates a partial update. A slug owned by the course being updated
    /// is not a conflict.
    pub async fn update_course(&self, raw: &Value) -> ApiResponse<Course> {
        self.try_update_course(raw).await.into()
    }

    async fn try_update_course(&self, raw: &Value) -> Result<Course, AppError> {
        let input = validators::validate_update_data(raw).map_err(|msg| {
            debug!("Rejected course update: {}", msg);
            AppError::Validation(msg)
        })?;

        if let Some(slug) = &input.slug {
            if self.slug_taken(slug, Some(&input.id)).await {
                warn!("Course slug already exists: {}", slug);
                return Err(AppError::Conflict(SLUG_EXISTS_MESSAGE.to_string()));
            }
        }

        let course = self
            .store
            .update(&input)
            .await
            .map_err(|e| {
                error!("Error updating course: {}", e);
                write_error("обновлении", &e)
            })?
            .ok_or(AppError::NotFound)?;

        info!("Course updated successfully: {}", course.id);
        Ok(course)
    }

    pub async fn delete_course(&self, id: &str) -> ApiResponse<()> {
        match self.store.delete(id).await {
            Ok(()) => {
                info!("Course deleted successfully: {}", id);
                ApiResponse::empty()
            }
            Err(e) => {
                error!("Error deleting course: {}", e);
                AppError::from(e).into()
            }
        }
    }

    pub async fn toggle_course_publish(&self, id: &str, is_published: bool) -> ApiResponse<Course> {
        match self.store.toggle_publish(id, is_published).await {
            Ok(Some(course)) => {
                let state = if is_published { "published" } else { "unpublished" };
                info!("Course {}: {}", state, id);
                ApiResponse::ok(course)
            }
            Ok(None) => AppError::NotFound.into(),
            Err(e) => {
                error!("Error toggling course publish status: {}", e);
                AppError::from(e).into()
            }
        }
    }

    /// Advisory check: a failed lookup counts as "not taken" and leaves the
    /// decision to the store.
    async fn slug_taken(&self, slug: &str, owner_id: Option<&str>) -> bool {
        match self.store.select_by_slug(slug).await {
            Ok(Some(existing)) => owner_id != Some(existing.id.as_str()),
            Ok(None) => false,
            Err(e) => {
                warn!("Slug lookup failed, relying on the unique index: {}", e);
                false
            }
        }
    }
}

fn write_error(operation: &str, err: &sqlx::Error) -> AppError {
    let message = validators::generate_error_message(operation, err);
    if validators::is_unique_violation(err) {
        AppError::Conflict(message)
    } else {
        AppError::Unexpected(message)
    }
}
