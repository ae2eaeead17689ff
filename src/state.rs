use sqlx::SqlitePool;

use crate::services::CourseService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub courses: CourseService,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        let courses = CourseService::from_pool(db.clone());
        Self { db, courses }
    }
}
