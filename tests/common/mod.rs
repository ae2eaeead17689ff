#![allow(dead_code)]

use course_catalog::db;
use course_catalog::db::repository::{self, now_timestamp};
use course_catalog::models::{Profile, UserRole};
use sqlx::SqlitePool;

pub async fn setup_test_db() -> SqlitePool {
    db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db")
}

pub async fn create_profile(pool: &SqlitePool, id: &str, role: UserRole) -> Profile {
    let now = now_timestamp();
    let profile = Profile {
        id: id.to_string(),
        username: Some(id.to_string()),
        full_name: None,
        avatar_url: None,
        role,
        created_at: now.clone(),
        updated_at: now,
    };
    repository::upsert_profile(pool, &profile)
        .await
        .expect("Failed to create profile")
}
