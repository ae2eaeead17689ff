use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::models::{Course, NewCourseRequest, Profile, UpdateCourseRequest};

/// Read/write access to the `courses` collection.
///
/// Every method is one round trip. Failures come back as values, with the
/// backend's own error attached.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn select_all(&self) -> Result<Vec<Course>, sqlx::Error>;
    async fn select_by_id(&self, id: &str) -> Result<Option<Course>, sqlx::Error>;
    async fn select_by_slug(&self, slug: &str) -> Result<Option<Course>, sqlx::Error>;
    async fn select_published(&self) -> Result<Vec<Course>, sqlx::Error>;
    async fn insert(&self, req: &NewCourseRequest) -> Result<Course, sqlx::Error>;
    async fn update(&self, req: &UpdateCourseRequest) -> Result<Option<Course>, sqlx::Error>;
    async fn delete(&self, id: &str) -> Result<(), sqlx::Error>;
    async fn toggle_publish(&self, id: &str, is_published: bool) -> Result<Option<Course>, sqlx::Error>;
}

#[derive(Clone)]
pub struct SqliteCourseStore {
    db: SqlitePool,
}

impl SqliteCourseStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn select_all(&self) -> Result<Vec<Course>, sqlx::Error> {
        fetch_courses(&self.db).await
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<Course>, sqlx::Error> {
        find_course_by_id(&self.db, id).await
    }

    async fn select_by_slug(&self, slug: &str) -> Result<Option<Course>, sqlx::Error> {
        find_course_by_slug(&self.db, slug).await
    }

    async fn select_published(&self) -> Result<Vec<Course>, sqlx::Error> {
        fetch_published_courses(&self.db).await
    }

    async fn insert(&self, req: &NewCourseRequest) -> Result<Course, sqlx::Error> {
        insert_course(&self.db, req).await
    }

    async fn update(&self, req: &UpdateCourseRequest) -> Result<Option<Course>, sqlx::Error> {
        update_course(&self.db, req).await
    }

    async fn delete(&self, id: &str) -> Result<(), sqlx::Error> {
        delete_course(&self.db, id).await
    }

    async fn toggle_publish(&self, id: &str, is_published: bool) -> Result<Option<Course>, sqlx::Error> {
        set_course_published(&self.db, id, is_published).await
    }
}

/// RFC 3339 UTC with fixed microsecond precision, so text order is time order.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, slug, cover_image_url, duration, level,
               order_index, is_published, created_at, updated_at
        FROM courses
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn fetch_published_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, slug, cover_image_url, duration, level,
               order_index, is_published, created_at, updated_at
        FROM courses
        WHERE is_published = 1
        ORDER BY order_index ASC, created_at DESC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn find_course_by_id(db: &SqlitePool, id: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, slug, cover_image_url, duration, level,
               order_index, is_published, created_at, updated_at
        FROM courses
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_course_by_slug(db: &SqlitePool, slug: &str) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, slug, cover_image_url, duration, level,
               order_index, is_published, created_at, updated_at
        FROM courses
        WHERE slug = ?1
        "#,
    )
    .bind(slug)
    .fetch_optional(db)
    .await
}

pub async fn insert_course(
    db: &SqlitePool,
    req: &NewCourseRequest,
) -> Result<Course, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = now_timestamp();

    sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses
            (id, title, description, slug, cover_image_url, duration, level,
            order_index, is_published, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?9)
        RETURNING id, title, description, slug, cover_image_url, duration, level,
                  order_index, is_published, created_at, updated_at
        "#,
    )
    .bind(&id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.slug)
    .bind(&req.cover_image_url)
    .bind(&req.duration)
    .bind(req.level)
    .bind(req.is_published)
    .bind(&now)
    .fetch_one(db)
    .await
}

/// Applies only the fields present in `req` and refreshes `updated_at`.
/// Returns `None` when no course has that id.
pub async fn update_course(
    db: &SqlitePool,
    req: &UpdateCourseRequest,
) -> Result<Option<Course>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE courses SET updated_at = ");
    qb.push_bind(now_timestamp());

    if let Some(title) = &req.title {
        qb.push(", title = ").push_bind(title.clone());
    }
    if let Some(description) = &req.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(slug) = &req.slug {
        qb.push(", slug = ").push_bind(slug.clone());
    }
    if let Some(cover_image_url) = &req.cover_image_url {
        qb.push(", cover_image_url = ").push_bind(cover_image_url.clone());
    }
    if let Some(duration) = &req.duration {
        qb.push(", duration = ").push_bind(duration.clone());
    }
    if let Some(level) = req.level {
        qb.push(", level = ").push_bind(level);
    }
    if let Some(is_published) = req.is_published {
        qb.push(", is_published = ").push_bind(is_published);
    }

    qb.push(" WHERE id = ").push_bind(req.id.clone());
    qb.push(
        " RETURNING id, title, description, slug, cover_image_url, duration, level, \
         order_index, is_published, created_at, updated_at",
    );

    let course = qb.build_query_as::<Course>().fetch_optional(db).await?;
    Ok(course)
}

pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_course_published(
    db: &SqlitePool,
    id: &str,
    is_published: bool,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses
        SET is_published = ?1,
            updated_at = ?2
        WHERE id = ?3
        RETURNING id, title, description, slug, cover_image_url, duration, level,
                  order_index, is_published, created_at, updated_at
        "#,
    )
    .bind(is_published)
    .bind(now_timestamp())
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn find_profile_by_id(db: &SqlitePool, id: &str) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(
        "SELECT id, username, full_name, avatar_url, role, created_at, updated_at FROM profiles WHERE id = ?"
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn upsert_profile(db: &SqlitePool, profile: &Profile) -> Result<Profile, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO profiles (id, username, full_name, avatar_url, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            username = excluded.username,
            full_name = excluded.full_name,
            avatar_url = excluded.avatar_url,
            role = excluded.role,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.username)
    .bind(&profile.full_name)
    .bind(&profile.avatar_url)
    .bind(profile.role)
    .bind(&profile.created_at)
    .bind(&profile.updated_at)
    .execute(db)
    .await?;

    find_profile_by_id(db, &profile.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}
