use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(CourseLevel::Beginner),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub cover_image_url: Option<String>,
    pub duration: Option<String>,
    pub level: CourseLevel,
    pub order_index: i64,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated payload for a new course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub title: String,
    pub description: Option<String>,
    pub slug: String,
    pub cover_image_url: Option<String>,
    pub duration: Option<String>,
    pub level: CourseLevel,
    pub is_published: bool,
}

/// Validated partial update.
///
/// Nullable columns use `Option<Option<_>>`: the outer `None` leaves the
/// column untouched, `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateCourseRequest {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub slug: Option<String>,
    pub cover_image_url: Option<Option<String>>,
    pub duration: Option<Option<String>>,
    pub level: Option<CourseLevel>,
    pub is_published: Option<bool>,
}

impl UpdateCourseRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
