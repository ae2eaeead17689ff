//! Field rules for course payloads.
//!
//! Payloads arrive as loosely typed JSON. A shape pass over the raw object
//! catches type mismatches and remembers which nullable fields were sent;
//! the content rules live on [`CourseDraft`] as `validator` attributes.
//! Each known field is checked independently so that one bad field does not
//! hide the others; unknown fields are ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::{CourseLevel, NewCourseRequest, UpdateCourseRequest};

pub const TITLE_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 1000;
pub const SLUG_MAX: usize = 100;
pub const DURATION_MAX: usize = 50;

pub const REQUIRED: &str = "Поле обязательно для заполнения";
pub const TITLE_REQUIRED: &str = "Название курса обязательно";
pub const SLUG_REQUIRED: &str = "URL-адрес обязателен";
pub const INVALID_SLUG: &str = "Может содержать только латинские буквы, цифры и дефисы";
pub const INVALID_URL: &str = "Введите корректный URL";
pub const INVALID_LEVEL: &str = "Неверный уровень сложности";
pub const INVALID_ID: &str = "Неверный идентификатор курса";
pub const EXPECTED_STRING: &str = "Ожидалась строка";
pub const EXPECTED_BOOLEAN: &str = "Ожидалось логическое значение";
pub const EXPECTED_OBJECT: &str = "Ожидался объект";

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern compiles"));

/// Known fields in reporting order.
const FIELDS: [&str; 8] = [
    "title",
    "description",
    "slug",
    "cover_image_url",
    "duration",
    "level",
    "is_published",
    "id",
];

pub fn too_long(field: &str, max: usize) -> String {
    format!("Слишком длинный {}. Максимум {} символов", field, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Course fields after the shape pass. Limits mirror the `*_MAX` constants.
#[derive(Debug, Default, Deserialize, Validate)]
struct CourseDraft {
    #[validate(length(min = 1, max = 200))]
    title: Option<String>,
    #[validate(length(max = 1000))]
    description: Option<String>,
    #[validate(length(min = 1, max = 100), regex(path = *SLUG_PATTERN))]
    slug: Option<String>,
    #[validate(url)]
    cover_image_url: Option<String>,
    #[validate(length(max = 50))]
    duration: Option<String>,
    #[validate(custom(function = "known_level"))]
    level: Option<String>,
    is_published: Option<bool>,
    #[validate(custom(function = "course_id"))]
    id: Option<String>,
}

fn known_level(level: &str) -> Result<(), ValidationError> {
    level
        .parse::<CourseLevel>()
        .map(drop)
        .map_err(|_| ValidationError::new("level"))
}

fn course_id(id: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(id)
        .map(drop)
        .map_err(|_| ValidationError::new("id"))
}

/// Outcome of checking one payload.
struct Checked {
    draft: CourseDraft,
    /// Fields that were sent with an acceptable shape, `null` included.
    present: BTreeSet<&'static str>,
    messages: BTreeMap<&'static str, String>,
}

impl Checked {
    fn run(obj: &Map<String, Value>, mode: ValidationMode, required: &[&str]) -> Self {
        let mut messages = BTreeMap::new();
        let mut present = BTreeSet::new();
        let mut shaped = Map::new();

        for field in FIELDS {
            if field == "id" && mode == ValidationMode::Create {
                continue;
            }
            let Some(value) = obj.get(field) else {
                if required.contains(&field) {
                    messages.insert(field, REQUIRED.to_string());
                }
                continue;
            };
            match shape(field, value) {
                Ok(value) => {
                    present.insert(field);
                    shaped.insert(field.to_string(), value);
                }
                Err(message) => {
                    messages.insert(field, message.to_string());
                }
            }
        }

        let draft = match serde_json::from_value::<CourseDraft>(Value::Object(shaped)) {
            Ok(draft) => draft,
            Err(e) => {
                messages.insert("body", e.to_string());
                CourseDraft::default()
            }
        };

        if let Err(errors) = draft.validate() {
            collect_rule_messages(&draft, &errors, &mut messages);
        }

        Self {
            draft,
            present,
            messages,
        }
    }

    fn violations(&self) -> Vec<FieldViolation> {
        let body = self.messages.get("body").map(|m| FieldViolation::new("body", m.as_str()));
        FIELDS
            .iter()
            .filter_map(|field| {
                self.messages
                    .get(field)
                    .map(|message| FieldViolation::new(field, message.as_str()))
            })
            .chain(body)
            .collect()
    }

    /// Absent → `None`, explicit null or blank → `Some(None)`.
    fn nullable(&self, field: &str, value: Option<String>) -> Option<Option<String>> {
        self.present.contains(field).then_some(value)
    }
}

/// Rejects values of the wrong JSON type and turns blank nullable strings
/// into `null`.
fn shape(field: &str, value: &Value) -> Result<Value, &'static str> {
    match (field, value) {
        ("is_published", Value::Bool(_)) => Ok(value.clone()),
        ("is_published", _) => Err(EXPECTED_BOOLEAN),
        ("level", Value::String(_)) => Ok(value.clone()),
        ("level", _) => Err(INVALID_LEVEL),
        ("id", Value::String(_)) => Ok(value.clone()),
        ("id", _) => Err(INVALID_ID),
        ("description" | "cover_image_url" | "duration", Value::Null) => Ok(Value::Null),
        ("description" | "cover_image_url" | "duration", Value::String(s))
            if s.trim().is_empty() =>
        {
            Ok(Value::Null)
        }
        (_, Value::String(_)) => Ok(value.clone()),
        _ => Err(EXPECTED_STRING),
    }
}

fn collect_rule_messages(
    draft: &CourseDraft,
    errors: &ValidationErrors,
    messages: &mut BTreeMap<&'static str, String>,
) {
    let field_errors = errors.field_errors();
    for field in FIELDS {
        let Some(list) = field_errors.get(field) else {
            continue;
        };
        if let Some(message) = rule_message(draft, field, list) {
            messages.entry(field).or_insert(message);
        }
    }
}

/// Picks one message per field. A length failure outranks the pattern.
fn rule_message(draft: &CourseDraft, field: &str, errors: &[ValidationError]) -> Option<String> {
    let failed = |code: &str| errors.iter().any(|e| e.code == code);

    let message = match field {
        "title" if failed("length") => {
            length_message(draft.title.as_deref(), TITLE_REQUIRED, "название", TITLE_MAX)
        }
        "description" if failed("length") => too_long("описание", DESCRIPTION_MAX),
        "slug" if failed("length") => {
            length_message(draft.slug.as_deref(), SLUG_REQUIRED, "URL-адрес", SLUG_MAX)
        }
        "slug" if failed("regex") => INVALID_SLUG.to_string(),
        "cover_image_url" if failed("url") => INVALID_URL.to_string(),
        "duration" if failed("length") => too_long("продолжительность", DURATION_MAX),
        "level" => INVALID_LEVEL.to_string(),
        "id" => INVALID_ID.to_string(),
        _ => errors.first()?.to_string(),
    };
    Some(message)
}

fn length_message(value: Option<&str>, empty: &str, label: &str, max: usize) -> String {
    if value.is_some_and(str::is_empty) {
        empty.to_string()
    } else {
        too_long(label, max)
    }
}

pub fn validate_create(raw: &Value) -> Result<NewCourseRequest, Vec<FieldViolation>> {
    let obj = as_object(raw)?;
    let checked = Checked::run(obj, ValidationMode::Create, &["title", "slug"]);
    if !checked.messages.is_empty() {
        return Err(checked.violations());
    }

    let violations = checked.violations();
    let draft = checked.draft;
    match (draft.title, draft.slug) {
        (Some(title), Some(slug)) => Ok(NewCourseRequest {
            title,
            description: draft.description,
            slug,
            cover_image_url: draft.cover_image_url,
            duration: draft.duration,
            level: parse_level(draft.level).unwrap_or_default(),
            is_published: draft.is_published.unwrap_or(false),
        }),
        _ => Err(violations),
    }
}

pub fn validate_update(raw: &Value) -> Result<UpdateCourseRequest, Vec<FieldViolation>> {
    let obj = as_object(raw)?;
    let checked = Checked::run(obj, ValidationMode::Update, &["id"]);
    if !checked.messages.is_empty() {
        return Err(checked.violations());
    }

    let description = checked.nullable("description", checked.draft.description.clone());
    let cover_image_url = checked.nullable("cover_image_url", checked.draft.cover_image_url.clone());
    let duration = checked.nullable("duration", checked.draft.duration.clone());
    let violations = checked.violations();
    let draft = checked.draft;

    match draft.id {
        Some(id) => Ok(UpdateCourseRequest {
            id,
            title: draft.title,
            description,
            slug: draft.slug,
            cover_image_url,
            duration,
            level: parse_level(draft.level),
            is_published: draft.is_published,
        }),
        None => Err(violations),
    }
}

/// Checks one field in isolation and returns the first complaint, if any.
pub fn validate_field(mode: ValidationMode, name: &str, value: &Value) -> Option<String> {
    let mut obj = Map::new();
    obj.insert(name.to_string(), value.clone());
    let checked = Checked::run(&obj, mode, &[]);
    checked.messages.get(name).cloned()
}

/// Joins violations into one line, `field: message, field: message`.
pub fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>, Vec<FieldViolation>> {
    raw.as_object()
        .ok_or_else(|| vec![FieldViolation::new("body", EXPECTED_OBJECT)])
}

fn parse_level(level: Option<String>) -> Option<CourseLevel> {
    level.and_then(|s| s.parse().ok())
}
