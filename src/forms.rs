//! State behind the admin course editor.
//!
//! Values are kept per field name next to a map of per-field error
//! messages. Both are updated as the user types and leaves fields.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::models::{Course, CourseLevel};
use crate::validation::{self, ValidationMode};

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9а-яё\s-]").expect("slug filter compiles"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));
static DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("dash pattern compiles"));

/// Derives a slug suggestion from a course title.
///
/// Cyrillic letters survive, so the suggestion may still need editing before
/// it passes slug validation.
pub fn generate_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    let filtered = NON_SLUG_CHARS.replace_all(&lower, "");
    let dashed = WHITESPACE.replace_all(&filtered, "-");
    DASHES.replace_all(&dashed, "-").trim().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit,
}

impl FormMode {
    fn validation_mode(self) -> ValidationMode {
        match self {
            FormMode::Create => ValidationMode::Create,
            FormMode::Edit => ValidationMode::Update,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CourseForm {
    mode: FormMode,
    values: BTreeMap<String, Value>,
    errors: BTreeMap<String, String>,
    dirty: bool,
    server_error: Option<String>,
}

impl Default for CourseForm {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseForm {
    /// Empty form for a new course.
    pub fn new() -> Self {
        let values = [
            ("title", json!("")),
            ("description", json!("")),
            ("slug", json!("")),
            ("duration", json!("")),
            ("level", json!(CourseLevel::Beginner.as_str())),
            ("cover_image_url", json!("")),
            ("is_published", json!(false)),
        ];
        Self::with_values(FormMode::Create, values)
    }

    /// Form pre-filled from an existing course.
    pub fn edit(course: &Course) -> Self {
        let values = [
            ("id", json!(course.id)),
            ("title", json!(course.title)),
            ("description", json!(course.description.clone().unwrap_or_default())),
            ("slug", json!(course.slug)),
            ("duration", json!(course.duration.clone().unwrap_or_default())),
            ("level", json!(course.level.as_str())),
            ("cover_image_url", json!(course.cover_image_url.clone().unwrap_or_default())),
            ("is_published", json!(course.is_published)),
        ];
        Self::with_values(FormMode::Edit, values)
    }

    fn with_values<const N: usize>(mode: FormMode, values: [(&str, Value); N]) -> Self {
        Self {
            mode,
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            errors: BTreeMap::new(),
            dirty: false,
            server_error: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Stores a new value. A field that already shows an error is
    /// rechecked right away; others wait for blur.
    pub fn handle_change(&mut self, name: &str, value: Value) {
        let had_error = self.errors.contains_key(name);
        self.values.insert(name.to_string(), value);
        self.dirty = true;

        if had_error {
            self.revalidate(name);
        }
    }

    pub fn handle_blur(&mut self, name: &str) {
        self.revalidate(name);
    }

    /// Sets the title and replaces the slug with one derived from it.
    pub fn handle_title_change(&mut self, title: &str) {
        self.values.insert("title".to_string(), json!(title));
        self.values.insert("slug".to_string(), json!(generate_slug(title)));
        self.dirty = true;

        self.revalidate("title");
        self.revalidate("slug");
    }

    /// Checks the whole form and replaces the error map with the outcome.
    pub fn validate_form(&mut self) -> bool {
        let payload = self.payload();
        let violations = match self.mode {
            FormMode::Create => validation::validate_create(&payload).err(),
            FormMode::Edit => validation::validate_update(&payload).err(),
        };

        self.errors = violations
            .unwrap_or_default()
            .into_iter()
            .map(|v| (v.field, v.message))
            .collect();
        self.errors.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors() && self.non_empty("title") && self.non_empty("slug")
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The JSON object to hand to the course service.
    pub fn payload(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }

    pub fn set_server_error(&mut self, error: Option<String>) {
        self.server_error = error;
    }

    pub fn server_error(&self) -> Option<&str> {
        self.server_error.as_deref()
    }

    fn revalidate(&mut self, name: &str) {
        let value = self.values.get(name).cloned().unwrap_or(Value::Null);
        match validation::validate_field(self.mode.validation_mode(), name, &value) {
            Some(message) => {
                self.errors.insert(name.to_string(), message);
            }
            None => {
                self.errors.remove(name);
            }
        }
    }

    fn non_empty(&self, name: &str) -> bool {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    }
}
