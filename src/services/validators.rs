use serde_json::Value;

use crate::error::SLUG_EXISTS_MESSAGE;
use crate::models::{NewCourseRequest, UpdateCourseRequest};
use crate::validation::{self, FieldViolation};

const UNIQUE_VIOLATION_CODES: [&str; 2] = ["23505", "2067"];

pub fn validate_create_data(raw: &Value) -> Result<NewCourseRequest, String> {
    validation::validate_create(raw).map_err(|v| validation_message(&v))
}

pub fn validate_update_data(raw: &Value) -> Result<UpdateCourseRequest, String> {
    validation::validate_update(raw).map_err(|v| validation_message(&v))
}

pub fn validation_message(violations: &[FieldViolation]) -> String {
    format!("Ошибка валидации: {}", validation::join_violations(violations))
}

/// True when the store rejected a write because the slug is taken.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err.as_database_error() {
        Some(db_err) => {
            db_err.is_unique_violation()
                || db_err
                    .code()
                    .is_some_and(|code| UNIQUE_VIOLATION_CODES.iter().any(|c| code == *c))
        }
        None => false,
    }
}

/// Turns a failed write into a user-facing message.
///
/// `operation` is the noun of the action in the prepositional case,
/// e.g. `создании` or `обновлении`.
pub fn generate_error_message(operation: &str, err: &sqlx::Error) -> String {
    if is_unique_violation(err) {
        return SLUG_EXISTS_MESSAGE.to_string();
    }

    let message = match err.as_database_error() {
        Some(db_err) => db_err.message().to_string(),
        None => err.to_string(),
    };

    if message.trim().is_empty() {
        format!("Неизвестная ошибка при {} курса", operation)
    } else {
        message
    }
}
