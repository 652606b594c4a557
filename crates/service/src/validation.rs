//! Input checks run before a collection is mutated.
//!
//! Each function returns the first failing condition as
//! `ServiceError::Validation`; no function touches storage.

use serde_json::{Map, Value};

use crate::errors::ServiceError;

pub const MIN_AUTHOR_CHARS: usize = 2;
pub const MIN_MESSAGE_CHARS: usize = 5;

pub const USER_FIELDS_REQUIRED: &str = "ID, name, and email are required";
pub const USER_ID_INVALID: &str = "User ID must be a non-empty string";
pub const COMMENT_FIELDS_REQUIRED: &str = "Author and message are required";
pub const AUTHOR_TOO_SHORT: &str = "Author name must be at least 2 characters";
pub const MESSAGE_TOO_SHORT: &str = "Message must be at least 5 characters";

fn non_empty_str<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// `id`, `name` and `email` must all be non-empty strings.
pub fn validate_new_user(fields: &Map<String, Value>) -> Result<(), ServiceError> {
    let all_present = ["id", "name", "email"]
        .iter()
        .all(|key| non_empty_str(fields, key).is_some());
    if !all_present {
        return Err(ServiceError::Validation(USER_FIELDS_REQUIRED.into()));
    }
    Ok(())
}

/// Checks presence, then author length, then message length, and returns
/// the trimmed `(author, message)` pair.
pub fn validate_new_comment(
    author: Option<&str>,
    message: Option<&str>,
) -> Result<(String, String), ServiceError> {
    let (author, message) = match (author, message) {
        (Some(a), Some(m)) if !a.is_empty() && !m.is_empty() => (a.trim(), m.trim()),
        _ => return Err(ServiceError::Validation(COMMENT_FIELDS_REQUIRED.into())),
    };
    if author.chars().count() < MIN_AUTHOR_CHARS {
        return Err(ServiceError::Validation(AUTHOR_TOO_SHORT.into()));
    }
    if message.chars().count() < MIN_MESSAGE_CHARS {
        return Err(ServiceError::Validation(MESSAGE_TOO_SHORT.into()));
    }
    Ok((author.to_string(), message.to_string()))
}
