use crate::error::{Result, RetroError};

/// Trims `value` and checks it is non-blank and at most `max_chars` long
pub fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RetroError::bad_request(format!("{} must not be blank", field)));
    }
    if trimmed.chars().count() > max_chars {
        return Err(RetroError::bad_request(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Like [`required_text`], but blank input means "absent"
pub fn optional_text(field: &str, value: Option<&str>, max_chars: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => required_text(field, text, max_chars).map(Some),
    }
}
