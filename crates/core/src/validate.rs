//! Small shared input checks.

use crate::error::{DomainError, DomainResult};

/// Longest name accepted for stores, materials and products.
pub const MAX_NAME_LEN: usize = 40;

/// Trim and check a display name: non-empty and at most `max_len` characters.
pub fn name(value: &str, field: &str, max_len: usize) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}
