//! Parsing of numeric form fields.
//!
//! Rejected input leaves the caller's previous value untouched; nothing here
//! mutates state.

use crate::domain::AppError;

/// Parse `raw` as an unsigned integer within `min..=max`.
pub fn parse_in_range(field: &str, raw: &str, min: u32, max: u32) -> Result<u32, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::invalid_numeric(field, raw, "must be a whole number"));
    }
    let value: u32 = trimmed
        .parse()
        .map_err(|_| AppError::invalid_numeric(field, raw, format!("must be at most {}", max)))?;
    if value < min || value > max {
        return Err(AppError::invalid_numeric(
            field,
            raw,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(value)
}

/// Parse `raw` as an unsigned integer no smaller than `min`.
pub fn parse_at_least(field: &str, raw: &str, min: u32) -> Result<u32, AppError> {
    let value = parse_in_range(field, raw, 0, u32::MAX)?;
    if value < min {
        return Err(AppError::invalid_numeric(field, raw, format!("must be at least {}", min)));
    }
    Ok(value)
}
