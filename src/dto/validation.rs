//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest display name accepted, in characters.
pub const MAX_NAME_CHARS: usize = 32;
/// Longest judge counter list accepted.
pub const MAX_JUDGE_COUNTS: usize = 8;

/// Validates that a display name is non-blank and at most [`MAX_NAME_CHARS`] characters.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("rin")    // Ok
/// validate_display_name("   ")    // Err - blank
/// ```
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let chars = name.chars().count();
    if chars > MAX_NAME_CHARS {
        let mut err = ValidationError::new("name_length");
        err.message = Some(
            format!("Name must be at most {MAX_NAME_CHARS} characters (got {chars})").into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a judge counter list holds between 1 and [`MAX_JUDGE_COUNTS`] entries.
pub fn validate_judge_counts(counts: &[u32]) -> Result<(), ValidationError> {
    if counts.is_empty() || counts.len() > MAX_JUDGE_COUNTS {
        let mut err = ValidationError::new("judge_count_list_length");
        err.message = Some(
            format!(
                "Judge count list must hold 1 to {MAX_JUDGE_COUNTS} entries (got {})",
                counts.len()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}
