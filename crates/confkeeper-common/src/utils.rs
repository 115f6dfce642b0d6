//! Utility functions for confkeeper

use crate::error::{ConfkeeperError, Result};

/// Validate a key component (dataId, groupId, tenantId, role, username)
///
/// The value must be non-empty, at most `max_len` characters, and free of
/// control characters.
pub fn validate_identifier(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfkeeperError::validation(format!(
            "'{}' must not be empty",
            field
        )));
    }
    if value.chars().count() > max_len {
        return Err(ConfkeeperError::validation(format!(
            "'{}' exceeds {} characters",
            field, max_len
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(ConfkeeperError::validation(format!(
            "'{}' contains control characters",
            field
        )));
    }
    Ok(())
}

/// Reject a page request with a zero page number or page size
pub fn validate_page(page_no: u64, page_size: u64) -> Result<()> {
    if page_no == 0 {
        return Err(ConfkeeperError::validation("'pageNo' must be at least 1"));
    }
    if page_size == 0 {
        return Err(ConfkeeperError::validation("'pageSize' must be at least 1"));
    }
    Ok(())
}

/// Number of rows to skip for a 1-based page
///
/// Offsets that overflow or do not fit a signed 64-bit SQL bound are
/// rejected instead of wrapping.
pub fn page_offset(page_no: u64, page_size: u64) -> Result<u64> {
    validate_page(page_no, page_size)?;
    (page_no - 1)
        .checked_mul(page_size)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| ConfkeeperError::validation("'pageNo' is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("dataId", "app.yaml", 255).is_ok());
        assert!(validate_identifier("dataId", "", 255).is_err());
        assert!(validate_identifier("dataId", "   ", 255).is_err());
        assert!(validate_identifier("dataId", "a\nb", 255).is_err());
        assert!(validate_identifier("tenantId", &"t".repeat(129), 128).is_err());
        assert!(validate_identifier("tenantId", &"t".repeat(128), 128).is_ok());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(1, 10).is_ok());
        assert!(matches!(
            validate_page(0, 10),
            Err(ConfkeeperError::ValidationError(_))
        ));
        assert!(validate_page(1, 0).is_err());
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 10).unwrap(), 0);
        assert_eq!(page_offset(3, 10).unwrap(), 20);
        assert!(page_offset(0, 10).is_err());

        assert!(matches!(
            page_offset(u64::MAX, 10),
            Err(ConfkeeperError::ValidationError(_))
        ));
        assert!(matches!(
            page_offset(2, u64::MAX),
            Err(ConfkeeperError::ValidationError(_))
        ));
        // fits u64 but not a signed SQL offset
        assert!(page_offset(2, i64::MAX as u64 + 1).is_err());
        assert_eq!(page_offset(2, i64::MAX as u64).unwrap(), i64::MAX as u64);
    }

    proptest! {
        #[test]
        fn prop_printable_identifiers_within_limit_are_valid(s in "[a-zA-Z0-9_.:-]{1,64}") {
            prop_assert!(validate_identifier("dataId", &s, 64).is_ok());
        }

        #[test]
        fn prop_page_offset_never_panics(page_no in any::<u64>(), page_size in any::<u64>()) {
            if let Ok(offset) = page_offset(page_no, page_size) {
                prop_assert_eq!(offset / page_size, page_no - 1);
            }
        }
    }
}
