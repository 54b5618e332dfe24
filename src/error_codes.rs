//! fdlink error codes
//!
//! Error codes follow the pattern: FDL-{CATEGORY}-{3-digit number}
//!
//! Categories (1-3 uppercase letters):
//! - LNK: Per-entity linking failures
//! - DB: Edge store errors
//! - CLI: Invalid command input
//!
//! Each error code is stable and should not be reused.

/// FDID has no content in the archive
pub const FDL_LNK_001_NOT_FOUND: &str = "FDL-LNK-001";

/// Reader reported a sibling sub-type
pub const FDL_LNK_002_UNSUPPORTED_VARIANT: &str = "FDL-LNK-002";

/// Reader could not decode the content
pub const FDL_LNK_003_DECODE_FAILED: &str = "FDL-LNK-003";

/// Content lookup failed
pub const FDL_LNK_004_READ_FAILED: &str = "FDL-LNK-004";

/// Type index missing for a kind
pub const FDL_LNK_005_UNCLASSIFIED: &str = "FDL-LNK-005";

/// Edge store write failed
pub const FDL_DB_001_STORE_FAILED: &str = "FDL-DB-001";

/// Database could not be opened
pub const FDL_DB_002_OPEN_FAILED: &str = "FDL-DB-002";

/// Invalid arguments
pub const FDL_CLI_001_INVALID_ARGS: &str = "FDL-CLI-001";

/// Error code documentation
///
/// | Code | Description | Remediation |
/// |------|-------------|-------------|
/// | FDL-LNK-001 | FDID not in archive | None; retried on the next run |
/// | FDL-LNK-002 | Unsupported variant | File is re-tagged automatically |
/// | FDL-LNK-003 | Decode failed | Check the reader for this format |
/// | FDL-LNK-004 | Read failed | Check archive storage |
/// | FDL-LNK-005 | Types not detected | Run type detection before linking |
/// | FDL-DB-001 | Store write failed | Check disk space and database integrity |
/// | FDL-DB-002 | Open failed | Check the `--db` path |
/// | FDL-CLI-001 | Invalid arguments | See `fdlink --help` |
pub const ERROR_CODE_DOCUMENTATION: &str = "Error code documentation available in source";

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [&str; 8] = [
        FDL_LNK_001_NOT_FOUND,
        FDL_LNK_002_UNSUPPORTED_VARIANT,
        FDL_LNK_003_DECODE_FAILED,
        FDL_LNK_004_READ_FAILED,
        FDL_LNK_005_UNCLASSIFIED,
        FDL_DB_001_STORE_FAILED,
        FDL_DB_002_OPEN_FAILED,
        FDL_CLI_001_INVALID_ARGS,
    ];

    #[test]
    fn test_error_codes_are_unique() {
        let mut unique = std::collections::HashSet::new();
        for code in ALL {
            assert!(unique.insert(code), "Duplicate error code detected: {}", code);
        }
    }

    #[test]
    fn test_error_code_format() {
        for code in ALL {
            let parts: Vec<&str> = code.split('-').collect();
            assert_eq!(parts.len(), 3, "Error code must have 3 parts: {}", code);
            assert_eq!(parts[0], "FDL");
            assert!((1..=3).contains(&parts[1].len()));
            assert!(parts[1].chars().all(|c| c.is_ascii_uppercase()));
            assert_eq!(parts[2].len(), 3);
            assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
