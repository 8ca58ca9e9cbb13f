//! Receipt file naming and writing.

use std::path::{Path, PathBuf};

use jobsheet_core::JobRecord;

use crate::error::RenderError;

const FALLBACK_CUSTOMER: &str = "customer";

/// Make a customer name safe for a file name.
///
/// Each run of characters outside `[A-Za-z0-9_-]` becomes one `_`, leading and
/// trailing `_` are trimmed, and an empty result becomes `customer`.
pub fn sanitize_customer_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_CUSTOMER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `jobsheet_{code}_{customer}.pdf`; deterministic for a record.
pub fn receipt_file_name(record: &JobRecord) -> String {
    format!(
        "jobsheet_{}_{}.pdf",
        record.code,
        sanitize_customer_name(&record.customer_name)
    )
}

/// Write `bytes` to `dir/file_name`, creating `dir` if needed.
///
/// An existing file with the same name is replaced.
pub fn write_receipt(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|source| RenderError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_safe_characters() {
        assert_eq!(sanitize_customer_name("Ravi_Kumar-2"), "Ravi_Kumar-2");
    }

    #[test]
    fn collapses_runs_and_trims_underscores() {
        assert_eq!(sanitize_customer_name("  Ravi  Kumar (Salem) "), "Ravi_Kumar_Salem");
        assert_eq!(sanitize_customer_name("__a__"), "a");
        assert_eq!(sanitize_customer_name("a_!b"), "a__b");
    }

    #[test]
    fn non_ascii_letters_are_replaced() {
        assert_eq!(sanitize_customer_name("Zoë"), "Zo");
        assert_eq!(sanitize_customer_name("முருகன்"), FALLBACK_CUSTOMER);
    }

    #[test]
    fn punctuation_only_falls_back() {
        assert_eq!(sanitize_customer_name("!!! ..."), "customer");
        assert_eq!(sanitize_customer_name(""), "customer");
    }

    #[test]
    fn write_creates_directory_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("receipts").join("nested");

        let path = write_receipt(&dir, "a.pdf", b"first").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"first");

        let again = write_receipt(&dir, "a.pdf", b"second").unwrap();
        assert_eq!(again, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn write_failure_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = write_receipt(&blocker, "a.pdf", b"pdf").unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(err.to_string().contains("not-a-dir"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any customer name yields a non-empty file-safe stem.
            #[test]
            fn sanitized_names_are_file_safe(name in ".*") {
                let safe = sanitize_customer_name(&name);
                prop_assert!(!safe.is_empty());
                prop_assert!(!safe.starts_with('_') && !safe.ends_with('_'));
                prop_assert!(safe.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
            }
        }
    }
}
