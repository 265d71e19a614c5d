//! Error types for the E2E suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Unexpected status: expected {expected}, got {actual} (body: {body})")]
    UnexpectedStatus {
        expected: String,
        actual: u16,
        body: String,
    },

    #[error("Expected exactly one <{tag}> in response, found {matches}")]
    Extraction { tag: String, matches: usize },

    #[error("SOAP template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Test case not found: {0}")]
    CaseNotFound(String),

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("Invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// Fail the current case with a formatted assertion message unless `$cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::E2eError::AssertionFailed(format!($($arg)+)));
        }
    };
}

/// Fail the current case unless both sides compare equal.
#[macro_export]
macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    return Err($crate::error::E2eError::AssertionFailed(format!(
                        "`{}` == `{}` failed: {:?} != {:?}",
                        stringify!($left),
                        stringify!($right),
                        left,
                        right
                    )));
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_positive(n: i64) -> E2eResult<()> {
        ensure!(n > 0, "expected positive, got {}", n);
        Ok(())
    }

    fn check_same(a: &str, b: &str) -> E2eResult<()> {
        ensure_eq!(a, b);
        Ok(())
    }

    #[test]
    fn ensure_passes_and_fails() {
        assert!(check_positive(3).is_ok());
        let err = check_positive(-1).unwrap_err();
        assert_eq!(err.to_string(), "Assertion failed: expected positive, got -1");
    }

    #[test]
    fn ensure_eq_reports_both_sides() {
        assert!(check_same("a", "a").is_ok());
        let err = check_same("a", "b").unwrap_err().to_string();
        assert!(err.contains("\"a\" != \"b\""), "{err}");
    }

    #[test]
    fn extraction_error_names_tag() {
        let err = E2eError::Extraction { tag: "ns2:Id".into(), matches: 2 };
        assert_eq!(err.to_string(), "Expected exactly one <ns2:Id> in response, found 2");
    }
}
