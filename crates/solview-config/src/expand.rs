//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Only braced references are expanded. A bare `$` (as in `$path`) is kept
//! literally, even next to a braced reference.

use std::sync::LazyLock;

use regex::Regex;

use crate::ConfigError;

static BRACED_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").expect("invalid env reference regex"));

/// Expand `${...}` references in `value`.
///
/// Each reference is expanded on its own, so text between references is
/// copied through untouched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;

    for reference in BRACED_REF.find_iter(value) {
        expanded.push_str(&value[last..reference.start()]);
        expanded.push_str(&expand_reference(reference.as_str(), field)?);
        last = reference.end();
    }
    expanded.push_str(&value[last..]);

    Ok(expanded)
}

/// Expand a single `${VAR}` or `${VAR:-default}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SOLVIEW_TEST_KROKI", "https://kroki.internal");
        }
        let result = expand_env("${SOLVIEW_TEST_KROKI}", "diagrams.kroki_url").unwrap();
        assert_eq!(result, "https://kroki.internal");
        unsafe {
            std::env::remove_var("SOLVIEW_TEST_KROKI");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SOLVIEW_UNSET_KROKI");
        }
        let result =
            expand_env("${SOLVIEW_UNSET_KROKI:-https://kroki.io}", "diagrams.kroki_url").unwrap();
        assert_eq!(result, "https://kroki.io");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SOLVIEW_MISSING_VAR");
        }
        let err = expand_env("${SOLVIEW_MISSING_VAR}", "diagrams.kroki_url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("SOLVIEW_MISSING_VAR"));
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    #[test]
    fn test_expand_literal_unchanged() {
        let result = expand_env("https://kroki.io/$path", "diagrams.kroki_url").unwrap();
        assert_eq!(result, "https://kroki.io/$path");
    }

    #[test]
    fn test_bare_dollar_kept_next_to_braced_reference() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SOLVIEW_UNSET_HOST");
            std::env::remove_var("suffix");
        }
        let result = expand_env(
            "${SOLVIEW_UNSET_HOST:-https://kroki.io}/$suffix",
            "diagrams.kroki_url",
        )
        .unwrap();
        assert_eq!(result, "https://kroki.io/$suffix");
    }

    #[test]
    fn test_expand_several_references() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SOLVIEW_TEST_SCHEME", "http");
            std::env::remove_var("SOLVIEW_UNSET_PORT");
        }
        let result = expand_env(
            "${SOLVIEW_TEST_SCHEME}://kroki:${SOLVIEW_UNSET_PORT:-8000}",
            "diagrams.kroki_url",
        )
        .unwrap();
        assert_eq!(result, "http://kroki:8000");
        unsafe {
            std::env::remove_var("SOLVIEW_TEST_SCHEME");
        }
    }
}
