//! Name validation for minds and datasources.
//!
//! Names must start with a letter and contain only ASCII letters, digits or
//! underscores. Minds allow up to 32 characters, datasources up to 62.
//! Validation runs before any request is built, so a bad name never reaches
//! the server.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, NameKind, Result};

static MIND_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,31}$").expect("valid mind name regex"));

static DATASOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,61}$").expect("valid datasource name regex")
});

/// Validate a mind name.
pub fn validate_mind_name(name: &str) -> Result<()> {
    check(&MIND_NAME, NameKind::Mind, name)
}

/// Validate a datasource name.
pub fn validate_datasource_name(name: &str) -> Result<()> {
    check(&DATASOURCE_NAME, NameKind::Datasource, name)
}

fn check(pattern: &Regex, kind: NameKind, name: &str) -> Result<()> {
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(Error::NameInvalid {
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mind_names() {
        for name in ["a", "my_mind", "Mind2", "x_1_y", &"m".repeat(32)] {
            assert!(validate_mind_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_mind_names() {
        for name in [
            "",
            "1mind",
            "_mind",
            "my mind",
            "my-mind",
            "mind!",
            "mínd",
            &"m".repeat(33),
        ] {
            match validate_mind_name(name) {
                Err(Error::NameInvalid { kind, .. }) => assert_eq!(kind, NameKind::Mind),
                other => panic!("{name:?} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_datasource_length_bound() {
        assert!(validate_datasource_name(&"d".repeat(62)).is_ok());
        assert!(matches!(
            validate_datasource_name(&"d".repeat(63)),
            Err(Error::NameInvalid {
                kind: NameKind::Datasource,
                ..
            })
        ));
    }

    #[test]
    fn test_datasource_name_longer_than_mind_limit() {
        let name = "d".repeat(40);
        assert!(validate_datasource_name(&name).is_ok());
        assert!(validate_mind_name(&name).is_err());
    }

    #[test]
    fn test_invalid_datasource_names() {
        for name in ["9ds", "my ds", "ds.table", "ds\n"] {
            assert!(
                matches!(
                    validate_datasource_name(name),
                    Err(Error::NameInvalid {
                        kind: NameKind::Datasource,
                        ..
                    })
                ),
                "{name:?} should be rejected"
            );
        }
    }
}
