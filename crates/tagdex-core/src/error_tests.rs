//! Tests for `error` module

use super::error::*;

// -------------------------------------------------------------------------
// Error code tests
// -------------------------------------------------------------------------

#[test]
fn test_error_codes_are_unique() {
    // Arrange - create all error variants
    let errors: Vec<Error> = vec![
        Error::InvalidUtf8 { index: 0 },
        Error::InvalidTagFormat {
            tag: "a=".into(),
            reason: "empty value",
        },
        Error::InvalidMetric("test".into()),
        Error::InvalidExpression("test".into()),
        Error::InvalidQuery("test".into()),
        Error::Config("test".into()),
    ];

    // Act - collect all codes
    let codes: Vec<&str> = errors.iter().map(Error::code).collect();

    // Assert - all codes are unique and follow pattern
    let mut unique_codes = codes.clone();
    unique_codes.sort_unstable();
    unique_codes.dedup();
    assert_eq!(
        codes.len(),
        unique_codes.len(),
        "Error codes must be unique"
    );

    for code in &codes {
        assert!(
            code.starts_with("TAGDEX-"),
            "Code {code} should start with TAGDEX-"
        );
    }
}

#[test]
fn test_error_display_includes_code() {
    // Arrange
    let err = Error::InvalidTagFormat {
        tag: "a;b=c".into(),
        reason: "';' is reserved",
    };

    // Act
    let display = format!("{err}");

    // Assert
    assert!(display.contains("TAGDEX-002"));
    assert!(display.contains("a;b=c"));
    assert!(display.contains("reserved"));
}

#[test]
fn test_invalid_utf8_display_names_position() {
    let err = Error::InvalidUtf8 { index: 3 };

    assert!(format!("{err}").contains("#3"));
    assert_eq!(err.code(), "TAGDEX-001");
}

// -------------------------------------------------------------------------
// Conversion tests
// -------------------------------------------------------------------------

#[test]
fn test_from_config_error() {
    // Arrange
    let config_err = crate::config::ConfigError::InvalidValue {
        key: "query.max_expressions".into(),
        message: "value 0 is out of range".into(),
    };

    // Act
    let err: Error = config_err.into();

    // Assert
    assert_eq!(err.code(), "TAGDEX-006");
    assert!(format!("{err}").contains("query.max_expressions"));
}

#[test]
fn test_from_regex_error() {
    // Arrange
    let regex_err = regex::Regex::new("(unclosed").unwrap_err();

    // Act
    let err: Error = regex_err.into();

    // Assert
    assert_eq!(err.code(), "TAGDEX-004");
}

// -------------------------------------------------------------------------
// Classification tests
// -------------------------------------------------------------------------

#[test]
fn test_validation_errors() {
    assert!(Error::InvalidUtf8 { index: 0 }.is_validation());
    assert!(Error::InvalidTagFormat {
        tag: "a".into(),
        reason: "missing '=' separator",
    }
    .is_validation());
    assert!(Error::InvalidMetric("x".into()).is_validation());
}

#[test]
fn test_non_validation_errors() {
    assert!(!Error::InvalidExpression("x".into()).is_validation());
    assert!(!Error::InvalidQuery("x".into()).is_validation());
    assert!(!Error::Config("x".into()).is_validation());
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}
