//! Tests for config module

#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::io::Write;

    // ========================================================================
    // Default tests
    // ========================================================================

    #[test]
    fn test_config_default_values() {
        // Arrange & Act
        let config = TagdexConfig::default();

        // Assert
        assert_eq!(config.validation.max_tag_length, 0);
        assert_eq!(config.validation.max_tags, 0);
        assert_eq!(config.query.max_regex_pattern_len, 256);
        assert_eq!(config.query.regex_size_limit, 1 << 20);
        assert_eq!(config.query.max_expressions, 64);
        assert!(config.query.require_selecting_expression);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "text");
    }

    // ========================================================================
    // TOML parsing tests
    // ========================================================================

    #[test]
    fn test_config_from_toml_minimal() {
        // Arrange
        let toml = r#"
[query]
max_expressions = 8
"#;

        // Act
        let config = TagdexConfig::from_toml(toml).expect("parse");

        // Assert
        assert_eq!(config.query.max_expressions, 8);
        // Other values should be defaults
        assert_eq!(config.query.max_regex_pattern_len, 256);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_from_toml_full() {
        // Arrange
        let toml = r#"
[validation]
max_tag_length = 512
max_tags = 32

[query]
max_regex_pattern_len = 128
regex_size_limit = 65536
max_expressions = 16
require_selecting_expression = false

[logging]
level = "debug"
format = "json"
"#;

        // Act
        let config = TagdexConfig::from_toml(toml).expect("parse");

        // Assert
        assert_eq!(config.validation.max_tag_length, 512);
        assert_eq!(config.validation.max_tags, 32);
        assert_eq!(config.query.max_regex_pattern_len, 128);
        assert_eq!(config.query.regex_size_limit, 65536);
        assert_eq!(config.query.max_expressions, 16);
        assert!(!config.query.require_selecting_expression);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_config_from_toml_wrong_type() {
        // Arrange
        let toml = r#"
[query]
max_expressions = "many"
"#;

        // Act
        let result = TagdexConfig::from_toml(toml);

        // Assert
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_config_load_from_path() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[validation]\nmax_tags = 10").expect("write");

        // Act
        let config = TagdexConfig::load_from_path(file.path()).expect("load");

        // Assert
        assert_eq!(config.validation.max_tags, 10);
        assert_eq!(config.query.max_expressions, 64);
    }

    #[test]
    fn test_config_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");

        let config = TagdexConfig::load_from_path(dir.path().join("absent.toml")).expect("load");

        assert_eq!(config.query.max_expressions, 64);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        // Arrange
        let mut config = TagdexConfig::default();
        config.validation.max_tags = 20;
        config.logging.format = "json".to_string();

        // Act
        let toml = config.to_toml().expect("serialize");
        let parsed = TagdexConfig::from_toml(&toml).expect("parse");

        // Assert
        assert_eq!(parsed.validation.max_tags, 20);
        assert_eq!(parsed.logging.format, "json");
    }

    // ========================================================================
    // Validation tests
    // ========================================================================

    #[test]
    fn test_config_validate_success() {
        let config = TagdexConfig::default();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_max_expressions_zero() {
        // Arrange
        let mut config = TagdexConfig::default();
        config.query.max_expressions = 0;

        // Act
        let result = config.validate();

        // Assert
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "query.max_expressions"
        ));
    }

    #[test]
    fn test_config_validate_regex_size_limit_too_small() {
        let mut config = TagdexConfig::default();
        config.query.regex_size_limit = 100;

        let result = config.validate();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "query.regex_size_limit"
        ));
    }

    #[test]
    fn test_config_validate_tag_length_too_small() {
        let mut config = TagdexConfig::default();
        config.validation.max_tag_length = 2;

        assert!(config.validate().is_err());

        config.validation.max_tag_length = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_invalid_log_level() {
        // Arrange
        let mut config = TagdexConfig::default();
        config.logging.level = "verbose".to_string();

        // Act
        let result = config.validate();

        // Assert
        let err = result.expect_err("invalid level");
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_config_validate_invalid_log_format() {
        let mut config = TagdexConfig::default();
        config.logging.format = "xml".to_string();

        assert!(config.validate().is_err());
    }
}
