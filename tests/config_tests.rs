//! Startup configuration validation.
//!
//! `Config::from_raw_level` is the pure core of `Config::from_env`; testing
//! it directly keeps the process environment out of the tests.

use allium::{Config, Error, Level};

#[test]
fn absent_level_defaults_to_info() {
    let config = Config::from_raw_level(None).unwrap();
    assert_eq!(config.log_level, Level::Info);
    assert!(config.log_level_defaulted);
    assert!(config.log_requests);
}

#[test]
fn explicit_levels_are_accepted() {
    for (raw, level) in [
        ("10", Level::Debug),
        ("20", Level::Info),
        ("30", Level::Warning),
        ("40", Level::Error),
        ("50", Level::Critical),
    ] {
        let config = Config::from_raw_level(Some(raw)).unwrap();
        assert_eq!(config.log_level, level);
        assert!(!config.log_level_defaulted);
    }
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let config = Config::from_raw_level(Some(" 20 ")).unwrap();
    assert_eq!(config.log_level, Level::Info);
}

#[test]
fn non_numeric_level_is_a_fatal_config_error() {
    let err = Config::from_raw_level(Some("verbose")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("not a number"));
}

#[test]
fn out_of_set_level_is_a_fatal_config_error() {
    // The startup path surfaces this before anything binds a socket.
    let err = Config::from_raw_level(Some("99")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("not in the allowed range"));
}

#[test]
fn notset_is_rejected_as_a_configured_value() {
    let err = Config::from_raw_level(Some("0")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn default_config_logs_requests_at_info() {
    let config = Config::default();
    assert!(config.log_requests);
    assert_eq!(config.log_level, Level::Info);
    assert!(!config.log_level_defaulted);
}
