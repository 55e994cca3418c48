/*!
 * Tests for application configuration functionality
 */

use cityfeed::app_config::{Config, CountryQuery, LogLevel};
use cityfeed::errors::StartupError;

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.weather.chunk_size, 25);
    assert_eq!(config.weather.cities.len(), 100);
    assert_eq!(config.news.page_size, 5);
    assert_eq!(config.news.request_delay_ms, 1000);
    assert_eq!(
        config.news.queries,
        vec![
            CountryQuery::new("USA", "USA"),
            CountryQuery::new("UK", "UK"),
            CountryQuery::new("Canada", "Canada"),
            CountryQuery::new("India", "India"),
            CountryQuery::new("Australia", "Australia"),
        ]
    );
    assert!(config.render_charts);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.news.page_size = 0;
    assert!(matches!(config.validate(), Err(StartupError::InvalidConfig(_))));
    config.news.page_size = 101;
    assert!(config.validate().is_err());
    config.news.page_size = 100;
    assert!(config.validate().is_ok());

    config.weather.cities.clear();
    assert!(config.validate().is_err());
    config.weather.cities = vec!["Boston".to_string()];

    config.news.queries.clear();
    assert!(config.validate().is_err());
    config.news.queries = vec![CountryQuery::new("UK", "UK")];

    config.weather.air_quality_endpoint = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaultsThenReadThemBack() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let (created_config, created) = Config::load_or_create(&path).unwrap();
    assert!(created);
    assert!(path.exists());

    let (loaded_config, created_again) = Config::load_or_create(&path).unwrap();
    assert!(!created_again);
    assert_eq!(loaded_config.weather.cities, created_config.weather.cities);
    assert_eq!(loaded_config.news.queries, created_config.news.queries);
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_logLevel_shouldSerializeLowercase() {
    let json = serde_json::to_string(&LogLevel::Debug).unwrap();
    assert_eq!(json, "\"debug\"");

    let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
    assert_eq!(level, LogLevel::Warn);
}
