/*!
 * Common test utilities for the cityfeed test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use cityfeed::app_config::{Config, CountryQuery};

/// A temporary working directory with a config pointing into it
pub struct TestEnv {
    pub dir: TempDir,
    pub config: Config,
}

impl TestEnv {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn weather_counter(&self) -> PathBuf {
        self.config.weather.run_count_file.clone()
    }

    pub fn news_counter(&self) -> PathBuf {
        self.config.news.run_number_file.clone()
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.config.output_dir.join(name)
    }
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// `count` distinct city names
pub fn test_cities(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("City {:03}", i)).collect()
}

/// Environment with credentials in place, no counters, no database, charts off
/// and no delay between news queries
pub fn create_test_env(city_count: usize) -> Result<TestEnv> {
    let dir = create_temp_dir()?;
    let root = dir.path();

    let mut config = Config::default();
    config.database_path = root.join("outputs").join("final_project.db");
    config.output_dir = root.join("outputs");
    config.render_charts = false;

    config.weather.api_key_file = create_test_file(root, "weather_api_key.txt", "  weather-key\n")?;
    config.weather.run_count_file = root.join("outputs").join("run_count.txt");
    config.weather.cities = test_cities(city_count);

    config.news.api_key_file = create_test_file(root, "api_key.txt", "news-key\n")?;
    config.news.run_number_file = root.join("run_number.txt");
    config.news.request_delay_ms = 0;
    config.news.queries = vec![CountryQuery::new("USA", "USA"), CountryQuery::new("UK", "UK")];

    Ok(TestEnv { dir, config })
}

/// Read a counter file as written by the run-state
pub fn read_counter(path: &Path) -> Result<u64> {
    Ok(fs::read_to_string(path)?.trim().parse()?)
}
