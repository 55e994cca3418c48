use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::StartupError;
use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles loading, validating and saving the settings for
/// both ingestion pipelines.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// SQLite database file shared by both pipelines
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory receiving reports and charts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Whether charts are rendered after aggregation
    #[serde(default = "default_true")]
    pub render_charts: bool,

    /// Weather and air-quality ingestion
    #[serde(default)]
    pub weather: WeatherConfig,

    /// News ingestion
    #[serde(default)]
    pub news: NewsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Weather and air-quality settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WeatherConfig {
    // @field: Current weather endpoint
    #[serde(default = "default_weather_endpoint")]
    pub endpoint: String,

    // @field: Air pollution endpoint
    #[serde(default = "default_air_quality_endpoint")]
    pub air_quality_endpoint: String,

    // @field: File holding the OpenWeatherMap API key
    #[serde(default = "default_weather_api_key_file")]
    pub api_key_file: PathBuf,

    // @field: Chunk counter file
    #[serde(default = "default_run_count_file")]
    pub run_count_file: PathBuf,

    // @field: Cities ingested per run
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    // @field: Unit system passed to the API
    #[serde(default = "default_units")]
    pub units: String,

    // @field: Ordered work-list
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_weather_endpoint(),
            air_quality_endpoint: default_air_quality_endpoint(),
            api_key_file: default_weather_api_key_file(),
            run_count_file: default_run_count_file(),
            chunk_size: default_chunk_size(),
            units: default_units(),
            cities: default_cities(),
        }
    }
}

/// A country and the search query used to find its articles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CountryQuery {
    pub country: String,
    pub query: String,
}

impl CountryQuery {
    pub fn new(country: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            query: query.into(),
        }
    }
}

/// News settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewsConfig {
    /// NewsAPI `everything` endpoint
    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,

    /// File holding the NewsAPI key
    #[serde(default = "default_news_api_key_file")]
    pub api_key_file: PathBuf,

    /// Page counter file; must exist before the first run
    #[serde(default = "default_run_number_file")]
    pub run_number_file: PathBuf,

    /// Articles requested and stored per query
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between consecutive queries in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Countries and their search queries, in fetch order
    #[serde(default = "default_queries")]
    pub queries: Vec<CountryQuery>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_news_endpoint(),
            api_key_file: default_news_api_key_file(),
            run_number_file: default_run_number_file(),
            page_size: default_page_size(),
            request_delay_ms: default_request_delay_ms(),
            queries: default_queries(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Largest page NewsAPI accepts
const MAX_PAGE_SIZE: u32 = 100;

/// The 100 largest US cities
const DEFAULT_CITIES: [&str; 100] = [
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Philadelphia",
    "San Antonio", "San Diego", "Dallas", "San Jose", "Austin", "Jacksonville",
    "Fort Worth", "Columbus", "Charlotte", "San Francisco", "Indianapolis", "Seattle",
    "Denver", "Washington", "Boston", "El Paso", "Nashville", "Detroit",
    "Oklahoma City", "Portland", "Las Vegas", "Memphis", "Louisville", "Baltimore",
    "Milwaukee", "Albuquerque", "Tucson", "Fresno", "Sacramento", "Kansas City",
    "Mesa", "Atlanta", "Omaha", "Colorado Springs", "Raleigh", "Miami",
    "Long Beach", "Virginia Beach", "Oakland", "Minneapolis", "Tulsa", "Tampa",
    "Arlington", "New Orleans", "Wichita", "Cleveland", "Bakersfield", "Aurora",
    "Anaheim", "Honolulu", "Santa Ana", "Riverside", "Corpus Christi", "Lexington",
    "Stockton", "St. Louis", "Saint Paul", "Henderson", "Pittsburgh", "Cincinnati",
    "Anchorage", "Greensboro", "Plano", "Lincoln", "Orlando", "Irvine",
    "Newark", "Durham", "Chula Vista", "Toledo", "Fort Wayne", "St. Petersburg",
    "Laredo", "Jersey City", "Chandler", "Madison", "Lubbock", "Scottsdale",
    "Reno", "Buffalo", "Gilbert", "Glendale", "North Las Vegas", "Winston-Salem",
    "Chesapeake", "Norfolk", "Fremont", "Garland", "Irving", "Hialeah",
    "Richmond", "Boise", "Spokane", "Baton Rouge",
];

fn default_database_path() -> PathBuf {
    PathBuf::from("outputs/final_project.db")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_true() -> bool {
    true
}

fn default_weather_endpoint() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_air_quality_endpoint() -> String {
    "http://api.openweathermap.org/data/2.5/air_pollution".to_string()
}

fn default_weather_api_key_file() -> PathBuf {
    PathBuf::from("weather_api_key.txt")
}

fn default_run_count_file() -> PathBuf {
    PathBuf::from("outputs/run_count.txt")
}

fn default_chunk_size() -> usize {
    25
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_cities() -> Vec<String> {
    DEFAULT_CITIES.iter().map(|c| c.to_string()).collect()
}

fn default_news_endpoint() -> String {
    "https://newsapi.org/v2/everything".to_string()
}

fn default_news_api_key_file() -> PathBuf {
    PathBuf::from("api_key.txt")
}

fn default_run_number_file() -> PathBuf {
    PathBuf::from("run_number.txt")
}

fn default_page_size() -> u32 {
    5
}

fn default_request_delay_ms() -> u64 {
    1000 // one second between queries
}

fn default_queries() -> Vec<CountryQuery> {
    ["USA", "UK", "Canada", "India", "Australia"]
        .iter()
        .map(|c| CountryQuery::new(*c, *c))
        .collect()
}

impl Config {
    /// Load a configuration file, writing the defaults first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if FileManager::file_exists(path) {
            let content = FileManager::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok((config, true))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), StartupError> {
        if self.weather.chunk_size == 0 {
            return Err(StartupError::InvalidConfig(
                "weather.chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.weather.cities.is_empty() {
            return Err(StartupError::InvalidConfig(
                "weather.cities must not be empty".to_string(),
            ));
        }

        if self.news.page_size == 0 || self.news.page_size > MAX_PAGE_SIZE {
            return Err(StartupError::InvalidConfig(format!(
                "news.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.news.page_size
            )));
        }

        if self.news.queries.is_empty() {
            return Err(StartupError::InvalidConfig(
                "news.queries must not be empty".to_string(),
            ));
        }

        for (name, endpoint) in [
            ("weather.endpoint", &self.weather.endpoint),
            ("weather.air_quality_endpoint", &self.weather.air_quality_endpoint),
            ("news.endpoint", &self.news.endpoint),
        ] {
            Url::parse(endpoint).map_err(|e| {
                StartupError::InvalidConfig(format!("{} is not a valid URL ({}): {}", name, e, endpoint))
            })?;
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: default_database_path(),
            output_dir: default_output_dir(),
            render_charts: true,
            weather: WeatherConfig::default(),
            news: NewsConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
