/*!
 * Fetch collaborators for the upstream REST APIs.
 *
 * This module contains client implementations for each feed:
 * - OpenWeatherMap: current weather and air pollution by city
 * - NewsAPI: paginated article search
 * - Mock: in-process sources for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::database::models::{AirQualityRecord, ArticleRecord, WeatherRecord};
use crate::errors::FetchError;

/// Geographic coordinates reported with a weather observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current weather for one city as returned upstream
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub temperature: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    pub description: String,
    pub coordinates: Coordinates,
    /// Upstream epoch seconds
    pub timestamp: i64,
}

impl WeatherObservation {
    /// Key the observation by the city name used in the request
    pub fn into_record(self, city: &str) -> WeatherRecord {
        WeatherRecord {
            city: city.to_string(),
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            description: self.description,
            timestamp: self.timestamp,
        }
    }
}

/// Air-quality reading at a set of coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityObservation {
    /// Category index, 1 (good) to 5 (very poor)
    pub aqi: i64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub timestamp: i64,
}

impl AirQualityObservation {
    pub fn into_record(self, city: &str) -> AirQualityRecord {
        AirQualityRecord {
            city: city.to_string(),
            aqi: self.aqi,
            pm2_5: self.pm2_5,
            pm10: self.pm10,
            co: self.co,
            no2: self.no2,
            o3: self.o3,
            so2: self.so2,
            timestamp: self.timestamp,
        }
    }
}

/// Source of weather and air-quality observations
///
/// Implementations make exactly one request per call. Failures are returned,
/// never retried.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Current weather for a city name
    async fn current_weather(&self, city: &str) -> Result<WeatherObservation, FetchError>;

    /// Current air quality at the given coordinates
    async fn air_quality(&self, coordinates: Coordinates) -> Result<AirQualityObservation, FetchError>;
}

/// Source of news articles
#[async_trait]
pub trait NewsSource: Send + Sync + Debug {
    /// One page of articles matching `query`
    ///
    /// # Arguments
    /// * `query` - Free-text search query
    /// * `page` - Page number as stored in the run-state
    /// * `page_size` - Number of articles requested
    async fn articles(&self, query: &str, page: u64, page_size: u32) -> Result<Vec<ArticleRecord>, FetchError>;
}

pub mod openweather;
pub mod newsapi;
pub mod mock;
