/*!
 * Mock fetch sources for testing.
 *
 * This module provides in-process sources that simulate different behaviors:
 * - `MockWeatherSource::working()` - Always returns a deterministic observation
 * - `MockWeatherSource::failing()` - Always fails with an error
 * - `MockWeatherSource::failing_for(..)` - Fails for the listed cities only
 * - `MockNewsSource::with_articles(..)` - Returns a fixed page
 * - `MockNewsSource::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::database::models::ArticleRecord;
use crate::errors::FetchError;
use crate::providers::{AirQualityObservation, Coordinates, NewsSource, WeatherObservation, WeatherSource};

/// Behavior mode for the mock weather source
#[derive(Debug, Clone, PartialEq)]
pub enum MockWeatherBehavior {
    /// Always succeeds
    Working,
    /// Weather fails for these cities, succeeds for the rest
    FailingFor(HashSet<String>),
    /// Weather succeeds but air quality always fails
    AirQualityFailing,
    /// Always fails with an error
    Failing,
}

/// Mock weather source
#[derive(Debug)]
pub struct MockWeatherSource {
    behavior: MockWeatherBehavior,
    /// Number of weather requests made
    weather_calls: Arc<AtomicUsize>,
    /// Number of air-quality requests made
    air_quality_calls: Arc<AtomicUsize>,
    /// Upstream timestamp reported by every observation
    timestamp: i64,
}

impl MockWeatherSource {
    pub fn new(behavior: MockWeatherBehavior) -> Self {
        Self {
            behavior,
            weather_calls: Arc::new(AtomicUsize::new(0)),
            air_quality_calls: Arc::new(AtomicUsize::new(0)),
            timestamp: 1_700_000_000,
        }
    }

    pub fn working() -> Self {
        Self::new(MockWeatherBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockWeatherBehavior::Failing)
    }

    /// Fail weather requests for the given cities only
    pub fn failing_for<I, S>(cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(MockWeatherBehavior::FailingFor(cities.into_iter().map(Into::into).collect()))
    }

    pub fn air_quality_failing() -> Self {
        Self::new(MockWeatherBehavior::AirQualityFailing)
    }

    /// Report a different upstream timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn weather_calls(&self) -> usize {
        self.weather_calls.load(Ordering::SeqCst)
    }

    pub fn air_quality_calls(&self) -> usize {
        self.air_quality_calls.load(Ordering::SeqCst)
    }

    /// Deterministic observation derived from the city name
    pub fn observation_for(&self, city: &str) -> WeatherObservation {
        let seed = city.bytes().map(u64::from).sum::<u64>();
        WeatherObservation {
            temperature: (seed % 35) as f64,
            humidity: (seed % 60) as i64 + 20,
            wind_speed: (seed % 10) as f64 / 2.0,
            description: if seed % 2 == 0 { "clear sky" } else { "scattered clouds" }.to_string(),
            coordinates: Coordinates {
                lat: (seed % 90) as f64,
                lon: -((seed % 180) as f64),
            },
            timestamp: self.timestamp,
        }
    }
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn current_weather(&self, city: &str) -> Result<WeatherObservation, FetchError> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockWeatherBehavior::Failing => Err(FetchError::Status {
                status_code: 401,
                message: "Invalid API key".to_string(),
            }),
            MockWeatherBehavior::FailingFor(cities) if cities.contains(city) => Err(FetchError::Status {
                status_code: 404,
                message: "city not found".to_string(),
            }),
            _ => Ok(self.observation_for(city)),
        }
    }

    async fn air_quality(&self, coordinates: Coordinates) -> Result<AirQualityObservation, FetchError> {
        self.air_quality_calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockWeatherBehavior::Failing | MockWeatherBehavior::AirQualityFailing => {
                Err(FetchError::RequestFailed("connection reset".to_string()))
            }
            _ => Ok(AirQualityObservation {
                aqi: (coordinates.lat as i64 % 5) + 1,
                pm2_5: coordinates.lat / 10.0,
                pm10: coordinates.lat / 5.0,
                co: 200.0,
                no2: 10.0,
                o3: 50.0,
                so2: 1.0,
                timestamp: self.timestamp,
            }),
        }
    }
}

/// Mock news source
#[derive(Debug)]
pub struct MockNewsSource {
    /// Page returned on every call, `None` means every call fails
    articles: Option<Vec<ArticleRecord>>,
    /// Number of requests made
    request_count: Arc<AtomicUsize>,
    /// Pages requested, in call order
    requested_pages: Arc<Mutex<Vec<u64>>>,
}

impl MockNewsSource {
    /// Return the same page for every query
    pub fn with_articles(articles: Vec<ArticleRecord>) -> Self {
        Self {
            articles: Some(articles),
            request_count: Arc::new(AtomicUsize::new(0)),
            requested_pages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn empty() -> Self {
        Self::with_articles(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            articles: None,
            request_count: Arc::new(AtomicUsize::new(0)),
            requested_pages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requested_pages(&self) -> Vec<u64> {
        self.requested_pages
            .lock()
            .map(|pages| pages.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NewsSource for MockNewsSource {
    async fn articles(&self, _query: &str, page: u64, _page_size: u32) -> Result<Vec<ArticleRecord>, FetchError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut pages) = self.requested_pages.lock() {
            pages.push(page);
        }

        match &self.articles {
            Some(articles) => Ok(articles.clone()),
            None => Err(FetchError::Status {
                status_code: 429,
                message: "rateLimited".to_string(),
            }),
        }
    }
}
