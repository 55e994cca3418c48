use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::FetchError;
use crate::providers::{AirQualityObservation, Coordinates, WeatherObservation, WeatherSource};

/// OpenWeatherMap client for current weather and air pollution
#[derive(Debug)]
pub struct OpenWeatherClient {
    /// HTTP client for making requests
    client: Client,
    /// API key sent as `appid`
    api_key: String,
    /// Current weather endpoint
    weather_endpoint: String,
    /// Air pollution endpoint
    air_quality_endpoint: String,
    /// Unit system sent as `units`
    units: String,
}

/// Current weather response
#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub coord: Coord,
    pub weather: Vec<WeatherCondition>,
    pub main: MainReadings,
    pub wind: Wind,
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: i64,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

/// Air pollution response
#[derive(Debug, Deserialize)]
pub struct AirPollutionResponse {
    pub list: Vec<AirPollutionEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionEntry {
    pub main: AirPollutionIndex,
    pub components: Components,
    pub dt: i64,
}

#[derive(Debug, Deserialize)]
pub struct AirPollutionIndex {
    pub aqi: i64,
}

/// Pollutant concentrations in μg/m3
#[derive(Debug, Deserialize)]
pub struct Components {
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm2_5: f64,
    pub pm10: f64,
}

impl OpenWeatherClient {
    /// Create a new OpenWeatherMap client
    pub fn new(
        api_key: impl Into<String>,
        weather_endpoint: impl Into<String>,
        air_quality_endpoint: impl Into<String>,
        units: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            weather_endpoint: weather_endpoint.into(),
            air_quality_endpoint: air_quality_endpoint.into(),
            units: units.into(),
        }
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(FetchError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current_weather(&self, city: &str) -> Result<WeatherObservation, FetchError> {
        debug!("Fetching current weather for {}", city);

        let body = self
            .get_text(
                &self.weather_endpoint,
                &[
                    ("q", city.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", self.units.clone()),
                ],
            )
            .await?;

        parse_weather_response(&body)
    }

    async fn air_quality(&self, coordinates: Coordinates) -> Result<AirQualityObservation, FetchError> {
        debug!("Fetching air quality at ({}, {})", coordinates.lat, coordinates.lon);

        let body = self
            .get_text(
                &self.air_quality_endpoint,
                &[
                    ("lat", coordinates.lat.to_string()),
                    ("lon", coordinates.lon.to_string()),
                    ("appid", self.api_key.clone()),
                ],
            )
            .await?;

        parse_air_quality_response(&body)
    }
}

/// Extract a weather observation from a current weather response body
pub fn parse_weather_response(body: &str) -> Result<WeatherObservation, FetchError> {
    let response: CurrentWeatherResponse = serde_json::from_str(body)?;

    let description = response
        .weather
        .into_iter()
        .next()
        .map(|condition| condition.description)
        .ok_or_else(|| FetchError::ParseError("Response has no weather conditions".to_string()))?;

    Ok(WeatherObservation {
        temperature: response.main.temp,
        humidity: response.main.humidity,
        wind_speed: response.wind.speed,
        description,
        coordinates: Coordinates {
            lat: response.coord.lat,
            lon: response.coord.lon,
        },
        timestamp: response.dt,
    })
}

/// Extract the first reading from an air pollution response body
pub fn parse_air_quality_response(body: &str) -> Result<AirQualityObservation, FetchError> {
    let response: AirPollutionResponse = serde_json::from_str(body)?;

    let entry = response
        .list
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::ParseError("Air pollution list is empty".to_string()))?;

    Ok(AirQualityObservation {
        aqi: entry.main.aqi,
        pm2_5: entry.components.pm2_5,
        pm10: entry.components.pm10,
        co: entry.components.co,
        no2: entry.components.no2,
        o3: entry.components.o3,
        so2: entry.components.so2,
        timestamp: entry.dt,
    })
}
