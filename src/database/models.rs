/*!
 * Database entity models.
 *
 * Records are what the ingestion step hands to the store; rows are what the
 * store hands back.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a fact table treats a second write for an existing key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Overwrite every field in place, in one conflict-resolving statement
    Upsert,
    /// Keep the first row and drop the newcomer without merging
    SkipDuplicate,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WritePolicy::Upsert => write!(f, "upsert"),
            WritePolicy::SkipDuplicate => write!(f, "skip_duplicate"),
        }
    }
}

/// Air Quality Index category, 1 (best) to 5 (worst)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Fair,
    Moderate,
    Poor,
    VeryPoor,
}

impl AqiCategory {
    /// All categories in index order
    pub const ALL: [AqiCategory; 5] = [
        AqiCategory::Good,
        AqiCategory::Fair,
        AqiCategory::Moderate,
        AqiCategory::Poor,
        AqiCategory::VeryPoor,
    ];

    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            1 => Some(AqiCategory::Good),
            2 => Some(AqiCategory::Fair),
            3 => Some(AqiCategory::Moderate),
            4 => Some(AqiCategory::Poor),
            5 => Some(AqiCategory::VeryPoor),
            _ => None,
        }
    }

    pub fn index(&self) -> i64 {
        match self {
            AqiCategory::Good => 1,
            AqiCategory::Fair => 2,
            AqiCategory::Moderate => 3,
            AqiCategory::Poor => 4,
            AqiCategory::VeryPoor => 5,
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AqiCategory::Good => write!(f, "Good"),
            AqiCategory::Fair => write!(f, "Fair"),
            AqiCategory::Moderate => write!(f, "Moderate"),
            AqiCategory::Poor => write!(f, "Poor"),
            AqiCategory::VeryPoor => write!(f, "Very Poor"),
        }
    }
}

/// Weather observation for one city, keyed by city name.
///
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature: f64,
    pub humidity: i64,
    pub wind_speed: f64,
    /// Free text, normalized into `weather_descriptions`
    pub description: String,
    /// Upstream epoch seconds, stored verbatim
    pub timestamp: i64,
}

impl WeatherRecord {
    pub const POLICY: WritePolicy = WritePolicy::Upsert;
}

/// Air-quality observation for one city, keyed by city name.
///
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityRecord {
    pub city: String,
    pub aqi: i64,
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    /// Upstream epoch seconds, stored verbatim
    pub timestamp: i64,
}

impl AirQualityRecord {
    pub const POLICY: WritePolicy = WritePolicy::Upsert;
}

/// News article, soft-keyed by (source, title).
///
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub source_name: String,
    pub title: String,
    /// ISO-8601 string as published, stored verbatim
    pub published_date: Option<String>,
}

impl ArticleRecord {
    pub const POLICY: WritePolicy = WritePolicy::SkipDuplicate;

    pub fn new(
        source_name: impl Into<String>,
        title: impl Into<String>,
        published_date: Option<String>,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            title: title.into(),
            published_date,
        }
    }
}

/// Outcome of writing one article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleInsert {
    /// A new row was created with this id
    Inserted(i64),
    /// The (source, title) pair already existed; nothing was written
    SkippedDuplicate,
}

/// Counts for a batch of article writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticleBatchOutcome {
    pub inserted: usize,
    pub skipped: usize,
}

/// Weather snapshot row joined with its description
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRow {
    pub id: i64,
    pub city: String,
    pub temperature: Option<f64>,
    pub humidity: Option<i64>,
    pub wind_speed: Option<f64>,
    pub description: Option<String>,
    pub timestamp: Option<i64>,
}

/// Air-quality snapshot row
#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityRow {
    pub id: i64,
    pub city: String,
    pub aqi: Option<i64>,
    pub pm2_5: Option<f64>,
    pub timestamp: Option<i64>,
}

/// Stored article joined with its source and country names
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRow {
    pub id: i64,
    pub source_name: String,
    pub title: String,
    pub published_date: Option<String>,
    pub country: String,
}
