/*!
 * Repository layer for database operations.
 *
 * This module provides the async API the ingestion pipelines use. Each call
 * runs on a blocking thread; multi-statement writes run in one transaction.
 */

use anyhow::Result;
use log::debug;
use rusqlite::{params, OptionalExtension};
use std::path::Path;

use super::aggregate::{self, AggregateRow, AggregateSpec, AirQualitySummary, ArticleTrend, WeatherAverage};
use super::connection::{DatabaseConnection, DatabaseStats};
use super::lookup::{self, LookupTable};
use super::models::{
    AirQualityRecord, AirQualityRow, ArticleBatchOutcome, ArticleInsert, ArticleRecord,
    ArticleRow, WeatherRecord, WeatherRow,
};
use super::store;

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    pub fn stats(&self) -> Result<DatabaseStats> {
        self.db.stats()
    }

    // =========================================================================
    // Lookup Operations
    // =========================================================================

    /// Resolve a lookup value to its id, creating it on first sight
    pub async fn resolve_lookup(&self, table: LookupTable, value: &str) -> Result<i64> {
        let value = value.to_string();

        self.db
            .execute_async(move |conn| lookup::resolve(conn, table, &value))
            .await
    }

    pub async fn lookup_value(&self, table: LookupTable, id: i64) -> Result<Option<String>> {
        self.db
            .execute_async(move |conn| lookup::value_of(conn, table, id))
            .await
    }

    pub async fn lookup_count(&self, table: LookupTable) -> Result<i64> {
        self.db
            .execute_async(move |conn| lookup::count(conn, table))
            .await
    }

    // =========================================================================
    // Weather Operations
    // =========================================================================

    /// Insert or update the weather for a city
    pub async fn upsert_weather(&self, record: &WeatherRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .transaction_async(move |tx| store::upsert_weather(tx, &record))
            .await
    }

    /// Insert or update the air quality for a city
    pub async fn upsert_air_quality(&self, record: &AirQualityRecord) -> Result<()> {
        let record = record.clone();

        self.db
            .transaction_async(move |tx| store::upsert_air_quality(tx, &record))
            .await
    }

    /// Get the current weather snapshot for a city
    pub async fn get_weather(&self, city: &str) -> Result<Option<WeatherRow>> {
        let city = city.to_string();

        self.db
            .execute_async(move |conn| {
                let row = conn
                    .query_row(
                        r#"
                        SELECT w.id, w.city, w.temperature, w.humidity, w.wind_speed,
                               d.description, w.timestamp
                        FROM weather w
                        LEFT JOIN weather_descriptions d ON d.id = w.weather_description_id
                        WHERE w.city = ?1
                        "#,
                        [&city],
                        |row| {
                            Ok(WeatherRow {
                                id: row.get(0)?,
                                city: row.get(1)?,
                                temperature: row.get(2)?,
                                humidity: row.get(3)?,
                                wind_speed: row.get(4)?,
                                description: row.get(5)?,
                                timestamp: row.get(6)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
    }

    /// Get the current air-quality snapshot for a city
    pub async fn get_air_quality(&self, city: &str) -> Result<Option<AirQualityRow>> {
        let city = city.to_string();

        self.db
            .execute_async(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT id, city, aqi, pm2_5, timestamp FROM air_quality WHERE city = ?1",
                        [&city],
                        |row| {
                            Ok(AirQualityRow {
                                id: row.get(0)?,
                                city: row.get(1)?,
                                aqi: row.get(2)?,
                                pm2_5: row.get(3)?,
                                timestamp: row.get(4)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(row)
            })
            .await
    }

    // =========================================================================
    // Article Operations
    // =========================================================================

    /// Store one article for a country unless it is already present
    pub async fn insert_article(&self, country: &str, record: &ArticleRecord) -> Result<ArticleInsert> {
        let country = country.to_string();
        let record = record.clone();

        self.db
            .transaction_async(move |tx| {
                let country_id = lookup::resolve_country(tx, &country)?;
                store::insert_article_if_absent(tx, &record, country_id)
            })
            .await
    }

    /// Store a page of articles for a country in one transaction.
    ///
    /// The country is registered even when the page is empty.
    pub async fn insert_articles(
        &self,
        country: &str,
        records: Vec<ArticleRecord>,
    ) -> Result<ArticleBatchOutcome> {
        let country = country.to_string();

        self.db
            .transaction_async(move |tx| {
                let country_id = lookup::resolve_country(tx, &country)?;
                let mut outcome = ArticleBatchOutcome::default();

                for record in &records {
                    match store::insert_article_if_absent(tx, record, country_id)? {
                        ArticleInsert::Inserted(_) => outcome.inserted += 1,
                        ArticleInsert::SkippedDuplicate => {
                            debug!("Skipping duplicate article: {} / {}", record.source_name, record.title);
                            outcome.skipped += 1;
                        }
                    }
                }

                Ok(outcome)
            })
            .await
    }

    /// List stored articles in insertion order
    pub async fn list_articles(&self) -> Result<Vec<ArticleRow>> {
        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT a.id, s.name, a.title, a.published_date, c.name
                    FROM articles a
                    JOIN sources s ON s.id = a.source_id
                    JOIN countries c ON c.id = a.country_id
                    ORDER BY a.id
                    "#,
                )?;

                let rows = stmt.query_map(params![], |row| {
                    Ok(ArticleRow {
                        id: row.get(0)?,
                        source_name: row.get(1)?,
                        title: row.get(2)?,
                        published_date: row.get(3)?,
                        country: row.get(4)?,
                    })
                })?;

                let articles: Vec<ArticleRow> = rows.filter_map(|r| r.ok()).collect();
                Ok(articles)
            })
            .await
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    pub async fn aggregate(&self, spec: AggregateSpec) -> Result<Vec<AggregateRow>> {
        self.db
            .execute_async(move |conn| aggregate::aggregate(conn, &spec))
            .await
    }

    pub async fn weather_averages(&self) -> Result<Vec<WeatherAverage>> {
        self.db.execute_async(aggregate::weather_averages).await
    }

    pub async fn air_quality_summary(&self) -> Result<Vec<AirQualitySummary>> {
        self.db.execute_async(aggregate::air_quality_summary).await
    }

    pub async fn article_trends(&self) -> Result<Vec<ArticleTrend>> {
        self.db.execute_async(aggregate::article_trends).await
    }
}
