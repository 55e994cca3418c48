/*!
 * Per-entity writes.
 *
 * City-keyed tables use `WritePolicy::Upsert`: one
 * `INSERT ... ON CONFLICT(city) DO UPDATE` statement, so there is no window
 * between an existence check and the insert. Articles use
 * `WritePolicy::SkipDuplicate`: an explicit existence check on
 * (source, title) and a silent drop when found.
 */

use anyhow::{Context, Result};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::lookup;
use super::models::{AirQualityRecord, ArticleInsert, ArticleRecord, WeatherRecord};

/// Insert or overwrite the weather snapshot for `record.city` and log the
/// observation into the history table.
pub fn upsert_weather(conn: &Connection, record: &WeatherRecord) -> Result<()> {
    let description_id = lookup::resolve_weather_description(conn, &record.description)?;

    conn.execute(
        r#"
        INSERT INTO weather (city, temperature, humidity, wind_speed, weather_description_id, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(city) DO UPDATE SET
            temperature = excluded.temperature,
            humidity = excluded.humidity,
            wind_speed = excluded.wind_speed,
            weather_description_id = excluded.weather_description_id,
            timestamp = excluded.timestamp
        "#,
        params![
            record.city,
            record.temperature,
            record.humidity,
            record.wind_speed,
            description_id,
            record.timestamp,
        ],
    )
    .with_context(|| format!("Failed to upsert weather for {}", record.city))?;

    // Same city and upstream timestamp means the same observation
    conn.execute(
        r#"
        INSERT OR IGNORE INTO weather_history (city, temperature, humidity, wind_speed, weather_description_id, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            record.city,
            record.temperature,
            record.humidity,
            record.wind_speed,
            description_id,
            record.timestamp,
        ],
    )?;

    debug!("Stored weather for {} ({})", record.city, WeatherRecord::POLICY);
    Ok(())
}

/// Insert or overwrite the air-quality snapshot for `record.city` and log the
/// observation into the history table.
pub fn upsert_air_quality(conn: &Connection, record: &AirQualityRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO air_quality (city, aqi, pm2_5, pm10, co, no2, o3, so2, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(city) DO UPDATE SET
            aqi = excluded.aqi,
            pm2_5 = excluded.pm2_5,
            pm10 = excluded.pm10,
            co = excluded.co,
            no2 = excluded.no2,
            o3 = excluded.o3,
            so2 = excluded.so2,
            timestamp = excluded.timestamp
        "#,
        params![
            record.city,
            record.aqi,
            record.pm2_5,
            record.pm10,
            record.co,
            record.no2,
            record.o3,
            record.so2,
            record.timestamp,
        ],
    )
    .with_context(|| format!("Failed to upsert air quality for {}", record.city))?;

    conn.execute(
        r#"
        INSERT OR IGNORE INTO air_quality_history (city, aqi, pm2_5, pm10, co, no2, o3, so2, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            record.city,
            record.aqi,
            record.pm2_5,
            record.pm10,
            record.co,
            record.no2,
            record.o3,
            record.so2,
            record.timestamp,
        ],
    )?;

    debug!("Stored air quality for {} ({})", record.city, AirQualityRecord::POLICY);
    Ok(())
}

/// Store an article unless one with the same source and title already exists.
/// A duplicate is dropped as-is; the stored row keeps its first values.
pub fn insert_article_if_absent(
    conn: &Connection,
    record: &ArticleRecord,
    country_id: i64,
) -> Result<ArticleInsert> {
    let source_id = lookup::resolve_source(conn, &record.source_name)?;

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM articles WHERE source_id = ?1 AND title = ?2",
            params![source_id, record.title],
            |row| row.get(0),
        )
        .optional()?;

    if existing.is_some() {
        debug!("Article {:?} already stored ({})", record.title, ArticleRecord::POLICY);
        return Ok(ArticleInsert::SkippedDuplicate);
    }

    conn.execute(
        "INSERT INTO articles (source_id, title, published_date, country_id) VALUES (?1, ?2, ?3, ?4)",
        params![source_id, record.title, record.published_date, country_id],
    )
    .with_context(|| format!("Failed to insert article {:?}", record.title))?;

    Ok(ArticleInsert::Inserted(conn.last_insert_rowid()))
}
