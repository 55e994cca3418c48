/*!
 * Database schema definitions.
 *
 * Schema creation is an explicit, idempotent step run once when a connection
 * is opened. There are no migrations: every statement is
 * `CREATE ... IF NOT EXISTS`.
 */

use anyhow::{Context, Result};
use log::debug;
use rusqlite::Connection;

/// Tables created by `initialize_schema`, in creation order
pub const TABLES: [&str; 8] = [
    "weather_descriptions",
    "sources",
    "countries",
    "weather",
    "weather_history",
    "air_quality",
    "air_quality_history",
    "articles",
];

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("Journal mode: {}", journal_mode);

    // Enable foreign keys
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    create_lookup_tables(conn).context("Failed to create lookup tables")?;
    create_weather_tables(conn).context("Failed to create weather tables")?;
    create_article_tables(conn).context("Failed to create article tables")?;

    debug!("Database schema ready");
    Ok(())
}

fn create_lookup_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS weather_descriptions (
            id INTEGER PRIMARY KEY,
            description TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS sources (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS countries (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );
        "#,
    )?;
    Ok(())
}

fn create_weather_tables(conn: &Connection) -> Result<()> {
    // Snapshot tables hold one row per city; history tables keep every
    // distinct observation for aggregation.
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS weather (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL UNIQUE,
            temperature REAL,
            humidity INTEGER,
            wind_speed REAL,
            weather_description_id INTEGER REFERENCES weather_descriptions(id),
            timestamp INTEGER
        );

        CREATE TABLE IF NOT EXISTS weather_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL,
            temperature REAL,
            humidity INTEGER,
            wind_speed REAL,
            weather_description_id INTEGER REFERENCES weather_descriptions(id),
            timestamp INTEGER NOT NULL,
            UNIQUE(city, timestamp)
        );

        CREATE INDEX IF NOT EXISTS idx_weather_history_city ON weather_history(city);

        CREATE TABLE IF NOT EXISTS air_quality (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL UNIQUE,
            aqi INTEGER,
            pm2_5 REAL,
            pm10 REAL,
            co REAL,
            no2 REAL,
            o3 REAL,
            so2 REAL,
            timestamp INTEGER
        );

        CREATE TABLE IF NOT EXISTS air_quality_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            city TEXT NOT NULL,
            aqi INTEGER,
            pm2_5 REAL,
            pm10 REAL,
            co REAL,
            no2 REAL,
            o3 REAL,
            so2 REAL,
            timestamp INTEGER NOT NULL,
            UNIQUE(city, timestamp)
        );

        CREATE INDEX IF NOT EXISTS idx_air_quality_history_city ON air_quality_history(city);
        "#,
    )?;
    Ok(())
}

fn create_article_tables(conn: &Connection) -> Result<()> {
    // (source_id, title) is a soft key: checked before insert, not enforced
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id INTEGER PRIMARY KEY,
            source_id INTEGER NOT NULL REFERENCES sources(id),
            title TEXT NOT NULL,
            published_date TEXT,
            country_id INTEGER NOT NULL REFERENCES countries(id)
        );

        CREATE INDEX IF NOT EXISTS idx_articles_source_title ON articles(source_id, title);
        CREATE INDEX IF NOT EXISTS idx_articles_country ON articles(country_id);
        "#,
    )?;
    Ok(())
}
