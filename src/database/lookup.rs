/*!
 * Lookup normalization.
 *
 * Repeated free-text attributes (weather descriptions, news source names,
 * country names) are stored once in a lookup table and referenced by id.
 * The set of lookup tables is closed and known at compile time, so table and
 * column names never come from runtime input.
 */

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::fmt;

/// A lookup table and its unique text column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupTable {
    WeatherDescriptions,
    Sources,
    Countries,
}

impl LookupTable {
    pub const ALL: [LookupTable; 3] = [
        LookupTable::WeatherDescriptions,
        LookupTable::Sources,
        LookupTable::Countries,
    ];

    pub const fn table(&self) -> &'static str {
        match self {
            LookupTable::WeatherDescriptions => "weather_descriptions",
            LookupTable::Sources => "sources",
            LookupTable::Countries => "countries",
        }
    }

    pub const fn column(&self) -> &'static str {
        match self {
            LookupTable::WeatherDescriptions => "description",
            LookupTable::Sources | LookupTable::Countries => "name",
        }
    }

    fn select_id_sql(&self) -> String {
        format!("SELECT id FROM {} WHERE {} = ?1", self.table(), self.column())
    }

    fn insert_sql(&self) -> String {
        format!("INSERT INTO {} ({}) VALUES (?1)", self.table(), self.column())
    }

    fn select_value_sql(&self) -> String {
        format!("SELECT {} FROM {} WHERE id = ?1", self.column(), self.table())
    }
}

impl fmt::Display for LookupTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table(), self.column())
    }
}

/// Return the id of `value` in `table`, inserting it on first sight.
///
/// Reads before it writes, so repeated calls return the same id without
/// touching the table again. Assumes a single writer.
pub fn resolve(conn: &Connection, table: LookupTable, value: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(&table.select_id_sql(), [value], |row| row.get(0))
        .optional()
        .with_context(|| format!("Failed to look up {:?} in {}", value, table))?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute(&table.insert_sql(), [value])
        .with_context(|| format!("Failed to insert {:?} into {}", value, table))?;

    Ok(conn.last_insert_rowid())
}

pub fn resolve_weather_description(conn: &Connection, description: &str) -> Result<i64> {
    resolve(conn, LookupTable::WeatherDescriptions, description)
}

pub fn resolve_source(conn: &Connection, name: &str) -> Result<i64> {
    resolve(conn, LookupTable::Sources, name)
}

pub fn resolve_country(conn: &Connection, name: &str) -> Result<i64> {
    resolve(conn, LookupTable::Countries, name)
}

/// Text stored under `id`, if any
pub fn value_of(conn: &Connection, table: LookupTable, id: i64) -> Result<Option<String>> {
    let value = conn
        .query_row(&table.select_value_sql(), [id], |row| row.get(0))
        .optional()?;
    Ok(value)
}

/// Number of distinct values held by `table`
pub fn count(conn: &Connection, table: LookupTable) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.table());
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}
