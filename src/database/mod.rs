/*!
 * Database module for persistent storage of ingested feeds.
 *
 * This module provides SQLite-based persistence for:
 * - Weather and air-quality snapshots keyed by city, with an observation log
 * - News articles deduplicated by source and title
 * - Lookup tables for repeated free-text attributes
 * - Aggregate queries feeding the reports and charts
 */

pub mod schema;
pub mod connection;
pub mod lookup;
pub mod models;
pub mod store;
pub mod aggregate;
pub mod repository;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::Repository;
