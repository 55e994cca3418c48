/*!
 * # cityfeed
 *
 * Incremental ingestion of weather, air-quality and news REST feeds into a
 * local SQLite database, with aggregation into reports and charts.
 *
 * ## Features
 *
 * - Chunked ingestion of a bounded city list, one slice per invocation
 * - Paginated ingestion of an unbounded news feed, one page per invocation
 * - Lookup normalization of repeated text (weather descriptions, sources, countries)
 * - Idempotent per-city upserts and skip-on-duplicate articles
 * - Grouped averages, counts and latest-value queries over everything stored
 * - Text and CSV reports, PNG bar, pie and line charts
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `run_state`: Durable counters between invocations
 * - `database`: SQLite schema, lookups, upserts and aggregation
 * - `providers`: Fetch clients for the upstream APIs:
 *   - `providers::openweather`: OpenWeatherMap weather and air pollution
 *   - `providers::newsapi`: NewsAPI article search
 *   - `providers::mock`: In-process sources for tests
 * - `reports`: Text and CSV report writers
 * - `charts`: Chart rendering
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod run_state;
pub mod database;
pub mod providers;
pub mod reports;
pub mod charts;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use database::Repository;
pub use errors::{FetchError, StartupError};
pub use run_state::RunState;
