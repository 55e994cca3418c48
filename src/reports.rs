/*!
 * Report writers for aggregated results.
 *
 * Each report is rewritten in full on every run.
 */

use anyhow::{Context, Result};
use log::info;
use std::fmt::Display;
use std::path::Path;

use crate::database::aggregate::{AirQualitySummary, ArticleTrend, WeatherAverage};
use crate::file_utils::FileManager;

pub const WEATHER_REPORT_FILE: &str = "weather_averages.txt";
pub const AIR_QUALITY_REPORT_FILE: &str = "air_quality_pm2_5.txt";
pub const ARTICLE_TRENDS_FILE: &str = "processed_data.csv";

const CSV_HEADER: [&str; 3] = ["Country", "Article Count", "Day of Week"];

/// Format a mean to two decimals, `N/A` when the group had no value
fn two_decimals(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v))
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

pub fn format_weather_report(averages: &[WeatherAverage]) -> String {
    averages
        .iter()
        .map(|row| {
            format!(
                "City: {}, Avg Temperature: {}, Avg Humidity: {}\n",
                row.city,
                two_decimals(row.avg_temperature),
                two_decimals(row.avg_humidity)
            )
        })
        .collect()
}

pub fn format_air_quality_report(summary: &[AirQualitySummary]) -> String {
    summary
        .iter()
        .map(|row| {
            format!(
                "City: {}, Avg PM2.5: {}, AQI: {}\n",
                row.city,
                two_decimals(row.avg_pm2_5),
                or_na(row.aqi)
            )
        })
        .collect()
}

/// Write one line per city with its average temperature and humidity
pub fn write_weather_report(averages: &[WeatherAverage], path: &Path) -> Result<()> {
    FileManager::write_to_file(path, &format_weather_report(averages))?;
    info!("Weather averages written to {}", path.display());
    Ok(())
}

/// Write one line per city with its average PM2.5 and latest AQI
pub fn write_air_quality_report(summary: &[AirQualitySummary], path: &Path) -> Result<()> {
    FileManager::write_to_file(path, &format_air_quality_report(summary))?;
    info!("Air quality summary written to {}", path.display());
    Ok(())
}

/// Write the weekday article counts as CSV with a header row
pub fn write_article_trends(trends: &[ArticleTrend], path: &Path) -> Result<()> {
    FileManager::ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;

    writer.write_record(CSV_HEADER)?;
    for trend in trends {
        let article_count = trend.article_count.to_string();
        let day_of_week = trend.day_of_week.to_string();
        writer.write_record([trend.country.as_str(), article_count.as_str(), day_of_week.as_str()])?;
    }
    writer.flush()?;

    info!("Article trends written to {}", path.display());
    Ok(())
}
