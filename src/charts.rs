/*!
 * Chart rendering for aggregated results.
 *
 * Every chart is a PNG written with the plotters bitmap backend. Inputs are the
 * typed aggregation views; nothing here touches the database.
 */

use anyhow::{Context, Result};
use log::info;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::database::aggregate::{AirQualitySummary, ArticleTrend, WeatherAverage};
use crate::database::models::AqiCategory;

pub const WEATHER_CHART_FILE: &str = "weather_temperature_humidity.png";
pub const AQI_CHART_FILE: &str = "aqi_category_distribution.png";
pub const TRENDS_CHART_FILE: &str = "published_trends.png";

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Result of a render request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartOutcome {
    /// A file was written at this path
    Rendered(PathBuf),
    /// Nothing to draw; no file was written
    Skipped,
}

/// Stacked bar chart of average temperature with average humidity on top.
///
/// An empty input still produces a chart with empty axes.
pub fn render_weather_chart(averages: &[WeatherAverage], path: &Path) -> Result<ChartOutcome> {
    let bars: Vec<(&str, f64, f64)> = averages
        .iter()
        .map(|row| {
            (
                row.city.as_str(),
                row.avg_temperature.unwrap_or(0.0),
                row.avg_humidity.unwrap_or(0.0),
            )
        })
        .collect();

    let (y_min, y_max) = stacked_range(&bars);
    let x_max = bars.len().max(1) as i32;

    let root = BitMapBackend::new(path, (1400, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Average Temperature and Humidity by City", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(140)
        .y_label_area_size(60)
        .build_cartesian_2d((0..x_max).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_label_style(("sans-serif", 12.0).into_font().transform(FontTransform::Rotate90))
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => bars
                .get(*idx as usize)
                .map(|(city, _, _)| city.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .y_desc("Value")
        .draw()?;

    let temperature_color = RGBColor(70, 130, 180);
    let humidity_color = RGBColor(255, 165, 0);

    chart
        .draw_series(bars.iter().enumerate().map(|(idx, (_, temperature, _))| {
            let idx = idx as i32;
            Rectangle::new(
                [(SegmentValue::Exact(idx), 0.0), (SegmentValue::Exact(idx + 1), *temperature)],
                temperature_color.filled(),
            )
        }))?
        .label("Avg Temperature")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], temperature_color.filled()));

    chart
        .draw_series(bars.iter().enumerate().map(|(idx, (_, temperature, humidity))| {
            let idx = idx as i32;
            let base = temperature.max(0.0);
            Rectangle::new(
                [(SegmentValue::Exact(idx), base), (SegmentValue::Exact(idx + 1), base + humidity)],
                humidity_color.filled(),
            )
        }))?
        .label("Avg Humidity")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], humidity_color.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart {:?}", path))?;

    info!("Weather chart saved to {}", path.display());
    Ok(ChartOutcome::Rendered(path.to_path_buf()))
}

/// Pie chart of cities per AQI category.
///
/// With no categorized city this is a no-op and no file is written.
pub fn render_aqi_pie_chart(summary: &[AirQualitySummary], path: &Path) -> Result<ChartOutcome> {
    let distribution = aqi_distribution(summary);
    if distribution.is_empty() {
        info!("No AQI data available to visualize.");
        return Ok(ChartOutcome::Skipped);
    }

    let sizes: Vec<f64> = distribution.iter().map(|(_, count)| *count as f64).collect();
    let colors: Vec<RGBColor> = distribution.iter().map(|(category, _)| category_color(*category)).collect();
    let labels: Vec<String> = distribution.iter().map(|(category, _)| category.to_string()).collect();

    let root = BitMapBackend::new(path, (900, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("AQI Category Distribution", ("sans-serif", 30))?;

    let dims = root.dim_in_pixel();
    let center = (dims.0 as i32 / 2, dims.1 as i32 / 2);
    let radius = f64::from(dims.0.min(dims.1)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(140.0);
    pie.label_style(("sans-serif", 20.0).into_font().color(&BLACK));
    pie.percentages(("sans-serif", radius * 0.08).into_font().color(&BLACK));
    root.draw(&pie)?;

    root.present()
        .with_context(|| format!("Failed to write chart {:?}", path))?;

    info!("AQI chart saved to {}", path.display());
    Ok(ChartOutcome::Rendered(path.to_path_buf()))
}

/// Line chart of article counts over the week, one line per country
pub fn render_article_trend_chart(trends: &[ArticleTrend], path: &Path) -> Result<ChartOutcome> {
    let series = weekday_series(trends);
    let y_max = series
        .values()
        .flat_map(|counts| counts.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1)
        + 1;

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Articles Published by Day of Week", ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0i32..6i32, 0i64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(7)
        .x_label_formatter(&|day| WEEKDAYS.get(*day as usize).map(|d| d.to_string()).unwrap_or_default())
        .x_desc("Day of Week")
        .y_desc("Article Count")
        .draw()?;

    for (idx, (country, counts)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<(i32, i64)> = counts
            .iter()
            .enumerate()
            .map(|(day, count)| (day as i32, *count))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(country.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        chart.draw_series(points.into_iter().map(|point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("Failed to write chart {:?}", path))?;

    info!("Trend chart saved to {}", path.display());
    Ok(ChartOutcome::Rendered(path.to_path_buf()))
}

/// Number of cities in each AQI category, in category order.
/// Categories with no city and cities without a valid AQI are omitted.
pub fn aqi_distribution(summary: &[AirQualitySummary]) -> Vec<(AqiCategory, usize)> {
    let mut counts: BTreeMap<AqiCategory, usize> = BTreeMap::new();
    for category in summary
        .iter()
        .filter_map(|row| row.aqi.and_then(AqiCategory::from_index))
    {
        *counts.entry(category).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Article counts for each country indexed by weekday, missing days as zero
pub fn weekday_series(trends: &[ArticleTrend]) -> BTreeMap<String, [i64; 7]> {
    let mut series: BTreeMap<String, [i64; 7]> = BTreeMap::new();
    for trend in trends {
        let counts = series.entry(trend.country.clone()).or_insert([0; 7]);
        if let Some(slot) = counts.get_mut(trend.day_of_week as usize) {
            *slot += trend.article_count;
        }
    }
    series
}

fn stacked_range(bars: &[(&str, f64, f64)]) -> (f64, f64) {
    let y_min = bars
        .iter()
        .map(|(_, temperature, _)| *temperature)
        .fold(0.0_f64, f64::min);
    let y_max = bars
        .iter()
        .map(|(_, temperature, humidity)| temperature.max(0.0) + humidity)
        .fold(0.0_f64, f64::max);

    (y_min.floor() - 1.0, y_max.ceil() + 5.0)
}

fn category_color(category: AqiCategory) -> RGBColor {
    match category {
        AqiCategory::Good => RGBColor(0, 153, 102),
        AqiCategory::Fair => RGBColor(255, 222, 51),
        AqiCategory::Moderate => RGBColor(255, 153, 51),
        AqiCategory::Poor => RGBColor(204, 0, 51),
        AqiCategory::VeryPoor => RGBColor(102, 0, 153),
    }
}
