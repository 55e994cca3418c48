use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::charts::{self, ChartOutcome};
use crate::database::{DatabaseStats, Repository};
use crate::file_utils::FileManager;
use crate::providers::newsapi::NewsApiClient;
use crate::providers::openweather::OpenWeatherClient;
use crate::providers::{NewsSource, WeatherSource};
use crate::reports;
use crate::run_state::RunState;

// @module: Application controller for the ingestion pipelines

/// What a weather run did
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRunSummary {
    /// Counter value the run started from
    pub chunk_index: u64,
    /// Cities in the slice handled by this run
    pub cities_attempted: usize,
    pub weather_stored: usize,
    pub air_quality_stored: usize,
    /// Cities skipped because their weather fetch failed
    pub cities_skipped: usize,
    /// Whether the counter was moved forward
    pub advanced: bool,
    pub reports: Vec<PathBuf>,
    pub charts: Vec<ChartOutcome>,
}

/// What a news run did
#[derive(Debug, Clone, PartialEq)]
pub struct NewsRunSummary {
    /// Page requested for every query
    pub page: u64,
    pub articles_inserted: usize,
    pub duplicates_skipped: usize,
    /// Queries whose fetch failed
    pub failed_queries: usize,
    pub reports: Vec<PathBuf>,
    pub charts: Vec<ChartOutcome>,
}

/// Store contents and counter positions
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub database: DatabaseStats,
    pub weather_chunk: Option<u64>,
    pub news_page: Option<u64>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn open_repository(&self) -> Result<Repository> {
        Repository::open(&self.config.database_path)
    }

    fn output_path(&self, file_name: &str) -> PathBuf {
        FileManager::output_path(&self.config.output_dir, file_name)
    }

    /// Write one report; a failed write is logged and the run carries on
    fn write_output<F>(&self, file_name: &str, write: F) -> Option<PathBuf>
    where
        F: FnOnce(&Path) -> Result<()>,
    {
        let path = self.output_path(file_name);
        match write(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                error!("Failed to write report {}: {:#}", path.display(), e);
                None
            }
        }
    }

    fn render_chart<F>(&self, file_name: &str, render: F) -> ChartOutcome
    where
        F: FnOnce(&Path) -> Result<ChartOutcome>,
    {
        let path = self.output_path(file_name);
        render(&path).unwrap_or_else(|e| {
            error!("Failed to render chart {}: {:#}", path.display(), e);
            ChartOutcome::Skipped
        })
    }

    /// Run the weather pipeline against OpenWeatherMap.
    ///
    /// The credential is read before anything else; without it nothing is
    /// fetched, stored or written.
    pub async fn run_weather(&self) -> Result<WeatherRunSummary> {
        let api_key = FileManager::read_credential(&self.config.weather.api_key_file)?;
        let source = OpenWeatherClient::new(
            api_key,
            self.config.weather.endpoint.clone(),
            self.config.weather.air_quality_endpoint.clone(),
            self.config.weather.units.clone(),
        );

        self.run_weather_with(&source).await
    }

    /// Ingest the next chunk of cities, then rebuild the weather reports and
    /// charts from everything stored so far
    pub async fn run_weather_with(&self, source: &dyn WeatherSource) -> Result<WeatherRunSummary> {
        let start_time = Instant::now();
        let weather = &self.config.weather;

        let mut state = RunState::load_chunked(&weather.run_count_file)?;
        let repository = self.open_repository()?;
        FileManager::ensure_dir(&self.config.output_dir)?;

        let chunk_index = state.current_position();
        let mut summary = WeatherRunSummary {
            chunk_index,
            cities_attempted: 0,
            weather_stored: 0,
            air_quality_stored: 0,
            cities_skipped: 0,
            advanced: false,
            reports: Vec::new(),
            charts: Vec::new(),
        };

        let slice = state.chunk(weather.cities.len(), weather.chunk_size);
        match &slice {
            Some(range) => {
                let cities = &weather.cities[range.clone()];
                info!(
                    "Processing cities {} to {} of {} (chunk {})",
                    range.start + 1,
                    range.end,
                    weather.cities.len(),
                    chunk_index
                );
                summary.cities_attempted = cities.len();

                let progress_bar = ProgressBar::new(cities.len() as u64);
                let style = ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cities ({percent}%) {msg}")
                    .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
                    .unwrap_or_else(|_| ProgressStyle::default_bar());
                progress_bar.set_style(style.progress_chars("=>-"));

                for city in cities {
                    progress_bar.set_message(city.clone());

                    let observation = match source.current_weather(city).await {
                        Ok(observation) => observation,
                        Err(e) => {
                            warn!("Failed to fetch weather for {}: {}", city, e);
                            summary.cities_skipped += 1;
                            progress_bar.inc(1);
                            continue;
                        }
                    };

                    let coordinates = observation.coordinates;
                    repository.upsert_weather(&observation.into_record(city)).await?;
                    summary.weather_stored += 1;

                    match source.air_quality(coordinates).await {
                        Ok(air) => {
                            repository.upsert_air_quality(&air.into_record(city)).await?;
                            summary.air_quality_stored += 1;
                        }
                        Err(e) => warn!("Failed to fetch air quality for {}: {}", city, e),
                    }

                    progress_bar.inc(1);
                }

                progress_bar.finish_and_clear();
                info!(
                    "Stored weather for {} and air quality for {} of {} cities",
                    summary.weather_stored, summary.air_quality_stored, summary.cities_attempted
                );
            }
            None => info!("All {} cities have already been processed.", weather.cities.len()),
        }

        if slice.is_some() {
            state.advance()?;
            summary.advanced = true;
        }

        let averages = repository.weather_averages().await?;
        let air_quality = repository.air_quality_summary().await?;

        summary.reports.extend(self.write_output(reports::WEATHER_REPORT_FILE, |path| {
            reports::write_weather_report(&averages, path)
        }));
        summary.reports.extend(self.write_output(reports::AIR_QUALITY_REPORT_FILE, |path| {
            reports::write_air_quality_report(&air_quality, path)
        }));

        if self.config.render_charts {
            summary.charts.push(self.render_chart(charts::WEATHER_CHART_FILE, |path| {
                charts::render_weather_chart(&averages, path)
            }));
            summary.charts.push(self.render_chart(charts::AQI_CHART_FILE, |path| {
                charts::render_aqi_pie_chart(&air_quality, path)
            }));
        } else {
            debug!("Chart rendering disabled");
        }

        info!("Weather run finished in {}", Self::format_duration(start_time.elapsed()));
        Ok(summary)
    }

    /// Run the news pipeline against NewsAPI.
    ///
    /// The credential is read before anything else.
    pub async fn run_news(&self) -> Result<NewsRunSummary> {
        let api_key = FileManager::read_credential(&self.config.news.api_key_file)?;
        let source = NewsApiClient::new(api_key, self.config.news.endpoint.clone());

        self.run_news_with(&source).await
    }

    /// Fetch the next page for every configured query, then rebuild the
    /// article trend report and chart.
    ///
    /// The page counter is persisted before the first fetch, so a run whose
    /// fetches all fail still moves the feed forward.
    pub async fn run_news_with(&self, source: &dyn NewsSource) -> Result<NewsRunSummary> {
        let start_time = Instant::now();
        let news = &self.config.news;

        let page = RunState::claim_page(&news.run_number_file)?;
        let repository = self.open_repository()?;
        FileManager::ensure_dir(&self.config.output_dir)?;

        info!("Fetching page {} for {} queries", page, news.queries.len());

        let mut summary = NewsRunSummary {
            page,
            articles_inserted: 0,
            duplicates_skipped: 0,
            failed_queries: 0,
            reports: Vec::new(),
            charts: Vec::new(),
        };

        for (idx, query) in news.queries.iter().enumerate() {
            if idx > 0 && news.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(news.request_delay_ms)).await;
            }

            let articles = match source.articles(&query.query, page, news.page_size).await {
                Ok(articles) => articles,
                Err(e) => {
                    error!("Failed to fetch articles for {}: {}", query.country, e);
                    summary.failed_queries += 1;
                    Vec::new()
                }
            };

            let articles: Vec<_> = articles.into_iter().take(news.page_size as usize).collect();
            let outcome = repository.insert_articles(&query.country, articles).await?;
            info!(
                "{}: {} new articles, {} duplicates skipped",
                query.country, outcome.inserted, outcome.skipped
            );

            summary.articles_inserted += outcome.inserted;
            summary.duplicates_skipped += outcome.skipped;
        }

        let trends = repository.article_trends().await?;

        summary.reports.extend(self.write_output(reports::ARTICLE_TRENDS_FILE, |path| {
            reports::write_article_trends(&trends, path)
        }));

        if self.config.render_charts {
            summary.charts.push(self.render_chart(charts::TRENDS_CHART_FILE, |path| {
                charts::render_article_trend_chart(&trends, path)
            }));
        } else {
            debug!("Chart rendering disabled");
        }

        info!("News run finished in {}", Self::format_duration(start_time.elapsed()));
        Ok(summary)
    }

    /// Row counts and counter positions, without fetching anything
    pub fn status(&self) -> Result<StatusReport> {
        let database = self.open_repository()?.stats()?;

        let weather_chunk = RunState::load_chunked(&self.config.weather.run_count_file)
            .map(|state| state.current_position())
            .ok();
        let news_page = RunState::load_paginated(&self.config.news.run_number_file)
            .map(|state| state.current_position())
            .ok();

        Ok(StatusReport {
            database,
            weather_chunk,
            news_page,
        })
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
