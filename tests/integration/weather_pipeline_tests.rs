/*!
 * Integration tests for chunked weather and air-quality ingestion
 */

use anyhow::Result;
use cityfeed::app_controller::Controller;
use cityfeed::charts::{self, ChartOutcome};
use cityfeed::database::Repository;
use cityfeed::providers::mock::MockWeatherSource;
use cityfeed::reports;

use crate::common;

/// A 100-city list in chunks of 25 takes four advancing runs; the fifth
/// ingests nothing, leaves the counter alone and still rebuilds the reports
#[tokio::test]
async fn test_weatherRun_over100Cities_shouldTakeFourRunsThenStop() -> Result<()> {
    let env = common::create_test_env(100)?;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockWeatherSource::working();

    for run in 0..4u64 {
        let summary = controller.run_weather_with(&source).await?;

        assert_eq!(summary.chunk_index, run);
        assert_eq!(summary.cities_attempted, 25);
        assert_eq!(summary.weather_stored, 25);
        assert!(summary.advanced);
        assert_eq!(common::read_counter(&env.weather_counter())?, run + 1);
    }

    let fifth = controller.run_weather_with(&source).await?;

    assert_eq!(fifth.cities_attempted, 0);
    assert_eq!(fifth.weather_stored, 0);
    assert!(!fifth.advanced);
    assert_eq!(common::read_counter(&env.weather_counter())?, 4);
    assert_eq!(source.weather_calls(), 100);

    let stats = Repository::open(&env.config.database_path)?.stats()?;
    assert_eq!(stats.weather_rows, 100);
    assert_eq!(stats.air_quality_rows, 100);

    let report = std::fs::read_to_string(env.output(reports::WEATHER_REPORT_FILE))?;
    assert_eq!(report.lines().count(), 100);
    assert!(report.starts_with("City: City 000, Avg Temperature: "));
    assert!(env.output(reports::AIR_QUALITY_REPORT_FILE).exists());

    Ok(())
}

#[tokio::test]
async fn test_weatherRun_withFailingCity_shouldSkipItAndContinue() -> Result<()> {
    let env = common::create_test_env(5)?;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockWeatherSource::failing_for(["City 001"]);

    let summary = controller.run_weather_with(&source).await?;

    assert_eq!(summary.cities_attempted, 5);
    assert_eq!(summary.weather_stored, 4);
    assert_eq!(summary.air_quality_stored, 4);
    assert_eq!(summary.cities_skipped, 1);
    assert_eq!(source.air_quality_calls(), 4);
    assert!(summary.advanced);

    let repository = Repository::open(&env.config.database_path)?;
    assert!(repository.get_weather("City 001").await?.is_none());
    assert!(repository.get_air_quality("City 001").await?.is_none());
    assert!(repository.get_weather("City 002").await?.is_some());

    Ok(())
}

#[tokio::test]
async fn test_weatherRun_withAirQualityFailing_shouldKeepWeather() -> Result<()> {
    let env = common::create_test_env(3)?;
    let controller = Controller::with_config(env.config.clone())?;

    let summary = controller.run_weather_with(&MockWeatherSource::air_quality_failing()).await?;

    assert_eq!(summary.weather_stored, 3);
    assert_eq!(summary.air_quality_stored, 0);

    let report = std::fs::read_to_string(env.output(reports::AIR_QUALITY_REPORT_FILE))?;
    assert!(report.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_weatherRun_withEveryFetchFailing_shouldStillAdvance() -> Result<()> {
    let env = common::create_test_env(30)?;
    let controller = Controller::with_config(env.config.clone())?;

    let summary = controller.run_weather_with(&MockWeatherSource::failing()).await?;

    assert_eq!(summary.cities_skipped, 25);
    assert_eq!(summary.weather_stored, 0);
    assert!(summary.advanced);
    assert_eq!(common::read_counter(&env.weather_counter())?, 1);

    Ok(())
}

#[tokio::test]
async fn test_weatherRun_overSameCitiesTwice_shouldUpsertAndAverage() -> Result<()> {
    let env = common::create_test_env(2)?;
    let controller = Controller::with_config(env.config.clone())?;

    controller.run_weather_with(&MockWeatherSource::working()).await?;
    std::fs::write(env.weather_counter(), "0")?;
    controller
        .run_weather_with(&MockWeatherSource::working().with_timestamp(1_800_000_000))
        .await?;

    let repository = Repository::open(&env.config.database_path)?;
    let stats = repository.stats()?;
    assert_eq!(stats.weather_rows, 2);
    assert_eq!(stats.weather_observations, 4);

    let row = repository.get_weather("City 000").await?.expect("city should be stored");
    assert_eq!(row.timestamp, Some(1_800_000_000));

    let averages = repository.weather_averages().await?;
    assert_eq!(averages.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_weatherRun_withShortTail_shouldProcessRemainder() -> Result<()> {
    let mut env = common::create_test_env(30)?;
    env.config.weather.chunk_size = 20;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockWeatherSource::working();

    let first = controller.run_weather_with(&source).await?;
    let second = controller.run_weather_with(&source).await?;
    let third = controller.run_weather_with(&source).await?;

    assert_eq!(first.cities_attempted, 20);
    assert_eq!(second.cities_attempted, 10);
    assert_eq!(third.cities_attempted, 0);
    assert_eq!(common::read_counter(&env.weather_counter())?, 2);

    Ok(())
}

/// A chart that cannot be written is logged and skipped; the ingested chunk
/// still counts
#[tokio::test]
async fn test_weatherRun_withUnwritableChart_shouldStillAdvance() -> Result<()> {
    let mut env = common::create_test_env(30)?;
    env.config.render_charts = true;
    std::fs::create_dir_all(env.output(charts::WEATHER_CHART_FILE))?;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockWeatherSource::air_quality_failing();

    let summary = controller.run_weather_with(&source).await?;

    assert_eq!(summary.weather_stored, 25);
    assert!(summary.advanced);
    assert_eq!(summary.charts, vec![ChartOutcome::Skipped, ChartOutcome::Skipped]);
    assert_eq!(summary.reports.len(), 2);
    assert_eq!(common::read_counter(&env.weather_counter())?, 1);

    Ok(())
}

#[tokio::test]
async fn test_weatherRun_withUnwritableReport_shouldStillAdvance() -> Result<()> {
    let env = common::create_test_env(3)?;
    std::fs::create_dir_all(env.output(reports::WEATHER_REPORT_FILE))?;
    let controller = Controller::with_config(env.config.clone())?;

    let summary = controller.run_weather_with(&MockWeatherSource::working()).await?;

    assert!(summary.advanced);
    assert_eq!(summary.reports, vec![env.output(reports::AIR_QUALITY_REPORT_FILE)]);
    assert_eq!(common::read_counter(&env.weather_counter())?, 1);

    Ok(())
}
