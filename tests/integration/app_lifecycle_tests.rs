/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use cityfeed::app_config::Config;
use cityfeed::app_controller::Controller;
use cityfeed::errors::StartupError;
use cityfeed::providers::mock::{MockNewsSource, MockWeatherSource};

use crate::common;

/// Test the controller with an invalid configuration
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.news.page_size = 0;

    assert!(Controller::with_config(config).is_err());
}

/// A missing weather credential stops the run before anything is touched
#[tokio::test]
async fn test_weatherRun_withMissingCredential_shouldAbortBeforeWork() -> Result<()> {
    let mut env = common::create_test_env(10)?;
    env.config.weather.api_key_file = env.path("missing_key.txt");
    let controller = Controller::with_config(env.config.clone())?;

    let err = controller.run_weather().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StartupError>(),
        Some(StartupError::MissingCredential(_))
    ));
    assert!(!env.config.database_path.exists());
    assert!(!env.weather_counter().exists());
    assert!(!env.config.output_dir.exists());

    Ok(())
}

#[tokio::test]
async fn test_newsRun_withBlankCredential_shouldLeaveCounterAlone() -> Result<()> {
    let env = common::create_test_env(1)?;
    std::fs::write(&env.config.news.api_key_file, "   \n")?;
    std::fs::write(env.news_counter(), "3")?;
    let controller = Controller::with_config(env.config.clone())?;

    let err = controller.run_news().await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StartupError>(),
        Some(StartupError::EmptyCredential(_))
    ));
    assert_eq!(common::read_counter(&env.news_counter())?, 3);
    assert!(!env.config.database_path.exists());

    Ok(())
}

#[tokio::test]
async fn test_status_afterBothPipelines_shouldReportCountsAndCounters() -> Result<()> {
    let env = common::create_test_env(4)?;
    std::fs::write(env.news_counter(), "1")?;
    let controller = Controller::with_config(env.config.clone())?;

    controller.run_weather_with(&MockWeatherSource::working()).await?;
    controller.run_news_with(&MockNewsSource::empty()).await?;

    let status = controller.status()?;

    assert_eq!(status.database.weather_rows, 4);
    assert_eq!(status.database.articles, 0);
    assert_eq!(status.database.countries, 2);
    assert_eq!(status.weather_chunk, Some(1));
    assert_eq!(status.news_page, Some(2));

    Ok(())
}
