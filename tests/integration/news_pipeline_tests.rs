/*!
 * Integration tests for paginated news ingestion
 */

use anyhow::Result;
use cityfeed::app_controller::Controller;
use cityfeed::database::lookup::LookupTable;
use cityfeed::database::models::ArticleRecord;
use cityfeed::database::Repository;
use cityfeed::errors::StartupError;
use cityfeed::providers::mock::MockNewsSource;
use cityfeed::reports;

use crate::common;

fn monday_articles() -> Vec<ArticleRecord> {
    vec![
        ArticleRecord::new("Reuters", "Markets open higher", Some("2024-03-04T09:00:00Z".to_string())),
        ArticleRecord::new("AP", "Storm moves east", Some("2024-03-04T13:30:00Z".to_string())),
    ]
}

/// The page counter ends at its input plus one whatever the fetches do
#[tokio::test]
async fn test_newsRun_withFailingSource_shouldStillAdvancePage() -> Result<()> {
    let env = common::create_test_env(1)?;
    std::fs::write(env.news_counter(), "5")?;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockNewsSource::failing();

    let summary = controller.run_news_with(&source).await?;

    assert_eq!(summary.page, 5);
    assert_eq!(summary.failed_queries, 2);
    assert_eq!(summary.articles_inserted, 0);
    assert_eq!(source.requested_pages(), vec![5, 5]);
    assert_eq!(common::read_counter(&env.news_counter())?, 6);

    let csv = std::fs::read_to_string(env.output(reports::ARTICLE_TRENDS_FILE))?;
    assert_eq!(csv, "Country,Article Count,Day of Week\n");

    Ok(())
}

#[tokio::test]
async fn test_newsRun_withFailingSource_shouldStillRegisterCountries() -> Result<()> {
    let env = common::create_test_env(1)?;
    std::fs::write(env.news_counter(), "1")?;
    let controller = Controller::with_config(env.config.clone())?;

    controller.run_news_with(&MockNewsSource::failing()).await?;

    let repository = Repository::open(&env.config.database_path)?;
    assert_eq!(repository.lookup_count(LookupTable::Countries).await?, 2);

    Ok(())
}

#[tokio::test]
async fn test_newsRun_withMissingCounter_shouldAbortBeforeWork() -> Result<()> {
    let env = common::create_test_env(1)?;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockNewsSource::with_articles(monday_articles());

    let err = controller.run_news_with(&source).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<StartupError>(),
        Some(StartupError::MissingRunState(_))
    ));
    assert_eq!(source.request_count(), 0);
    assert!(!env.config.database_path.exists());

    Ok(())
}

/// Articles are keyed by source and title only, so the same page seen under a
/// second country or on a later run is skipped
#[tokio::test]
async fn test_newsRun_withRepeatedArticles_shouldSkipDuplicates() -> Result<()> {
    let env = common::create_test_env(1)?;
    std::fs::write(env.news_counter(), "1")?;
    let controller = Controller::with_config(env.config.clone())?;
    let source = MockNewsSource::with_articles(monday_articles());

    let first = controller.run_news_with(&source).await?;
    let second = controller.run_news_with(&source).await?;

    assert_eq!(first.articles_inserted, 2);
    assert_eq!(first.duplicates_skipped, 2);
    assert_eq!(second.articles_inserted, 0);
    assert_eq!(second.duplicates_skipped, 4);
    assert_eq!(source.requested_pages(), vec![1, 1, 2, 2]);

    let repository = Repository::open(&env.config.database_path)?;
    let articles = repository.list_articles().await?;
    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|article| article.country == "USA"));

    Ok(())
}

#[tokio::test]
async fn test_newsRun_shouldWriteWeekdayCountsToCsv() -> Result<()> {
    let env = common::create_test_env(1)?;
    std::fs::write(env.news_counter(), "1")?;
    let controller = Controller::with_config(env.config.clone())?;

    controller.run_news_with(&MockNewsSource::with_articles(monday_articles())).await?;

    let csv = std::fs::read_to_string(env.output(reports::ARTICLE_TRENDS_FILE))?;
    assert_eq!(csv, "Country,Article Count,Day of Week\nUSA,2,1\n");

    Ok(())
}

#[tokio::test]
async fn test_newsRun_withOversizedPage_shouldTruncateToPageSize() -> Result<()> {
    let mut env = common::create_test_env(1)?;
    env.config.news.page_size = 2;
    std::fs::write(env.news_counter(), "1")?;
    let controller = Controller::with_config(env.config.clone())?;

    let page: Vec<ArticleRecord> = (0..4)
        .map(|i| ArticleRecord::new("Wire", format!("Story {}", i), None))
        .collect();

    let summary = controller.run_news_with(&MockNewsSource::with_articles(page)).await?;

    assert_eq!(summary.articles_inserted, 2);
    assert_eq!(summary.duplicates_skipped, 2);

    Ok(())
}
