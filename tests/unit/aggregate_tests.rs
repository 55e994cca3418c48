/*!
 * Tests for aggregation through the repository
 */

use cityfeed::database::aggregate::{AggregateSpec, Column, FactTable, GroupKey, Metric, MetricValue};
use cityfeed::database::models::{AirQualityRecord, ArticleRecord, WeatherRecord};
use cityfeed::database::Repository;

fn air_quality(city: &str, aqi: i64, pm2_5: f64, timestamp: i64) -> AirQualityRecord {
    AirQualityRecord {
        city: city.to_string(),
        aqi,
        pm2_5,
        pm10: 1.0,
        co: 1.0,
        no2: 1.0,
        o3: 1.0,
        so2: 1.0,
        timestamp,
    }
}

#[tokio::test]
async fn test_airQualitySummary_shouldReportLatestAqiNotMode() {
    let repo = Repository::new_in_memory().unwrap();

    repo.upsert_air_quality(&air_quality("Fresno", 2, 10.0, 100)).await.unwrap();
    repo.upsert_air_quality(&air_quality("Fresno", 2, 20.0, 200)).await.unwrap();
    repo.upsert_air_quality(&air_quality("Fresno", 3, 30.0, 300)).await.unwrap();

    let summary = repo.air_quality_summary().await.unwrap();

    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].aqi, Some(3));
    assert_eq!(summary[0].avg_pm2_5, Some(20.0));
}

#[tokio::test]
async fn test_aggregate_countByCity_shouldCountObservations() {
    let repo = Repository::new_in_memory().unwrap();
    for (city, timestamp) in [("Akron", 1), ("Akron", 2), ("Dayton", 1)] {
        repo.upsert_weather(&WeatherRecord {
            city: city.to_string(),
            temperature: 10.0,
            humidity: 50,
            wind_speed: 1.0,
            description: "mist".to_string(),
            timestamp,
        })
        .await
        .unwrap();
    }

    let rows = repo
        .aggregate(AggregateSpec::new(FactTable::WeatherHistory, GroupKey::City, vec![Metric::Count]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].group, vec!["Akron".to_string()]);
    assert_eq!(rows[0].values, vec![MetricValue::Integer(Some(2))]);
    assert_eq!(rows[1].values, vec![MetricValue::Integer(Some(1))]);
}

#[tokio::test]
async fn test_aggregate_meanOfCategoricalColumn_shouldBeRejected() {
    let repo = Repository::new_in_memory().unwrap();

    let result = repo
        .aggregate(AggregateSpec::new(
            FactTable::AirQualityHistory,
            GroupKey::City,
            vec![Metric::Mean(Column::Aqi)],
        ))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_aggregate_columnFromOtherTable_shouldBeRejected() {
    let repo = Repository::new_in_memory().unwrap();

    let result = repo
        .aggregate(AggregateSpec::new(
            FactTable::Weather,
            GroupKey::City,
            vec![Metric::Mean(Column::Pm2_5)],
        ))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_aggregate_latestByWeekday_shouldBeRejected() {
    let repo = Repository::new_in_memory().unwrap();

    let result = repo
        .aggregate(AggregateSpec::new(
            FactTable::Articles,
            GroupKey::CountryAndWeekday,
            vec![Metric::Latest(Column::Aqi)],
        ))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_articleTrends_shouldIgnoreArticlesWithoutDate() {
    let repo = Repository::new_in_memory().unwrap();
    repo.insert_articles(
        "Canada",
        vec![
            ArticleRecord::new("CBC", "Snow day", Some("2024-03-09T12:00:00Z".to_string())),
            ArticleRecord::new("CBC", "Undated", None),
            ArticleRecord::new("CTV", "Bad date", Some("yesterday".to_string())),
        ],
    )
    .await
    .unwrap();

    let trends = repo.article_trends().await.unwrap();

    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].country, "Canada");
    assert_eq!(trends[0].article_count, 1);
    assert_eq!(trends[0].day_of_week, 6);
}
