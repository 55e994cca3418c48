use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::database::models::ArticleRecord;
use crate::errors::FetchError;
use crate::providers::NewsSource;

/// NewsAPI client for the `everything` endpoint
#[derive(Debug)]
pub struct NewsApiClient {
    /// HTTP client for making requests
    client: Client,
    /// API key sent as `apiKey`
    api_key: String,
    /// Endpoint URL
    endpoint: String,
}

/// NewsAPI response structures
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(rename = "totalResults")]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub source: ArticleSource,
    pub title: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: String,
}

impl NewsApiClient {
    /// Create a new NewsAPI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn articles(&self, query: &str, page: u64, page_size: u32) -> Result<Vec<ArticleRecord>, FetchError> {
        debug!("Fetching page {} of {:?} ({} per page)", page, query, page_size);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query.to_string()),
                ("apiKey", self.api_key.clone()),
                ("pageSize", page_size.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(FetchError::Status {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        parse_articles_response(&body)
    }
}

/// Turn an `everything` response body into article records.
///
/// Articles without a title cannot be deduplicated and are dropped.
pub fn parse_articles_response(body: &str) -> Result<Vec<ArticleRecord>, FetchError> {
    let response: NewsApiResponse = serde_json::from_str(body)?;

    if response.status != "ok" {
        return Err(FetchError::Status {
            status_code: 200,
            message: format!(
                "{}: {}",
                response.code.unwrap_or_else(|| "unknown".to_string()),
                response.message.unwrap_or_else(|| "Unknown error".to_string())
            ),
        });
    }

    let records = response
        .articles
        .into_iter()
        .filter_map(|article| match article.title {
            Some(title) => Some(ArticleRecord::new(article.source.name, title, article.published_at)),
            None => {
                warn!("Dropping untitled article from {}", article.source.name);
                None
            }
        })
        .collect();

    Ok(records)
}
