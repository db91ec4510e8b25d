//! YouTube Data API video lookup

use std::time::Duration;

use async_trait::async_trait;
use coursewise_core::VideoLookup;
use serde::Deserialize;
use tracing::{debug, warn};

/// Default YouTube Data API v3 base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

/// Finds the top video for a query with `search.list`
pub struct YouTubeSearch {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Send requests through `client`, sharing its connection pool
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn first_video(&self, query: &str) -> Result<Option<String>, reqwest::Error> {
        let url = format!("{}/search", self.base_url);
        let response: SearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("part", "snippet"),
                ("maxResults", "1"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .items
            .into_iter()
            .find_map(|item| item.id.video_id))
    }
}

#[async_trait]
impl VideoLookup for YouTubeSearch {
    async fn search(&self, query: &str) -> Option<String> {
        match self.first_video(query).await {
            Ok(found) => {
                debug!(query, found = found.is_some(), "youtube search");
                found
            }
            Err(e) => {
                warn!(error = %e, "youtube search failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_first_video_id() {
        let body = r#"{"items":[{"id":{"kind":"youtube#video","videoId":"abc123"}}]}"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        let id = response.items.into_iter().find_map(|i| i.id.video_id);
        assert_eq!(id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_empty_result_has_no_items() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.items.is_empty());
    }

    #[tokio::test]
    async fn test_requests_go_through_injected_client() {
        use axum::{Json, Router, http::HeaderMap, routing::get};

        let app = Router::new().route(
            "/search",
            get(|headers: HeaderMap| async move {
                let id = if headers.contains_key("x-coursewise") { "shared" } else { "fresh" };
                Json(serde_json::json!({ "items": [{ "id": { "videoId": id } }] }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-coursewise", reqwest::header::HeaderValue::from_static("1"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap();
        let base_url = format!("http://{}", addr);

        let shared = YouTubeSearch::with_base_url("key", &base_url).with_client(client);
        let fresh = YouTubeSearch::with_base_url("key", &base_url);

        assert_eq!(shared.search("rust").await.as_deref(), Some("shared"));
        assert_eq!(fresh.search("rust").await.as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_unreachable_api_yields_none() {
        let search = YouTubeSearch::with_base_url("key", "http://127.0.0.1:1");
        assert!(search.search("rust introduction").await.is_none());
    }
}
