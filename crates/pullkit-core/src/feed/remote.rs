use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::models::{ItemId, Page};
use super::source::FeedDataSource;
use crate::config::AppConfig;
use crate::{Error, Result};

/// Wire shape of the feed endpoint: `{ "posts": [...] }`.
#[derive(Deserialize)]
struct PostsResponse {
    posts: Page,
}

/// HTTP JSON data source.
///
/// Talks to a feed endpoint exposing `GET {base}/posts` for the first page
/// and `GET {base}/posts?cursor={id}` for subsequent pages. Retries with
/// exponential backoff when the endpoint is busy; a 404/410 on a cursor
/// request means the cursor item is gone server-side.
pub struct RemoteSource {
    client: Client,
    base_url: Url,
    max_retries: u32,
    initial_retry_delay_ms: u64,
    max_page_bytes: usize,
}

impl RemoteSource {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.sync.request_timeout_secs))
            .gzip(true)
            .build()?;
        let base_url = Url::parse(&config.remote.base_url)?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.sync.max_retries.max(1),
            initial_retry_delay_ms: config.sync.initial_retry_delay_ms,
            max_page_bytes: config.sync.max_page_bytes,
        })
    }

    /// Build the page URL, appending the cursor as a query parameter.
    fn posts_url(&self, cursor: Option<&ItemId>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("base URL cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .push("posts");

        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", &cursor.0);
        }
        Ok(url)
    }

    async fn fetch_page(&self, cursor: Option<&ItemId>) -> Result<Page> {
        let url = self.posts_url(cursor)?;
        let body = self.fetch_with_retry(&url, cursor).await?;
        let response: PostsResponse = serde_json::from_slice(&body)?;
        Ok(response.posts)
    }

    /// Fetch with retry and exponential backoff on busy statuses.
    async fn fetch_with_retry(&self, url: &Url, cursor: Option<&ItemId>) -> Result<Bytes> {
        let mut last_error = None;
        let mut delay_ms = self.initial_retry_delay_ms;

        for attempt in 0..self.max_retries {
            debug!(%url, attempt = attempt + 1, "fetching feed page");

            match self.client.get(url.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS
                        || status == StatusCode::SERVICE_UNAVAILABLE
                    {
                        warn!(%url, %status, delay_ms, "feed endpoint busy, retrying");
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms *= 2;
                        last_error = Some(Error::Status(status.as_u16()));
                        continue;
                    }

                    if let Some(cursor) = cursor {
                        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
                            return Err(Error::InvalidCursor(cursor.clone()));
                        }
                    }

                    if !status.is_success() {
                        return Err(Error::Status(status.as_u16()));
                    }

                    match response.bytes().await {
                        Ok(bytes) => {
                            if bytes.len() > self.max_page_bytes {
                                return Err(Error::PageTooLarge(bytes.len()));
                            }
                            return Ok(bytes);
                        }
                        Err(e) => {
                            warn!(%url, "failed to read response body: {}", e);
                            last_error = Some(Error::Http(e));
                        }
                    }
                }
                Err(e) => {
                    warn!(%url, attempt = attempt + 1, "request failed: {}", e);
                    last_error = Some(Error::Http(e));
                }
            }

            if attempt < self.max_retries - 1 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms *= 2;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Other(format!(
                "fetch failed after {} attempts: {}",
                self.max_retries, url
            ))
        }))
    }
}

#[async_trait]
impl FeedDataSource for RemoteSource {
    async fn fetch_first_page(&self) -> Result<Page> {
        self.fetch_page(None).await
    }

    async fn fetch_after(&self, cursor: &ItemId) -> Result<Page> {
        self.fetch_page(Some(cursor)).await
    }
}
