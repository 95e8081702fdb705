// src/services/feed_service.rs - Facebook Page feed client (Graph API)
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::FeedConfig;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("graph api error: {0}")]
    Api(String),
    #[error("invalid graph response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The request URL carries the access token, so it never goes into the error.
impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Http(e.without_url())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedItem {
    pub id: String,
}

/// What the create call answered. Some API versions leave `id` out.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FeedItemCreated {
    pub id: Option<String>,
}

/// The page feed this service mirrors posts to.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn create_feed_item(&self, message: &str) -> Result<FeedItemCreated, FeedError>;

    /// Most recent items first, at most `limit` of them.
    async fn read_recent_feed_items(&self, limit: u32) -> Result<Vec<FeedItem>, FeedError>;
}

#[derive(Deserialize)]
struct GraphErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct GraphEnvelope {
    error: Option<GraphErrorBody>,
}

#[derive(Deserialize)]
struct FeedPage {
    #[serde(default)]
    data: Vec<FeedItem>,
}

#[derive(Clone)]
pub struct GraphFeedClient {
    client: Client,
    feed_url: String,
    access_token: String,
}

impl GraphFeedClient {
    pub fn new(client: Client, graph_url: &str, config: &FeedConfig) -> Self {
        let version = config.api_version.trim().trim_start_matches('v');
        let feed_url = format!(
            "{}/v{}/{}/feed",
            graph_url.trim_end_matches('/'),
            version,
            config.page_id
        );

        Self {
            client,
            feed_url,
            access_token: config.access_token.clone(),
        }
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Graph reports failures either with a non-2xx status or with an
    /// `error` object in an otherwise normal body.
    async fn read_body(resp: reqwest::Response) -> Result<String, FeedError> {
        let status = resp.status();
        let text = resp.text().await?;

        let envelope: Option<GraphEnvelope> = serde_json::from_str(&text).ok();
        if let Some(GraphEnvelope { error: Some(err) }) = envelope {
            let msg = err.message.unwrap_or_else(|| format!("status {}", status));
            return Err(FeedError::Api(msg));
        }
        if !status.is_success() {
            return Err(FeedError::Api(format!("status {}: {}", status, text)));
        }
        Ok(text)
    }
}

#[async_trait]
impl FeedClient for GraphFeedClient {
    async fn create_feed_item(&self, message: &str) -> Result<FeedItemCreated, FeedError> {
        #[derive(Serialize)]
        struct Body<'a> {
            message: &'a str,
        }

        let resp = self
            .client
            .post(&self.feed_url)
            .query(&[("access_token", self.access_token.as_str())])
            .json(&Body { message })
            .send()
            .await?;

        let text = Self::read_body(resp).await?;
        let created: FeedItemCreated = serde_json::from_str(&text)?;
        debug!("feed create answered id={:?}", created.id);
        Ok(created)
    }

    async fn read_recent_feed_items(&self, limit: u32) -> Result<Vec<FeedItem>, FeedError> {
        let resp = self
            .client
            .get(&self.feed_url)
            .query(&[
                ("fields", "id".to_string()),
                ("limit", limit.to_string()),
                ("access_token", self.access_token.clone()),
            ])
            .send()
            .await?;

        let text = Self::read_body(resp).await?;
        let page: FeedPage = serde_json::from_str(&text)?;
        Ok(page.data)
    }
}
