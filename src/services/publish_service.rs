// src/services/publish_service.rs - save a post locally, then mirror it to the page feed
use std::sync::Arc;

use log::{error, info, warn};
use thiserror::Error;

use crate::dtos::post_dtos::CreatePostDTO;
use crate::models::post::{NewPost, Post};
use crate::repositories::post_repository::{PostStore, RepoError};
use crate::services::feed_service::FeedClient;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage error: {0}")]
    Storage(#[from] RepoError),
}

/// How far the page feed step got. Only the local write decides success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Published,
    Skipped,
    PublishFailed,
    LookupFailed,
}

impl FeedStatus {
    /// Note shown to the client when the feed step did not fully succeed.
    pub fn message(self) -> Option<&'static str> {
        match self {
            FeedStatus::Published => None,
            FeedStatus::Skipped => Some("Post saved locally; page publishing is not configured"),
            FeedStatus::PublishFailed => Some("Post saved locally, but publishing to the page failed"),
            FeedStatus::LookupFailed => {
                Some("Post saved and published, but the page post id could not be retrieved")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub post_id: i64,
    pub fb_post_id: Option<String>,
    pub feed_status: FeedStatus,
}

#[derive(Clone)]
pub struct PublishService {
    store: Arc<dyn PostStore>,
    feed: Option<Arc<dyn FeedClient>>,
}

impl PublishService {
    pub fn new(store: Arc<dyn PostStore>, feed: Option<Arc<dyn FeedClient>>) -> Self {
        Self { store, feed }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, PublishError> {
        Ok(self.store.list_newest_first().await?)
    }

    pub async fn publish(&self, input: CreatePostDTO) -> Result<PublishOutcome, PublishError> {
        let new_post =
            NewPost::from_parts(input.title, input.content).map_err(PublishError::InvalidInput)?;
        let message = new_post.feed_message();

        let post = self.store.create(new_post).await.map_err(|e| {
            error!("failed to save post: {}", e);
            e
        })?;
        info!("post {} saved", post.id);

        let Some(feed) = self.feed.as_ref() else {
            warn!("page credentials missing, skipping feed publish for post {}", post.id);
            return Ok(Self::outcome(post.id, None, FeedStatus::Skipped));
        };

        match feed.create_feed_item(&message).await {
            Ok(created) => info!("post {} published to page (create id: {:?})", post.id, created.id),
            Err(e) => {
                warn!("publishing post {} to page failed: {}", post.id, e);
                return Ok(Self::outcome(post.id, None, FeedStatus::PublishFailed));
            }
        }

        // The create response is not trusted to carry the id; read it back.
        match feed.read_recent_feed_items(1).await {
            Ok(items) => match items.into_iter().next() {
                Some(item) => Ok(Self::outcome(post.id, Some(item.id), FeedStatus::Published)),
                None => {
                    warn!("page feed came back empty after publishing post {}", post.id);
                    Ok(Self::outcome(post.id, None, FeedStatus::LookupFailed))
                }
            },
            Err(e) => {
                warn!("looking up page post id for post {} failed: {}", post.id, e);
                Ok(Self::outcome(post.id, None, FeedStatus::LookupFailed))
            }
        }
    }

    fn outcome(post_id: i64, fb_post_id: Option<String>, feed_status: FeedStatus) -> PublishOutcome {
        PublishOutcome {
            post_id,
            fb_post_id,
            feed_status,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::repositories::memory_post_repository::InMemoryPostRepository;
    use crate::services::feed_service::{FeedError, FeedItem, FeedItemCreated};

    /// Scripted feed: each call either succeeds with the given value or fails.
    #[derive(Default)]
    pub(crate) struct StubFeed {
        pub create_fails: bool,
        pub create_id: Option<String>,
        pub lookup_fails: bool,
        pub recent: Vec<String>,
        pub messages: Mutex<Vec<String>>,
        pub lookups: Mutex<u32>,
    }

    #[async_trait]
    impl FeedClient for StubFeed {
        async fn create_feed_item(&self, message: &str) -> Result<FeedItemCreated, FeedError> {
            self.messages.lock().unwrap().push(message.to_string());
            if self.create_fails {
                return Err(FeedError::Api("(#200) permissions error".into()));
            }
            Ok(FeedItemCreated {
                id: self.create_id.clone(),
            })
        }

        async fn read_recent_feed_items(&self, limit: u32) -> Result<Vec<FeedItem>, FeedError> {
            *self.lookups.lock().unwrap() += 1;
            if self.lookup_fails {
                return Err(FeedError::Api("lookup failed".into()));
            }
            Ok(self
                .recent
                .iter()
                .take(limit as usize)
                .map(|id| FeedItem { id: id.clone() })
                .collect())
        }
    }

    pub(crate) struct BrokenStore;

    #[async_trait]
    impl PostStore for BrokenStore {
        async fn create(&self, _post: NewPost) -> Result<Post, RepoError> {
            Err(RepoError::Pool(deadpool_postgres::PoolError::Closed))
        }

        async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
            Err(RepoError::Pool(deadpool_postgres::PoolError::Closed))
        }
    }

    fn dto(title: &str, content: &str) -> CreatePostDTO {
        CreatePostDTO {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_writing() {
        let store = Arc::new(InMemoryPostRepository::new());
        let feed = Arc::new(StubFeed::default());
        let svc = PublishService::new(store.clone(), Some(feed.clone()));

        let err = svc.publish(dto("", "x")).await.unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));
        let err = svc.publish(dto("x", "")).await.unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));
        let err = svc.publish(CreatePostDTO::default()).await.unwrap_err();
        assert!(matches!(err, PublishError::InvalidInput(_)));

        assert_eq!(store.len().await, 0);
        assert!(feed.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn without_feed_the_post_is_saved_and_skipped() {
        let store = Arc::new(InMemoryPostRepository::new());
        let svc = PublishService::new(store.clone(), None);

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id, None);
        assert_eq!(outcome.feed_status, FeedStatus::Skipped);

        let posts = store.all().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, outcome.post_id);
        assert_eq!(posts[0].title, "Hello");
        assert_eq!(posts[0].content, "World");
    }

    #[tokio::test]
    async fn published_post_reports_looked_up_id() {
        let store = Arc::new(InMemoryPostRepository::new());
        let feed = Arc::new(StubFeed {
            recent: vec!["1234_42".into(), "1234_41".into()],
            ..Default::default()
        });
        let svc = PublishService::new(store.clone(), Some(feed.clone()));

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id.as_deref(), Some("1234_42"));
        assert_eq!(outcome.feed_status, FeedStatus::Published);
        assert_eq!(*feed.messages.lock().unwrap(), vec!["Hello\n\nWorld".to_string()]);
        assert_eq!(*feed.lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_decides_page_post_id_over_create_answer() {
        let store = Arc::new(InMemoryPostRepository::new());
        let feed = Arc::new(StubFeed {
            create_id: Some("A".into()),
            recent: vec!["B".into()],
            ..Default::default()
        });
        let svc = PublishService::new(store, Some(feed.clone()));

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id.as_deref(), Some("B"));
        assert_eq!(outcome.feed_status, FeedStatus::Published);
        assert_eq!(*feed.lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_lookup_drops_create_answer() {
        let store = Arc::new(InMemoryPostRepository::new());
        let feed = Arc::new(StubFeed {
            create_id: Some("A".into()),
            lookup_fails: true,
            ..Default::default()
        });
        let svc = PublishService::new(store, Some(feed.clone()));

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id, None);
        assert_eq!(outcome.feed_status, FeedStatus::LookupFailed);
        assert_eq!(*feed.lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn feed_create_failure_still_succeeds() {
        let store = Arc::new(InMemoryPostRepository::new());
        let feed = Arc::new(StubFeed {
            create_fails: true,
            recent: vec!["1234_42".into()],
            ..Default::default()
        });
        let svc = PublishService::new(store.clone(), Some(feed.clone()));

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id, None);
        assert_eq!(outcome.feed_status, FeedStatus::PublishFailed);
        assert_eq!(*feed.lookups.lock().unwrap(), 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn lookup_failure_still_succeeds() {
        let store = Arc::new(InMemoryPostRepository::new());
        let feed = Arc::new(StubFeed {
            lookup_fails: true,
            ..Default::default()
        });
        let svc = PublishService::new(store.clone(), Some(feed));

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id, None);
        assert_eq!(outcome.feed_status, FeedStatus::LookupFailed);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn empty_lookup_leaves_id_out() {
        let store = Arc::new(InMemoryPostRepository::new());
        let svc = PublishService::new(store, Some(Arc::new(StubFeed::default())));

        let outcome = svc.publish(dto("Hello", "World")).await.unwrap();
        assert_eq!(outcome.fb_post_id, None);
        assert_eq!(outcome.feed_status, FeedStatus::LookupFailed);
    }

    #[tokio::test]
    async fn storage_failure_skips_the_feed() {
        let feed = Arc::new(StubFeed::default());
        let svc = PublishService::new(Arc::new(BrokenStore), Some(feed.clone()));

        let err = svc.publish(dto("Hello", "World")).await.unwrap_err();
        assert!(matches!(err, PublishError::Storage(_)));
        assert!(feed.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resubmitting_creates_a_second_post() {
        let store = Arc::new(InMemoryPostRepository::new());
        let svc = PublishService::new(store.clone(), None);

        let first = svc.publish(dto("Same", "Body")).await.unwrap();
        let second = svc.publish(dto("Same", "Body")).await.unwrap();
        assert_ne!(first.post_id, second.post_id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let store = Arc::new(InMemoryPostRepository::new());
        let svc = PublishService::new(store, None);

        svc.publish(dto("A", "first")).await.unwrap();
        svc.publish(dto("B", "second")).await.unwrap();

        let titles: Vec<String> = svc
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }
}
