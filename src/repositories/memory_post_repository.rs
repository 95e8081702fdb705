//! In-memory post store used by the unit tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::post::{NewPost, Post};
use crate::repositories::post_repository::{PostStore, RepoError};

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn all(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }
}

#[async_trait]
impl PostStore for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        let created = Post {
            id: posts.len() as i64 + 1,
            title: post.title,
            content: post.content,
            created_at: Utc::now(),
        };
        posts.push(created.clone());
        Ok(created)
    }

    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts = self.posts.read().await.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }
}
