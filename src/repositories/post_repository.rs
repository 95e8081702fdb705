// src/repositories/post_repository.rs - Postgres-backed post store

use async_trait::async_trait;
use deadpool_postgres::Pool;
use log::{debug, info};
use thiserror::Error;
use tokio_postgres::Row;

use crate::models::post::{NewPost, Post};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

const CREATE_POSTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS posts (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )";

/// Durable storage for posts. Validation happens before `create` is called.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Every post, newest first.
    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError>;
}

pub struct PostRepository {
    pool: Pool,
}

impl PostRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the `posts` table if it is not there yet.
    pub async fn ensure_schema(&self) -> Result<(), RepoError> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_POSTS_TABLE).await?;
        info!("posts table ready");
        Ok(())
    }

    fn row_to_post(row: &Row) -> Result<Post, RepoError> {
        Ok(Post {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl PostStore for PostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                "INSERT INTO posts (title, content) VALUES ($1, $2) \
                 RETURNING id, title, content, created_at",
            )
            .await?;
        let row = client.query_one(&stmt, &[&post.title, &post.content]).await?;
        let created = Self::row_to_post(&row)?;
        debug!("inserted post id={}", created.id);
        Ok(created)
    }

    async fn list_newest_first(&self) -> Result<Vec<Post>, RepoError> {
        let client = self.pool.get().await?;
        let stmt = client
            .prepare_cached(
                "SELECT id, title, content, created_at FROM posts \
                 ORDER BY created_at DESC, id DESC",
            )
            .await?;
        let rows = client.query(&stmt, &[]).await?;
        debug!("fetched {} posts", rows.len());
        rows.iter().map(Self::row_to_post).collect()
    }
}
