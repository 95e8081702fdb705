use chrono::{DateTime, Utc};
use serde::Serialize;

/// A row of the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Validated input for inserting a post. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    /// Presence check only: both fields must be given and non-empty.
    pub fn from_parts(title: Option<String>, content: Option<String>) -> Result<Self, String> {
        match (title, content) {
            (Some(title), Some(content)) if !title.is_empty() && !content.is_empty() => {
                Ok(Self { title, content })
            }
            _ => Err("Title and content are required".to_string()),
        }
    }

    /// Text sent to the page feed: title, a blank line, then the content.
    pub fn feed_message(&self) -> String {
        format!("{}\n\n{}", self.title, self.content).trim().to_string()
    }
}
