use serde::{Deserialize, Serialize};

/// Body of `POST /posts`. Fields are optional so a missing one can be
/// reported the same way as an empty one.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostDTO {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostOut {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fb_post_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}
