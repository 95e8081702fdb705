// src/handlers/post_handlers.rs - create and list posts

use actix_web::http::StatusCode;
use actix_web::error::InternalError;
use actix_web::{get, post, web, HttpRequest, HttpResponse, ResponseError};
use log::{error, info, warn};

use crate::dtos::post_dtos::{CreatePostDTO, CreatePostOut, ErrorOut};
use crate::services::publish_service::PublishError;
use crate::AppState;

/// Client-facing errors. Only a generic message leaves the server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(&'static str),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorOut {
            error: self.to_string(),
        })
    }
}

/// Malformed JSON bodies answer with the same `{error}` shape as everything else.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req: &HttpRequest| {
        warn!("rejected post body: {}", err);
        let resp = ApiError::BadRequest("Invalid JSON body".to_string()).error_response();
        InternalError::from_response(err, resp).into()
    })
}

#[get("/posts")]
pub async fn list_posts(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    match app_state.publish_service.list_posts().await {
        Ok(posts) => {
            info!("listing {} posts", posts.len());
            Ok(HttpResponse::Ok().json(posts))
        }
        Err(e) => {
            error!("failed to fetch posts: {}", e);
            Err(ApiError::Internal("Failed to fetch posts"))
        }
    }
}

#[post("/posts")]
pub async fn create_post(
    app_state: web::Data<AppState>,
    body: web::Json<CreatePostDTO>,
) -> Result<HttpResponse, ApiError> {
    info!("received request to create a post");

    match app_state.publish_service.publish(body.into_inner()).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(CreatePostOut {
            id: outcome.post_id,
            fb_post_id: outcome.fb_post_id,
            message: outcome.feed_status.message().map(str::to_string),
        })),
        Err(PublishError::InvalidInput(msg)) => Err(ApiError::BadRequest(msg)),
        Err(PublishError::Storage(e)) => {
            error!("error creating post: {}", e);
            Err(ApiError::Internal("Failed to create post"))
        }
    }
}
