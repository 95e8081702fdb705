// src/main.rs
mod config;
mod dtos;
mod handlers;
mod models;
mod repositories;
mod services;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};
use reqwest::Client;

use crate::config::{mask_key, AppConfig};
use crate::repositories::post_repository::PostRepository;
use crate::services::feed_service::{FeedClient, GraphFeedClient};
use crate::services::publish_service::PublishService;

pub struct AppState {
    pub publish_service: PublishService,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let app_config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let pg_pool = match config::get_pg_pool(&app_config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to create PG pool: {:#}", e);
            std::process::exit(1);
        }
    };

    let repository = PostRepository::new(pg_pool);
    if let Err(e) = repository.ensure_schema().await {
        error!("Failed to prepare posts table: {}", e);
        std::process::exit(1);
    }

    let http_client = Client::builder()
        .user_agent("page-blog-be/0.1")
        .build()
        .map_err(std::io::Error::other)?;

    let feed: Option<Arc<dyn FeedClient>> = match &app_config.feed {
        Some(feed_config) => {
            info!("FB Page ID: {}", feed_config.page_id);
            info!("FB Access Token: {}", mask_key(&feed_config.access_token));
            let client = GraphFeedClient::new(http_client, &app_config.graph_url, feed_config);
            info!("Page feed endpoint: {}", client.feed_url());
            let client: Arc<dyn FeedClient> = Arc::new(client);
            Some(client)
        }
        None => {
            warn!("FB_PAGE_ID / FB_ACCESS_TOKEN not set, posts will only be saved locally");
            None
        }
    };

    let state = web::Data::new(AppState {
        publish_service: PublishService::new(Arc::new(repository), feed),
    });

    let allowed_origins = app_config.allowed_origins.clone();
    let bind_address = format!("0.0.0.0:{}", app_config.port);

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["content-type", "accept"])
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
