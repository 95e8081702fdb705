pub mod page_handlers;
pub mod post_handlers;

use actix_web::web;

use crate::handlers::page_handlers::index;
use crate::handlers::post_handlers::{create_post, json_config, list_posts};

/// Routes shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(index) // GET /
        .service(list_posts) // GET /posts
        .service(create_post) // POST /posts
        .service(
            web::scope("/api")
                .service(list_posts) // GET /api/posts
                .service(create_post), // POST /api/posts
        );
}
