pub mod feed_service;
pub mod publish_service;
