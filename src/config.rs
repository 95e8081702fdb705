use std::env;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use log::warn;
use tokio_postgres::config::SslMode;
use tokio_postgres::NoTls;

pub const DEFAULT_API_VERSION: &str = "19.0";
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Page credentials. Present only when both id and token are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub page_id: String,
    pub access_token: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: usize,
    pub feed: Option<FeedConfig>,
    pub graph_url: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").context("DATABASE_URL not set")?;

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse::<usize>().context("DB_MAX_CONNECTIONS must be a number")?,
            None => 16,
        };

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().context("PORT must be a number")?,
            None => 8080,
        };

        let feed = match (get("FB_PAGE_ID"), get("FB_ACCESS_TOKEN")) {
            (Some(page_id), Some(access_token)) => Some(FeedConfig {
                page_id,
                access_token,
                api_version: get("FB_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.into()),
            }),
            (Some(_), None) | (None, Some(_)) => {
                warn!("only one of FB_PAGE_ID / FB_ACCESS_TOKEN is set, page publishing disabled");
                None
            }
            (None, None) => None,
        };

        let allowed_origins = get("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            database_url,
            db_max_connections,
            feed,
            graph_url: get("FB_GRAPH_URL").unwrap_or_else(|| DEFAULT_GRAPH_URL.into()),
            port,
            allowed_origins,
        })
    }
}

pub fn get_pg_pool(config: &AppConfig) -> Result<Pool> {
    let pg_config = tokio_postgres::Config::from_str(&config.database_url)
        .context("DATABASE_URL is not a valid postgres connection string")?;

    // The pool connects without TLS.
    if matches!(pg_config.get_ssl_mode(), SslMode::Require) {
        bail!("DATABASE_URL asks for sslmode=require, but TLS connections are not supported");
    }

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    Pool::builder(manager)
        .max_size(config.db_max_connections)
        .runtime(Runtime::Tokio1)
        .build()
        .context("failed to create postgres pool")
}

/// Shows only the ends of a secret, for logs.
pub fn mask_key(k: &str) -> String {
    let chars: Vec<char> = k.chars().collect();
    if chars.len() <= 8 {
        "[REDACTED]".to_string()
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
