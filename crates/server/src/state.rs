//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::claude::ClaudeClient;
use crate::config::ServerConfig;
use crate::shopify::ShopifyClient;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    claude_client: ClaudeClient,
    shopify_client: ShopifyClient,
}

impl AppState {
    /// Bundle configuration, pool and upstream clients.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        pool: PgPool,
        claude_client: ClaudeClient,
        shopify_client: ShopifyClient,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                claude_client,
                shopify_client,
            }),
        }
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Claude API client.
    #[must_use]
    pub fn claude(&self) -> &ClaudeClient {
        &self.inner.claude_client
    }

    /// Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyClient {
        &self.inner.shopify_client
    }
}
