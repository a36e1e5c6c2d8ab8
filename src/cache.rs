//! In-memory caching using moka
//!
//! Holds a snapshot of the pricing tables (categories, insurance rates,
//! settings). The calculator reads them on every request and they only
//! change through the back office, which invalidates the snapshot.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::pricing::models::PricingConfig;
use crate::pricing::queries;

const PRICING_KEY: &str = "pricing";

/// Application cache
#[derive(Clone)]
pub struct AppCache {
    /// Pricing tables snapshot (singleton)
    pub pricing: Cache<String, Arc<PricingConfig>>,
}

impl AppCache {
    /// Create a new cache instance with the given snapshot TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            pricing: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn pricing_config(&self) -> Option<Arc<PricingConfig>> {
        self.pricing.get(PRICING_KEY).await
    }

    pub async fn store_pricing_config(&self, config: PricingConfig) -> Arc<PricingConfig> {
        let config = Arc::new(config);
        self.pricing
            .insert(PRICING_KEY.to_string(), Arc::clone(&config))
            .await;
        config
    }

    /// Drop the pricing snapshot after a write to any pricing table
    pub async fn invalidate_pricing(&self) {
        self.pricing.invalidate(PRICING_KEY).await;
        info!("Pricing cache invalidated");
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            pricing_cached: self.pricing.entry_count() > 0,
        }
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10 * 60))
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub pricing_cached: bool,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes it every `every`.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, every: Duration) {
    let mut interval = interval(every);
    loop {
        // first tick fires immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

async fn warm_cache(cache: &AppCache, db: &PgPool) {
    match queries::load_pricing_config(db).await {
        Ok(config) => {
            info!(
                categories = config.categories.len(),
                insurance_rates = config.insurance_rates.len(),
                "Pricing cache warmed"
            );
            cache.store_pricing_config(config).await;
        }
        Err(e) => warn!("Failed to warm pricing cache: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_invalidate_pricing() {
        let cache = AppCache::default();
        assert!(cache.pricing_config().await.is_none());

        cache.store_pricing_config(PricingConfig::default()).await;
        assert!(cache.pricing_config().await.is_some());

        cache.invalidate_pricing().await;
        assert!(cache.pricing_config().await.is_none());
    }
}
