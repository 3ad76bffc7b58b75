// =============================================================================
// Central Application State
// =============================================================================
//
// Built once in `main` and shared with every handler through `Arc<AppState>`.
// Nothing here is mutated after construction; the response caches inside
// `AnalysisService` carry their own locking.
// =============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::arbiter::ModelArbiter;
use crate::cache::ResponseCache;
use crate::market_data::PriceStore;
use crate::news::NewsSource;
use crate::pipeline::AnalysisService;
use crate::runtime_config::RuntimeConfig;

pub struct AppState {
    pub config: RuntimeConfig,
    pub prices: PriceStore,
    pub analysis: AnalysisService,
    started_at: Instant,
}

impl AppState {
    /// Wire the store, caches and analysis service from `config`.
    pub fn new(
        config: RuntimeConfig,
        arbiter: ModelArbiter,
        news_source: Arc<dyn NewsSource>,
    ) -> Self {
        let ttl = config.cache_ttl();
        let analysis = AnalysisService::new(
            arbiter,
            Arc::new(ResponseCache::with_ttl(ttl)),
            Arc::new(ResponseCache::with_ttl(ttl)),
            news_source,
        );
        Self {
            prices: PriceStore::new(config.data_dir.clone()),
            config,
            analysis,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
