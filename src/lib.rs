use std::sync::Arc;

use cache::{EXPIRATION_SECONDS, PredictionCache, REQUEST_WINDOW, RequestLedger};
use classifier::Classifier;
use config::Config;
use database::Store;
use profile::ProfileSource;

pub mod cache;
pub mod classifier;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod profile;
pub mod router;
pub mod routes;
pub mod utils;

pub use router::create_router;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: PredictionCache,
    pub ledger: RequestLedger,
    pub classifier: Arc<dyn Classifier>,
    pub profiles: Arc<dyn ProfileSource>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Store,
        classifier: Arc<dyn Classifier>,
        profiles: Arc<dyn ProfileSource>,
    ) -> Self {
        Self {
            cache: PredictionCache::new(store.clone(), EXPIRATION_SECONDS),
            ledger: RequestLedger::new(store, REQUEST_WINDOW),
            config,
            classifier,
            profiles,
        }
    }
}
