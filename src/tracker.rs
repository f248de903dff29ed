//! Application context: one fetch cache, one catalog client, two collections.

use std::sync::{Arc, OnceLock};

use crate::api::CatalogClient;
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::store::{CollectionKind, CollectionStore, JsonFileStorage, Storage};

pub struct Tracker {
    config: TrackerConfig,
    catalog: CatalogClient,
    wishlist: CollectionStore,
    owned: CollectionStore,
}

impl Tracker {
    /// Build the context, persisting collections under `config.data_dir`
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(JsonFileStorage::new(&config.data_dir));
        Self::with_storage(config, storage)
    }

    /// Build the context on top of an existing storage backend
    pub fn with_storage(config: TrackerConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        config.validate()?;
        log::info!(
            "Initializing tracker (freshness: {}s)",
            config.freshness.num_seconds()
        );

        let catalog = CatalogClient::from_config(&config);
        let wishlist = CollectionStore::open(CollectionKind::Wishlist, storage.clone());
        let owned = CollectionStore::open(CollectionKind::Owned, storage);

        Ok(Self {
            config,
            catalog,
            wishlist,
            owned,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn wishlist(&self) -> &CollectionStore {
        &self.wishlist
    }

    pub fn owned(&self) -> &CollectionStore {
        &self.owned
    }

    pub fn collection(&self, kind: CollectionKind) -> &CollectionStore {
        match kind {
            CollectionKind::Wishlist => &self.wishlist,
            CollectionKind::Owned => &self.owned,
        }
    }
}

static GLOBAL: OnceLock<Tracker> = OnceLock::new();

/// Install the process-wide tracker. Only the first call succeeds.
pub fn init_global(config: TrackerConfig) -> Result<&'static Tracker> {
    let tracker = Tracker::new(config)?;
    GLOBAL
        .set(tracker)
        .map_err(|_| TrackerError::Config("tracker already initialized".to_string()))?;
    global().ok_or_else(|| TrackerError::Config("tracker not initialized".to_string()))
}

/// The process-wide tracker, if [`init_global`] has run
pub fn global() -> Option<&'static Tracker> {
    GLOBAL.get()
}
