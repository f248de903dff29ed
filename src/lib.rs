pub mod api;
pub mod cache;
pub mod collection_view;
pub mod config;
pub mod error;
pub mod store;
pub mod tracker;

// Re-export commonly used items
pub use api::{CardRecord, CatalogClient, PokedexEntry, SearchResponse, SetInfo, SetsResponse};
pub use cache::{FetchCache, FetchOptions};
pub use collection_view::{available_sets, filter_cards, filter_pokedex, SetOption};
pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use store::{CollectionKind, CollectionStore, Notice, NoticeLevel, NotifyPolicy, Snapshot};
pub use tracker::Tracker;
