//! Read-only clients for the card catalog and species reference APIs.
//!
//! Every read goes through the shared [`FetchCache`], so repeated listings
//! within the freshness window never reach the network.

pub mod models;
mod pokeapi;
mod pokemon_tcg;

use std::sync::Arc;

use crate::cache::FetchCache;
use crate::config::TrackerConfig;

pub use models::{
    CardImages, CardRecord, CardResponse, Legalities, Page, PokedexEntry, SearchResponse,
    SetDescriptor, SetImages, SetInfo, SetsResponse,
};
pub use pokeapi::{DEFAULT_POKEDEX_LIMIT, SPRITE_BASE_URL};
pub use pokemon_tcg::{CARDS_BY_POKEMON_PAGE_SIZE, SEARCH_PAGE_SIZE, SETS_PAGE_SIZE};

/// Catalog client for cards, sets and species.
pub struct CatalogClient {
    pub(crate) cache: Arc<FetchCache>,
    pub(crate) card_api_url: String,
    pub(crate) species_api_url: String,
}

impl CatalogClient {
    pub fn new(cache: Arc<FetchCache>, card_api_url: &str, species_api_url: &str) -> Self {
        log::debug!(
            "Creating catalog client (cards: {}, species: {})",
            card_api_url,
            species_api_url
        );
        Self {
            cache,
            card_api_url: card_api_url.trim_end_matches('/').to_string(),
            species_api_url: species_api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            Arc::new(FetchCache::from_config(config)),
            &config.card_api_url,
            &config.species_api_url,
        )
    }

    /// The cache backing this client
    pub fn cache(&self) -> &Arc<FetchCache> {
        &self.cache
    }
}
