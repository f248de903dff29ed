//! Runtime configuration for the catalog client and collection storage

use crate::error::{Result, TrackerError};
use std::path::PathBuf;

/// Pokémon TCG API (cards and sets)
pub const DEFAULT_CARD_API_URL: &str = "https://api.pokemontcg.io/v2";
/// PokéAPI (species reference data)
pub const DEFAULT_SPECIES_API_URL: &str = "https://pokeapi.co/api/v2";
/// Cached responses younger than this are served without a network call
pub const DEFAULT_FRESHNESS_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub card_api_url: String,
    pub species_api_url: String,
    pub freshness: chrono::Duration,
    pub user_agent: String,
    /// Directory holding the persisted wishlist and collection
    pub data_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            card_api_url: DEFAULT_CARD_API_URL.to_string(),
            species_api_url: DEFAULT_SPECIES_API_URL.to_string(),
            freshness: chrono::Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
            user_agent: "TCG-Tracker/1.0".to_string(),
            data_dir: default_data_dir(),
        }
    }
}

impl TrackerConfig {
    /// Check the values before building clients from them
    pub fn validate(&self) -> Result<()> {
        if self.card_api_url.trim().is_empty() {
            return Err(TrackerError::Config("card API URL is empty".to_string()));
        }
        if self.species_api_url.trim().is_empty() {
            return Err(TrackerError::Config("species API URL is empty".to_string()));
        }
        if self.freshness <= chrono::Duration::zero() {
            return Err(TrackerError::Config(format!(
                "freshness window must be positive, got {}s",
                self.freshness.num_seconds()
            )));
        }
        Ok(())
    }
}

/// Returns the default data directory: ~/.local/share/tcg_tracker
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tcg_tracker")
}
