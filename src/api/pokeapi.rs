//! PokéAPI species listing

use serde::Deserialize;

use super::models::PokedexEntry;
use super::CatalogClient;
use crate::cache::FetchOptions;
use crate::error::Result;

/// Number of species requested when the caller has no preference
pub const DEFAULT_POKEDEX_LIMIT: u32 = 1025;

pub const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

#[derive(Debug, Deserialize)]
struct SpeciesListing {
    results: Vec<SpeciesRef>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct SpeciesRef {
    name: String,
    url: String,
}

/// "bulbasaur" -> "Bulbasaur"
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl CatalogClient {
    /// National dex listing, numbered by position starting at 1
    pub async fn get_pokedex(&self, limit: u32) -> Result<Vec<PokedexEntry>> {
        let url = format!(
            "{}/pokemon?limit={}&offset=0",
            self.species_api_url, limit
        );
        let listing: SpeciesListing = self.cache.fetch_json(&url, &FetchOptions::default()).await?;

        let entries: Vec<PokedexEntry> = listing
            .results
            .into_iter()
            .enumerate()
            .map(|(index, species)| {
                let id = index as u32 + 1;
                PokedexEntry {
                    id,
                    name: capitalize(&species.name),
                    sprite: format!("{}/{}.png", SPRITE_BASE_URL, id),
                }
            })
            .collect();

        log::debug!("Loaded {} pokedex entries", entries.len());
        Ok(entries)
    }
}
