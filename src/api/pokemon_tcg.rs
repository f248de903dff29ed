//! Pokémon TCG API reads: card search, single card, set listing

use super::models::{CardRecord, CardResponse, SearchResponse, SetsResponse};
use super::CatalogClient;
use crate::cache::FetchOptions;
use crate::error::Result;

pub const SEARCH_PAGE_SIZE: u32 = 20;
pub const CARDS_BY_POKEMON_PAGE_SIZE: u32 = 50;
pub const SETS_PAGE_SIZE: u32 = 250;

/// Build the `q` search expression for a free-text query and optional set
pub(crate) fn search_query(query: &str, set_id: Option<&str>) -> String {
    let mut q = if query.is_empty() {
        "supertype:Pokémon".to_string()
    } else {
        format!("name:\"*{}*\"", query)
    };
    if let Some(set_id) = set_id.filter(|s| !s.is_empty()) {
        q.push_str(&format!(" set.id:{}", set_id));
    }
    q
}

/// Build the `q` expression for an exact species name and optional set
pub(crate) fn species_query(pokemon_name: &str, set_id: Option<&str>) -> String {
    let mut q = format!("name:\"{}\"", pokemon_name);
    if let Some(set_id) = set_id.filter(|s| !s.is_empty()) {
        q.push_str(&format!(" set.id:{}", set_id));
    }
    q
}

impl CatalogClient {
    fn cards_url(&self, q: &str, page: u32, page_size: u32) -> String {
        format!(
            "{}/cards?q={}&page={}&pageSize={}&orderBy=-set.releaseDate",
            self.card_api_url,
            urlencoding::encode(q),
            page,
            page_size
        )
    }

    /// Search cards by name substring, newest sets first.
    /// An empty query lists all Pokémon cards.
    pub async fn search_cards(
        &self,
        query: &str,
        page: u32,
        set_id: Option<&str>,
    ) -> Result<SearchResponse> {
        let url = self.cards_url(&search_query(query, set_id), page, SEARCH_PAGE_SIZE);
        log::debug!("Searching cards: {}", url);
        self.cache.fetch_json(&url, &FetchOptions::default()).await
    }

    /// All printings of one species, newest sets first
    pub async fn cards_by_pokemon(
        &self,
        pokemon_name: &str,
        page: u32,
        set_id: Option<&str>,
    ) -> Result<SearchResponse> {
        let url = self.cards_url(
            &species_query(pokemon_name, set_id),
            page,
            CARDS_BY_POKEMON_PAGE_SIZE,
        );
        self.cache.fetch_json(&url, &FetchOptions::default()).await
    }

    /// Look up a single card by id
    pub async fn get_card(&self, id: &str) -> Result<CardRecord> {
        let url = format!("{}/cards/{}", self.card_api_url, urlencoding::encode(id));
        let response: CardResponse = self.cache.fetch_json(&url, &FetchOptions::default()).await?;
        Ok(response.data)
    }

    /// Set listing, newest releases first
    pub async fn get_sets(&self, page: u32) -> Result<SetsResponse> {
        let url = format!(
            "{}/sets?page={}&pageSize={}&orderBy=-releaseDate",
            self.card_api_url, page, SETS_PAGE_SIZE
        );
        self.cache.fetch_json(&url, &FetchOptions::default()).await
    }
}

#[cfg(test)]
#[path = "pokemon_tcg_tests.rs"]
mod tests;
