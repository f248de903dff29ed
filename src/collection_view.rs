//! Filtering and grouping over collection snapshots for display

use crate::api::models::{CardRecord, PokedexEntry};
use std::collections::HashSet;

/// Set summary shown in the set filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOption {
    pub id: String,
    pub name: String,
    pub series: String,
}

/// Cards whose name contains `name_query` (case-insensitive) and whose set
/// id equals `set_id`. Empty filters match everything.
pub fn filter_cards<'a>(
    cards: &'a [CardRecord],
    name_query: &str,
    set_id: &str,
) -> Vec<&'a CardRecord> {
    let needle = name_query.to_lowercase();
    cards
        .iter()
        .filter(|card| needle.is_empty() || card.name.to_lowercase().contains(&needle))
        .filter(|card| set_id.is_empty() || card.set.id == set_id)
        .collect()
}

/// Distinct sets across several collections, sorted by name ignoring case.
/// The first card seen for a set id supplies its name and series.
pub fn available_sets(collections: &[&[CardRecord]]) -> Vec<SetOption> {
    let mut seen = HashSet::new();
    let mut sets: Vec<SetOption> = collections
        .iter()
        .flat_map(|cards| cards.iter())
        .filter(|card| seen.insert(card.set.id.clone()))
        .map(|card| SetOption {
            id: card.set.id.clone(),
            name: card.set.name.clone(),
            series: card.set.series.clone(),
        })
        .collect();
    sets.sort_by_key(|s| s.name.to_lowercase());
    sets
}

/// Species whose name contains `query` (case-insensitive) or whose dex
/// number contains it as digits. An empty query matches everything.
pub fn filter_pokedex<'a>(entries: &'a [PokedexEntry], query: &str) -> Vec<&'a PokedexEntry> {
    let needle = query.to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.name.to_lowercase().contains(&needle)
                || entry.id.to_string().contains(query)
        })
        .collect()
}
