use serde::{Deserialize, Serialize};

/// Snapshot of one card as returned by the Pokémon TCG API.
///
/// Stored by value in the wishlist and collection; later catalog changes do
/// not reach stored copies. Field names follow the upstream JSON so a stored
/// record round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: String,
    pub name: String,
    /// Category, e.g. "Pokémon", "Trainer", "Energy"
    pub supertype: String,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<String>>,
    pub images: CardImages,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    pub set: SetDescriptor,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_pokedex_numbers: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardImages {
    pub small: String,
    pub large: String,
}

/// The set a card belongs to, as embedded in a card record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDescriptor {
    pub id: String,
    pub name: String,
    pub series: String,
    pub printed_total: u32,
    pub total: u32,
    pub legalities: Legalities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptcgo_code: Option<String>,
    pub release_date: String,
    pub updated_at: String,
    pub images: SetImages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legalities {
    pub unlimited: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expanded: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetImages {
    pub symbol: String,
    pub logo: String,
}

/// Entry of the set listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInfo {
    pub id: String,
    pub name: String,
    pub series: String,
    pub printed_total: u32,
    pub total: u32,
    pub release_date: String,
    pub images: SetImages,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub count: u32,
    pub total_count: u32,
}

impl<T> Page<T> {
    /// Whether more results exist after this page
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.total_count
    }
}

pub type SearchResponse = Page<CardRecord>;
pub type SetsResponse = Page<SetInfo>;

/// Single-card lookup body
#[derive(Debug, Clone, Deserialize)]
pub struct CardResponse {
    pub data: CardRecord,
}

/// Species reference entry derived from the PokéAPI listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PokedexEntry {
    pub id: u32,
    pub name: String,
    pub sprite: String,
}
