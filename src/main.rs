//! TCG Tracker - Pokémon card catalog browser and collection tracker
//!
//! Browses the card catalog and keeps a wishlist ("Chase List") and an owned
//! collection on disk.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tcg_tracker::api::DEFAULT_POKEDEX_LIMIT;
use tcg_tracker::config::{default_data_dir, DEFAULT_CARD_API_URL, DEFAULT_SPECIES_API_URL};
use tcg_tracker::{
    available_sets, filter_cards, filter_pokedex, CardRecord, CollectionKind, Tracker,
    TrackerConfig,
};

/// Pokémon TCG catalog browser with a persistent wishlist and collection
#[derive(Parser, Debug)]
#[command(name = "tcg_tracker")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the wishlist and collection files
    #[arg(long, default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Base URL of the card catalog API
    #[arg(long, default_value = DEFAULT_CARD_API_URL)]
    card_api_url: String,

    /// Base URL of the species reference API
    #[arg(long, default_value = DEFAULT_SPECIES_API_URL)]
    species_api_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search cards by name
    Search {
        /// Name fragment; empty lists all Pokémon cards
        #[arg(default_value = "")]
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Restrict to one set id, e.g. sv1
        #[arg(long)]
        set: Option<String>,
    },
    /// List every card of one species
    Pokemon {
        name: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        set: Option<String>,
    },
    /// Show a single card
    Card { id: String },
    /// List sets, newest first
    Sets {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List species from the national dex
    Pokedex {
        #[arg(long, default_value_t = DEFAULT_POKEDEX_LIMIT)]
        limit: u32,
        /// Name fragment or dex number digits
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage the owned collection
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Sets present in the wishlist or collection
    SharedSets,
}

#[derive(Subcommand, Debug)]
enum CollectionAction {
    /// Show stored cards
    List {
        /// Name fragment filter
        #[arg(long, default_value = "")]
        name: String,
        /// Set id filter
        #[arg(long, default_value = "")]
        set: String,
    },
    /// Look up a card and store it
    Add { id: String },
    /// Remove a card by id
    Remove { id: String },
    /// Remove if stored, add otherwise
    Toggle { id: String },
}

fn print_card(card: &CardRecord) {
    println!(
        "{:<14} {:<28} {:<24} {}",
        card.id,
        card.name,
        card.set.name,
        card.rarity.as_deref().unwrap_or("-")
    );
}

async fn run_collection(
    tracker: &Tracker,
    kind: CollectionKind,
    action: CollectionAction,
) -> Result<()> {
    let store = tracker.collection(kind);
    match action {
        CollectionAction::List { name, set } => {
            let snapshot = store.snapshot();
            let cards = filter_cards(&snapshot, &name, &set);
            println!("{}: {} of {} cards", kind.title(), cards.len(), snapshot.len());
            for card in cards {
                print_card(card);
            }
        }
        CollectionAction::Add { id } => {
            let card = tracker
                .catalog()
                .get_card(&id)
                .await
                .with_context(|| format!("Failed to look up card {id}"))?;
            println!("{}", store.add(card)?);
        }
        CollectionAction::Remove { id } => {
            println!("{}", store.remove(&id));
        }
        CollectionAction::Toggle { id } => {
            let notice = if store.contains(&id) {
                store.remove(&id)
            } else {
                let card = tracker
                    .catalog()
                    .get_card(&id)
                    .await
                    .with_context(|| format!("Failed to look up card {id}"))?;
                store.toggle(card)?
            };
            println!("{}", notice);
        }
    }
    Ok(())
}

async fn run(tracker: &Tracker, command: Command) -> Result<()> {
    let catalog = tracker.catalog();
    match command {
        Command::Search { query, page, set } => {
            let response = catalog.search_cards(&query, page, set.as_deref()).await?;
            println!(
                "Page {} ({} of {} cards)",
                response.page, response.count, response.total_count
            );
            for card in &response.data {
                print_card(card);
            }
        }
        Command::Pokemon { name, page, set } => {
            let response = catalog.cards_by_pokemon(&name, page, set.as_deref()).await?;
            for card in &response.data {
                print_card(card);
            }
        }
        Command::Card { id } => {
            let card = catalog.get_card(&id).await?;
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        Command::Sets { page } => {
            let response = catalog.get_sets(page).await?;
            for set in &response.data {
                println!("{:<10} {:<32} {}", set.id, set.name, set.release_date);
            }
        }
        Command::Pokedex { limit, name } => {
            let entries = catalog.get_pokedex(limit).await?;
            for entry in filter_pokedex(&entries, &name) {
                println!("#{:<5} {}", entry.id, entry.name);
            }
        }
        Command::Wishlist { action } => {
            run_collection(tracker, CollectionKind::Wishlist, action).await?
        }
        Command::Collection { action } => {
            run_collection(tracker, CollectionKind::Owned, action).await?
        }
        Command::SharedSets => {
            let wishlist = tracker.wishlist().snapshot();
            let owned = tracker.owned().snapshot();
            for set in available_sets(&[wishlist.as_slice(), owned.as_slice()]) {
                println!("{:<10} {:<32} {}", set.id, set.name, set.series);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=tcg_tracker=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = TrackerConfig {
        card_api_url: args.card_api_url,
        species_api_url: args.species_api_url,
        data_dir: args.data_dir,
        ..TrackerConfig::default()
    };

    let tracker = match tcg_tracker::tracker::init_global(config) {
        Ok(tracker) => tracker,
        Err(e) => {
            log::error!("Startup failed: {e}");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(tracker, args.command).await {
        log::error!("Command failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
