//! Persisted wishlist and owned-collection sets with change notification.
//!
//! Both collections are instances of the same [`CollectionStore`]; a
//! [`CollectionKind`] supplies the storage key and user-facing wording.

pub mod collection;
pub mod observers;
pub mod storage;

use std::fmt;

pub use collection::{CollectionStore, Snapshot, Subscription};
pub use observers::{Listener, ListenerId, ObserverList};
pub use storage::{JsonFileStorage, MemoryStorage, Storage};

/// The two persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Cards the user is chasing
    Wishlist,
    /// Cards the user owns
    Owned,
}

impl CollectionKind {
    pub fn storage_key(&self) -> &'static str {
        match self {
            CollectionKind::Wishlist => "pokemon-tcg-wishlist",
            CollectionKind::Owned => "pokemon-tcg-collection",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CollectionKind::Wishlist => "Chase List",
            CollectionKind::Owned => "Collection",
        }
    }

    fn already_present_message(&self) -> &'static str {
        match self {
            CollectionKind::Wishlist => "Card already in wishlist",
            CollectionKind::Owned => "Card already in collection",
        }
    }

    fn added_message(&self) -> &'static str {
        match self {
            CollectionKind::Wishlist => "Added to Chase List",
            CollectionKind::Owned => "Added to Collection",
        }
    }

    fn removed_message(&self) -> &'static str {
        match self {
            CollectionKind::Wishlist => "Removed from Chase List",
            CollectionKind::Owned => "Removed from Collection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
}

/// User-facing outcome of a store operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: &str) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.to_string(),
        }
    }

    pub fn success(message: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// When subscribers hear about a `remove`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyPolicy {
    /// Every `remove` notifies, even when the id was absent. A duplicate
    /// `add` never notifies.
    #[default]
    Always,
    /// Only calls that changed the set notify
    OnChange,
}
