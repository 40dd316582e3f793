//! Keyed cache of backend query results.

use accsm_core::{Cars, FolderStructure, SetupFile, SetupId, Tracks};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// One key per query kind. Build keys through the constructors so invalidation
/// sites and read sites can't drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    FolderStructure,
    Setup(SetupId),
    Cars,
    Tracks,
    SetupsPath,
}

impl QueryKey {
    pub fn folder_structure() -> Self {
        Self::FolderStructure
    }

    pub fn setup(id: &SetupId) -> Self {
        Self::Setup(id.clone())
    }

    pub fn cars() -> Self {
        Self::Cars
    }

    pub fn tracks() -> Self {
        Self::Tracks
    }

    pub fn setups_path() -> Self {
        Self::SetupsPath
    }

    pub fn freshness(&self) -> Freshness {
        match self {
            QueryKey::FolderStructure => {
                Freshness::For(accsm_config::folder_structure_stale_time())
            }
            // Reference data and per-setup content only change through mutations,
            // which invalidate or overwrite them explicitly.
            QueryKey::Cars | QueryKey::Tracks | QueryKey::Setup(_) | QueryKey::SetupsPath => {
                Freshness::Forever
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Forever,
    For(Duration),
}

#[derive(Debug, Clone)]
pub enum CachedData {
    FolderStructure(FolderStructure),
    Setup(SetupFile),
    Cars(Cars),
    Tracks(Tracks),
    SetupsPath(String),
}

/// Conversion between a query's payload and its cache slot.
pub trait Cached: Sized {
    fn from_cached(data: &CachedData) -> Option<Self>;
    fn into_cached(self) -> CachedData;
}

macro_rules! impl_cached {
    ($ty:ty, $variant:ident) => {
        impl Cached for $ty {
            fn from_cached(data: &CachedData) -> Option<Self> {
                match data {
                    CachedData::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_cached(self) -> CachedData {
                CachedData::$variant(self)
            }
        }
    };
}

impl_cached!(FolderStructure, FolderStructure);
impl_cached!(SetupFile, Setup);
impl_cached!(Cars, Cars);
impl_cached!(Tracks, Tracks);
impl_cached!(String, SetupsPath);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Fresh,
    Stale,
    Missing,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: CachedData,
    updated_at: Instant,
    invalidated: bool,
}

impl CacheEntry {
    fn is_fresh(&self, freshness: Freshness, now: Instant) -> bool {
        if self.invalidated {
            return false;
        }
        match freshness {
            Freshness::Forever => true,
            Freshness::For(window) => now.saturating_duration_since(self.updated_at) < window,
        }
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &QueryKey) -> EntryState {
        self.state_at(key, Instant::now())
    }

    pub fn state_at(&self, key: &QueryKey, now: Instant) -> EntryState {
        match self.entries.get(key) {
            None => EntryState::Missing,
            Some(e) if e.is_fresh(key.freshness(), now) => EntryState::Fresh,
            Some(_) => EntryState::Stale,
        }
    }

    /// Data for `key` only if it is still fresh.
    pub fn fresh<T: Cached>(&self, key: &QueryKey) -> Option<T> {
        self.fresh_at(key, Instant::now())
    }

    pub fn fresh_at<T: Cached>(&self, key: &QueryKey, now: Instant) -> Option<T> {
        let entry = self.entries.get(key)?;
        if !entry.is_fresh(key.freshness(), now) {
            return None;
        }
        T::from_cached(&entry.data)
    }

    /// Data for `key` whether fresh or stale.
    pub fn peek<T: Cached>(&self, key: &QueryKey) -> Option<T> {
        self.entries.get(key).and_then(|e| T::from_cached(&e.data))
    }

    pub fn set<T: Cached>(&mut self, key: QueryKey, data: T) {
        self.set_at(key, data, Instant::now());
    }

    pub fn set_at<T: Cached>(&mut self, key: QueryKey, data: T, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                data: data.into_cached(),
                updated_at: now,
                invalidated: false,
            },
        );
    }

    /// Marks an entry stale; its data stays readable until the next fetch replaces it.
    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidated = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
