use std::collections::BTreeMap;

use cartotext_core::TileKey;
use tracing::debug;

use crate::Tile;

/// The set of currently visible/rendered tiles for a frame.
///
/// Backed by a BTreeMap so iteration order is deterministic.
#[derive(Default)]
pub struct TileSet {
    tiles: BTreeMap<TileKey, Tile>,
}

impl TileSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            tiles: BTreeMap::new(),
        }
    }

    /// Insert or replace a tile.
    pub fn insert(&mut self, tile: Tile) {
        debug!(key = %tile.key(), "tile entered visible set");
        self.tiles.insert(tile.key(), tile);
    }

    /// Remove a tile, invalidating its elements for future frames.
    pub fn remove(&mut self, key: &TileKey) -> Option<Tile> {
        let removed = self.tiles.remove(key);
        if removed.is_some() {
            debug!(%key, "tile left visible set");
        }
        removed
    }

    /// Fetch a tile.
    pub fn get(&self, key: &TileKey) -> Option<&Tile> {
        self.tiles.get(key)
    }

    /// Fetch a tile mutably.
    pub fn get_mut(&mut self, key: &TileKey) -> Option<&mut Tile> {
        self.tiles.get_mut(key)
    }

    /// Whether `key` is currently visible.
    pub fn contains(&self, key: &TileKey) -> bool {
        self.tiles.contains_key(key)
    }

    /// Iterate tiles in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&TileKey, &Tile)> {
        self.tiles.iter()
    }

    /// Iterate tiles mutably in key order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&TileKey, &mut Tile)> {
        self.tiles.iter_mut()
    }

    /// Keys of all visible tiles.
    pub fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.tiles.keys()
    }

    /// Number of visible tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tiles are visible.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
