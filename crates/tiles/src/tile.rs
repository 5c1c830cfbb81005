use cartotext_core::{ElementId, TextElement, TileKey};

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    /// Change flags set whenever tile text content changes.
    pub struct TileFlags: u8 {
        const TEXT_CHANGED = 0b0000_0001;
    }
}

impl Default for TileFlags {
    fn default() -> Self {
        TileFlags::empty()
    }
}

/// Map tile owning the text elements decoded from its content.
///
/// The change flags let the collector skip re-collection of tiles whose
/// text set did not change since the previous frame.
pub struct Tile {
    key: TileKey,
    datasource: String,
    elements: Vec<TextElement>,
    flags: TileFlags,
}

impl Tile {
    /// Create an empty tile for the "default" datasource.
    pub fn new(key: TileKey) -> Self {
        Self {
            key,
            datasource: "default".to_string(),
            elements: Vec::new(),
            flags: TileFlags::all(),
        }
    }

    /// Builder: name the datasource this tile was decoded from.
    pub fn with_datasource(mut self, datasource: impl Into<String>) -> Self {
        self.datasource = datasource.into();
        self
    }

    #[inline]
    pub fn key(&self) -> TileKey {
        self.key
    }

    /// Datasource the tile belongs to; part of the style cache key.
    pub fn datasource(&self) -> &str {
        &self.datasource
    }

    /// Add a text element and mark the tile changed.
    pub fn add_element(&mut self, element: TextElement) {
        self.elements.push(element);
        self.flags.insert(TileFlags::TEXT_CHANGED);
    }

    /// Remove an element by id; returns whether it was present.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        let removed = self.elements.len() != before;
        if removed {
            self.flags.insert(TileFlags::TEXT_CHANGED);
        }
        removed
    }

    /// Borrow the element list.
    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    /// Consume and return the current change flags.
    pub fn take_change_flags(&mut self) -> TileFlags {
        let flags = self.flags;
        self.flags = TileFlags::empty();
        flags
    }
}
