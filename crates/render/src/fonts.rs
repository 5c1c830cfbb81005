//! Asynchronous font catalog loading.
//!
//! The frame pass itself is synchronous; font catalogs are the one
//! resource resolved asynchronously. Labels whose catalog is still
//! loading are held pending by the placer rather than failing.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{FontError, GlyphMeasure};

/// A loaded font catalog: the glyph metrics used to size and draw labels
/// referencing it.
pub struct FontCatalog {
    name: String,
    metrics: Box<dyn GlyphMeasure>,
}

impl FontCatalog {
    /// Wrap a metrics source as a named catalog.
    pub fn new(name: impl Into<String>, metrics: Box<dyn GlyphMeasure>) -> Self {
        Self {
            name: name.into(),
            metrics,
        }
    }

    /// Catalog name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Glyph metrics for this catalog.
    pub fn metrics(&self) -> &dyn GlyphMeasure {
        self.metrics.as_ref()
    }
}

/// Asynchronous provider of font catalogs.
#[async_trait]
pub trait GlyphSource: Send + Sync {
    /// Load the catalog `name`. Called at most once per distinct name;
    /// repeated engine requests reuse the pending load.
    async fn load_catalog(&self, name: &str) -> Result<FontCatalog, FontError>;
}

/// Tracks catalog loading and exposes the loading/ready signals consumed
/// by callers of the placement engine.
pub struct FontLibrary {
    catalogs: HashMap<String, FontCatalog>,
    pending: BTreeSet<String>,
    failed: BTreeSet<String>,
    ready_tx: watch::Sender<bool>,
    initialized_tx: watch::Sender<bool>,
    // Held so the channels always have a receiver: `watch::Sender::send`
    // only stores the value while at least one receiver is alive.
    _ready_rx: watch::Receiver<bool>,
    _initialized_rx: watch::Receiver<bool>,
}

impl FontLibrary {
    /// Create an empty library. With nothing requested it reports ready.
    pub fn new() -> Self {
        let (ready_tx, _ready_rx) = watch::channel(true);
        let (initialized_tx, _initialized_rx) = watch::channel(false);
        Self {
            catalogs: HashMap::new(),
            pending: BTreeSet::new(),
            failed: BTreeSet::new(),
            ready_tx,
            initialized_tx,
            _ready_rx,
            _initialized_rx,
        }
    }

    /// Request a catalog. Returns true when this is a new request; a
    /// catalog already loaded, pending or failed is not requested again.
    pub fn request(&mut self, name: &str) -> bool {
        if self.catalogs.contains_key(name)
            || self.pending.contains(name)
            || self.failed.contains(name)
        {
            return false;
        }
        debug!(catalog = name, "font catalog requested");
        self.pending.insert(name.to_string());
        let _ = self.ready_tx.send(false);
        true
    }

    /// Whether the catalog is loaded and usable.
    pub fn is_ready(&self, name: &str) -> bool {
        self.catalogs.contains_key(name)
    }

    /// Whether the catalog failed to load; labels referencing it stay
    /// pending permanently.
    pub fn has_failed(&self, name: &str) -> bool {
        self.failed.contains(name)
    }

    /// Whether any catalog load is outstanding.
    pub fn loading(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Metrics of a loaded catalog.
    pub fn metrics(&self, name: &str) -> Option<&dyn GlyphMeasure> {
        self.catalogs.get(name).map(|c| c.metrics())
    }

    /// Drive every pending load to completion against `source`.
    ///
    /// Load failures are logged and recorded; they do not propagate, the
    /// affected labels simply never leave their pending state.
    pub async fn load_pending(&mut self, source: &dyn GlyphSource) {
        let names: Vec<String> = self.pending.iter().cloned().collect();
        for name in names {
            match source.load_catalog(&name).await {
                Ok(catalog) => {
                    debug!(catalog = name.as_str(), "font catalog loaded");
                    self.catalogs.insert(name.clone(), catalog);
                }
                Err(err) => {
                    warn!(catalog = name.as_str(), %err, "font catalog failed to load");
                    self.failed.insert(name.clone());
                }
            }
            self.pending.remove(&name);
        }
        if self.pending.is_empty() {
            let _ = self.ready_tx.send(true);
        }
        let _ = self.initialized_tx.send(true);
    }

    /// Resolve once every requested catalog has loaded or failed.
    pub async fn wait_loaded(&self) {
        Self::wait_flag(self.ready_tx.subscribe()).await;
    }

    /// Resolve once the first load pass has completed.
    pub async fn wait_initialized(&self) {
        Self::wait_flag(self.initialized_tx.subscribe()).await;
    }

    async fn wait_flag(mut rx: watch::Receiver<bool>) {
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}
