//! Session-wide dataset cache
//!
//! The [`DataStore`] is created once per session and handed to whoever needs
//! it behind an `Arc`. Each collection is loaded on first demand and then
//! served from memory for the rest of the session.
//!
//! Loads are coalesced: callers that arrive while a load is in flight wait on
//! that load instead of starting another one, so the source runs at most once
//! per collection and every caller sees the same `Arc<Dataset>`. A failed load
//! caches nothing; the next caller starts a fresh attempt.

use crate::error::{Error, Result};
use crate::record::{Dataset, DatasetKind};
use crate::source::DatasetSource;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;

pub struct DataStore {
    source: Arc<dyn DatasetSource>,
    pixels: OnceCell<Arc<Dataset>>,
    durations: OnceCell<Arc<Dataset>>,
    locations: OnceCell<Arc<Dataset>>,
}

impl DataStore {
    pub fn new<S: DatasetSource + 'static>(source: S) -> Self {
        Self::with_source(Arc::new(source))
    }

    pub fn with_source(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            pixels: OnceCell::new(),
            durations: OnceCell::new(),
            locations: OnceCell::new(),
        }
    }

    fn cell(&self, kind: DatasetKind) -> &OnceCell<Arc<Dataset>> {
        match kind {
            DatasetKind::Pixels => &self.pixels,
            DatasetKind::Durations => &self.durations,
            DatasetKind::Locations => &self.locations,
        }
    }

    /// Return the cached collection, loading it first if this is the first
    /// request.
    pub async fn load(&self, kind: DatasetKind) -> Result<Arc<Dataset>> {
        let dataset = self
            .cell(kind)
            .get_or_try_init(|| async move {
                let started_at = Instant::now();
                tracing::debug!(dataset = %kind, "Loading dataset");

                match self.source.load(kind).await {
                    Ok(dataset) => {
                        tracing::info!(
                            dataset = %kind,
                            rows = dataset.len(),
                            elapsed_ms = started_at.elapsed().as_millis(),
                            "Dataset loaded"
                        );
                        Ok::<_, Error>(Arc::new(dataset))
                    }
                    Err(error) => {
                        tracing::warn!(dataset = %kind, error = %error, "Dataset load failed");
                        Err(error)
                    }
                }
            })
            .await?;

        Ok(Arc::clone(dataset))
    }

    pub async fn load_pixels(&self) -> Result<Arc<Dataset>> {
        self.load(DatasetKind::Pixels).await
    }

    pub async fn load_durations(&self) -> Result<Arc<Dataset>> {
        self.load(DatasetKind::Durations).await
    }

    pub async fn load_locations(&self) -> Result<Arc<Dataset>> {
        self.load(DatasetKind::Locations).await
    }

    /// The cached collection, without triggering a load.
    pub fn cached(&self, kind: DatasetKind) -> Option<Arc<Dataset>> {
        self.cell(kind).get().cloned()
    }

    pub fn is_loaded(&self, kind: DatasetKind) -> bool {
        self.cell(kind).initialized()
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("pixels", &self.is_loaded(DatasetKind::Pixels))
            .field("durations", &self.is_loaded(DatasetKind::Durations))
            .field("locations", &self.is_loaded(DatasetKind::Locations))
            .finish()
    }
}
