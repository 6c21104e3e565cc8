//! One mounted category view: a catalog snapshot, the filter store and a
//! projector bound together.

use safegear_catalog::{CatalogSnapshot, Category};
use safegear_core::AggregateRoot;

use crate::config::EngineConfig;
use crate::error::FilterResult;
use crate::projector::{Projection, Projector};
use crate::query::{decode_selection, encode_selection};
use crate::store::{FilterEvent, FilterStore, Surface, SurfaceHandle};

/// Filtering session over exactly one snapshot.
///
/// The snapshot is never mutated. A refetched catalog goes through
/// [`FilterSession::reload`], which starts a new session with the same
/// category and an empty selection.
#[derive(Debug, Clone)]
pub struct FilterSession {
    snapshot: CatalogSnapshot,
    store: FilterStore,
    projector: Projector,
}

impl FilterSession {
    pub fn new(snapshot: CatalogSnapshot, category: Category, config: EngineConfig) -> Self {
        let store = FilterStore::new(category);
        tracing::info!(
            session = %store.id(),
            snapshot = %snapshot.id(),
            %category,
            products = snapshot.len(),
            "filter session started"
        );
        Self {
            snapshot,
            store,
            projector: Projector::new(config),
        }
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &FilterStore {
        &self.store
    }

    pub fn category(&self) -> Category {
        self.store.category()
    }

    pub fn desktop(&mut self) -> SurfaceHandle<'_> {
        self.store.desktop()
    }

    pub fn mobile(&mut self) -> SurfaceHandle<'_> {
        self.store.mobile()
    }

    /// Project the current selection over the bound snapshot.
    pub fn project(&self) -> Projection<'_> {
        self.projector
            .project(
                self.snapshot.products(),
                self.store.category(),
                self.store.selection(),
            )
            .with_snapshot(self.snapshot.id())
    }

    /// Rebind to a new snapshot. The category survives; the selection does not.
    pub fn reload(self, snapshot: CatalogSnapshot) -> Self {
        tracing::info!(
            session = %self.store.id(),
            previous = %self.snapshot.id(),
            snapshot = %snapshot.id(),
            "catalog reloaded"
        );
        Self::new(snapshot, self.store.category(), *self.projector.config())
    }

    /// Replace the selection with one decoded from a URL query string.
    ///
    /// Nothing changes if the query does not decode or validate.
    pub fn restore_from_query(&mut self, query: &str) -> FilterResult<Vec<FilterEvent>> {
        let selection = decode_selection(query, &self.store.schema())?;
        self.store.surface(Surface::Url).replace_all(selection)
    }

    /// Current selection encoded for the URL.
    pub fn query_string(&self) -> String {
        encode_selection(self.store.selection(), &self.store.schema())
    }
}
