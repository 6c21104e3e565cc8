//! Result projection.
//!
//! Two passes over the category's products:
//! 1. evaluate every active facet once per product, remembering which single
//!    facet (if any) it failed; products failing two or more are out of every
//!    view;
//! 2. per facet, extract options from the products that pass every *other*
//!    active facet (leave-one-out), so a facet's own choice never shrinks its
//!    own option list.
//!
//! Cost is linear in products times facets.

use std::collections::BTreeMap;

use safegear_catalog::{Category, Product};
use safegear_core::{ProductId, SnapshotId};

use crate::config::EngineConfig;
use crate::error::FilterError;
use crate::extractor::{FacetOptionSet, extract_options};
use crate::predicate::{facet_matches, validate_choice, validate_product};
use crate::schema::{FacetKind, FacetSchema, schema_for};
use crate::selection::FacetSelection;

/// A product skipped because its record does not fit the category schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedProduct {
    pub product_id: ProductId,
    pub error: FilterError,
}

/// Output of one projection pass. Borrows products from the snapshot it was
/// computed over.
#[derive(Debug, Clone)]
pub struct Projection<'a> {
    category: Category,
    snapshot_id: Option<SnapshotId>,
    visible: Vec<&'a Product>,
    options: Vec<FacetOptionSet>,
    rejected: Vec<RejectedProduct>,
    ignored_choices: Vec<FilterError>,
    selection_counts: BTreeMap<String, usize>,
    candidates: usize,
}

impl<'a> Projection<'a> {
    pub fn category(&self) -> Category {
        self.category
    }

    /// Snapshot the projection was computed from, when run through a session.
    pub fn snapshot_id(&self) -> Option<SnapshotId> {
        self.snapshot_id
    }

    pub fn visible(&self) -> &[&'a Product] {
        &self.visible
    }

    pub fn visible_ids(&self) -> Vec<&'a ProductId> {
        self.visible.iter().map(|p| p.id_typed()).collect()
    }

    /// Option sets for every facet of the category, in schema order.
    pub fn options(&self) -> &[FacetOptionSet] {
        &self.options
    }

    pub fn option_set(&self, key: &str) -> Option<&FacetOptionSet> {
        self.options.iter().find(|o| o.key() == key)
    }

    /// Option sets renderers should draw.
    pub fn displayed_options(&self) -> impl Iterator<Item = &FacetOptionSet> {
        self.options.iter().filter(|o| !o.is_hidden())
    }

    /// Products of the category whose records did not fit the schema.
    pub fn rejected(&self) -> &[RejectedProduct] {
        &self.rejected
    }

    /// Selection entries that were ignored because they did not fit the
    /// schema.
    pub fn ignored_choices(&self) -> &[FilterError] {
        &self.ignored_choices
    }

    pub fn selection_counts(&self) -> &BTreeMap<String, usize> {
        &self.selection_counts
    }

    pub fn active_count(&self) -> usize {
        self.selection_counts.values().sum()
    }

    /// Products of the category considered, rejected ones included.
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    /// No product of the category was offered at all.
    ///
    /// Rejected records count as candidates, so a category whose products
    /// were all rejected is not an empty catalog: `visible` is empty, but
    /// option sets still list the selected values (with zero counts) and
    /// [`Projection::rejected`] explains why.
    pub fn is_empty_catalog(&self) -> bool {
        self.candidates == 0
    }

    pub(crate) fn with_snapshot(mut self, id: SnapshotId) -> Self {
        self.snapshot_id = Some(id);
        self
    }
}

/// Runs projections with a fixed configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector {
    config: EngineConfig,
}

impl Projector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn project<'a, I>(&self, products: I, category: Category, selection: &FacetSelection) -> Projection<'a>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        let schema = schema_for(category);
        let (selection, ignored_choices) = effective_selection(selection, &schema);

        let active: Vec<_> = schema
            .facets()
            .iter()
            .enumerate()
            .filter_map(|(i, facet)| selection.get(facet.key).map(|choice| (i, facet, choice)))
            .collect();

        // (product, index of the one active facet it fails, if any)
        let mut reachable: Vec<(&'a Product, Option<usize>)> = Vec::new();
        let mut rejected = Vec::new();
        let mut candidates = 0usize;

        'products: for product in products {
            if product.category() != category {
                continue;
            }
            candidates += 1;

            if let Err(error) = validate_product(product, &schema) {
                tracing::warn!(product = %product.id_typed(), %category, error = %error, "skipping product");
                rejected.push(RejectedProduct {
                    product_id: product.id_typed().clone(),
                    error,
                });
                continue;
            }

            let mut missed = None;
            for (i, facet, choice) in &active {
                if !facet_matches(product, facet, choice) {
                    if missed.is_some() {
                        continue 'products;
                    }
                    missed = Some(*i);
                }
            }
            reachable.push((product, missed));
        }

        if candidates > self.config.frame_budget_products {
            tracing::warn!(
                %category,
                candidates,
                budget = self.config.frame_budget_products,
                "catalog exceeds frame budget for projection"
            );
        }

        let visible: Vec<&'a Product> = reachable
            .iter()
            .filter(|(_, missed)| missed.is_none())
            .map(|(product, _)| *product)
            .collect();

        let options = schema
            .facets()
            .iter()
            .enumerate()
            .map(|(i, facet)| {
                let pool = reachable
                    .iter()
                    .filter(|(_, missed)| missed.is_none() || *missed == Some(i))
                    .map(|(product, _)| *product);
                let mut set = extract_options(pool, facet);

                // An empty catalog yields empty option sets, selection or not.
                if let Some(selected) = selection.values(facet.key).filter(|_| candidates > 0) {
                    set.include_selected(facet, selected);
                }

                let hidden = self.config.hide_single_value_flags
                    && facet.kind == FacetKind::Boolean
                    && selection.get(facet.key).is_none()
                    && set.flag_presence().is_some_and(|p| p.is_degenerate());
                set.set_hidden(hidden);
                set
            })
            .collect();

        tracing::debug!(
            %category,
            candidates,
            visible = visible.len(),
            rejected = rejected.len(),
            active_facets = active.len(),
            "projection computed"
        );

        Projection {
            category,
            snapshot_id: None,
            visible,
            options,
            rejected,
            ignored_choices,
            selection_counts: selection.selection_counts(),
            candidates,
        }
    }
}

/// Project with the default configuration.
pub fn project<'a, I>(products: I, category: Category, selection: &FacetSelection) -> Projection<'a>
where
    I: IntoIterator<Item = &'a Product>,
{
    Projector::default().project(products, category, selection)
}

/// Drop choices that do not fit the schema, reporting each one.
fn effective_selection(selection: &FacetSelection, schema: &FacetSchema) -> (FacetSelection, Vec<FilterError>) {
    let mut effective = selection.clone();
    let mut ignored = Vec::new();

    for (key, choice) in selection.iter() {
        if let Err(error) = validate_choice(key, choice, schema) {
            tracing::warn!(category = %schema.category(), facet = key, error = %error, "ignoring selection entry");
            effective.clear(key);
            ignored.push(error);
        }
    }

    (effective, ignored)
}
