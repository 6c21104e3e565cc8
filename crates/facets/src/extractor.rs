//! Facet option extraction.
//!
//! Option sets are fresh snapshots of what a product collection actually
//! carries; nothing here is a fixed enumeration except ladder ordering.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use safegear_catalog::Product;

use crate::schema::{FacetDefinition, FacetKind};
use crate::value::{FacetValue, attribute_values};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: FacetValue,
    /// Products in the source collection carrying this value.
    pub count: usize,
}

/// How many products carry `true` / `false` for a boolean facet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlagPresence {
    pub yes: usize,
    pub no: usize,
}

impl FlagPresence {
    /// Fewer than two distinct values present: a toggle would have no effect.
    pub fn is_degenerate(&self) -> bool {
        self.yes == 0 || self.no == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetOptions {
    Flag(FlagPresence),
    Values(Vec<FacetOption>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOptionSet {
    key: &'static str,
    kind: FacetKind,
    options: FacetOptions,
    hidden: bool,
}

impl FacetOptionSet {
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn kind(&self) -> FacetKind {
        self.kind
    }

    pub fn options(&self) -> &FacetOptions {
        &self.options
    }

    /// Option values in display order (empty for boolean facets).
    pub fn values(&self) -> Vec<&FacetValue> {
        match &self.options {
            FacetOptions::Values(options) => options.iter().map(|o| &o.value).collect(),
            FacetOptions::Flag(_) => Vec::new(),
        }
    }

    pub fn count_of(&self, value: &FacetValue) -> usize {
        match &self.options {
            FacetOptions::Values(options) => options
                .iter()
                .find(|o| &o.value == value)
                .map(|o| o.count)
                .unwrap_or(0),
            FacetOptions::Flag(_) => 0,
        }
    }

    pub fn flag_presence(&self) -> Option<FlagPresence> {
        match self.options {
            FacetOptions::Flag(presence) => Some(presence),
            FacetOptions::Values(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.options {
            FacetOptions::Values(options) => options.is_empty(),
            FacetOptions::Flag(p) => p.yes == 0 && p.no == 0,
        }
    }

    /// Whether renderers should leave this facet out.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn empty(facet: &FacetDefinition) -> Self {
        let options = match facet.kind {
            FacetKind::Boolean => FacetOptions::Flag(FlagPresence::default()),
            _ => FacetOptions::Values(Vec::new()),
        };
        Self {
            key: facet.key,
            kind: facet.kind,
            options,
            hidden: false,
        }
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Make sure every selected value is listed, with a zero count when no
    /// product in the source carries it.
    pub(crate) fn include_selected(&mut self, facet: &FacetDefinition, selected: &BTreeSet<FacetValue>) {
        let FacetOptions::Values(options) = &mut self.options else {
            return;
        };

        let mut added = false;
        for value in selected {
            if !options.iter().any(|o| &o.value == value) {
                options.push(FacetOption {
                    value: value.clone(),
                    count: 0,
                });
                added = true;
            }
        }
        if added {
            sort_options(facet, options);
        }
    }
}

/// Compute the option set of one facet over a product collection.
///
/// Deterministic: equal inputs give equal output, including order.
/// - boolean: yes/no presence counts
/// - enum / multiEnum: first-seen order, or ladder order when the facet has one
/// - numericEnum: ascending
///
/// Products without the attribute contribute nothing, except to the facet's
/// "not specified" sentinel when it declares one (listed last).
pub fn extract_options<'a, I>(products: I, facet: &FacetDefinition) -> FacetOptionSet
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut set = FacetOptionSet::empty(facet);

    if facet.kind == FacetKind::Boolean {
        let mut presence = FlagPresence::default();
        for flag in products
            .into_iter()
            .filter_map(|p| p.attribute(facet.key).and_then(|a| a.as_flag()))
        {
            if flag {
                presence.yes += 1;
            } else {
                presence.no += 1;
            }
        }
        set.options = FacetOptions::Flag(presence);
        return set;
    }

    let mut options: Vec<FacetOption> = Vec::new();
    let mut index: HashMap<FacetValue, usize> = HashMap::new();
    let mut missing = 0usize;

    for product in products {
        let Some(attr) = product.attribute(facet.key) else {
            missing += 1;
            continue;
        };
        for value in attribute_values(facet, attr).unwrap_or_default() {
            match index.get(&value) {
                Some(&i) => options[i].count += 1,
                None => {
                    index.insert(value.clone(), options.len());
                    options.push(FacetOption { value, count: 1 });
                }
            }
        }
    }

    if let Some(ladder) = facet.display_order {
        options.retain(|o| o.value.as_text().is_some_and(|t| ladder.contains(&t)));
    }
    sort_options(facet, &mut options);

    match facet.unspecified {
        Some(label) if missing > 0 => options.push(FacetOption {
            value: FacetValue::text(label),
            count: missing,
        }),
        _ => {}
    }

    set.options = FacetOptions::Values(options);
    set
}

/// Stable ordering rule shared by extraction and selected-value insertion.
/// First-seen facets keep insertion order; the sentinel always sorts last.
fn sort_options(facet: &FacetDefinition, options: &mut [FacetOption]) {
    let sentinel_last = |o: &FacetOption| o.value.as_text().is_some_and(|t| facet.is_sentinel(t));

    if facet.kind == FacetKind::NumericEnum {
        options.sort_by(|a, b| a.value.cmp(&b.value));
    } else if facet.display_order.is_some() {
        options.sort_by_key(|o| {
            (
                sentinel_last(o),
                o.value.as_text().and_then(|t| facet.ladder_rank(t)).unwrap_or(usize::MAX),
            )
        });
    } else {
        options.sort_by_key(|o| sentinel_last(o));
    }
}
