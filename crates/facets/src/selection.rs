use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use safegear_core::ValueObject;

use crate::value::{FacetValue, TriState};

/// An active restriction on one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetChoice {
    Flag(bool),
    Values(BTreeSet<FacetValue>),
}

impl FacetChoice {
    /// Number of selected values (a set flag counts as one).
    pub fn len(&self) -> usize {
        match self {
            FacetChoice::Flag(_) => 1,
            FacetChoice::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The visitor's current choices per facet.
///
/// Only active facets are stored: an unset flag or an empty value set is
/// represented by the key being absent, so "empty" can never turn into
/// "match nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetSelection {
    choices: BTreeMap<String, FacetChoice>,
}

impl ValueObject for FacetSelection {}

impl FacetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: restrict a boolean facet.
    pub fn with_flag(mut self, key: impl Into<String>, state: TriState) -> Self {
        self.set_flag(key.into(), state);
        self
    }

    /// Builder: add values to a value facet.
    pub fn with_values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FacetValue>,
    {
        let key = key.into();
        for value in values {
            self.insert_value(&key, value.into());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FacetChoice> {
        self.choices.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FacetChoice)> {
        self.choices.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn active_keys(&self) -> impl Iterator<Item = &str> {
        self.choices.keys().map(String::as_str)
    }

    pub fn flag(&self, key: &str) -> TriState {
        match self.choices.get(key) {
            Some(FacetChoice::Flag(b)) => TriState::from(Some(*b)),
            _ => TriState::Any,
        }
    }

    pub fn values(&self, key: &str) -> Option<&BTreeSet<FacetValue>> {
        match self.choices.get(key) {
            Some(FacetChoice::Values(values)) => Some(values),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str, value: &FacetValue) -> bool {
        self.values(key).is_some_and(|values| values.contains(value))
    }

    /// Copy of this selection with one facet's restriction dropped.
    pub fn without(&self, key: &str) -> FacetSelection {
        let mut copy = self.clone();
        copy.choices.remove(key);
        copy
    }

    /// Selected value count per active facet.
    pub fn selection_counts(&self) -> BTreeMap<String, usize> {
        self.choices
            .iter()
            .map(|(key, choice)| (key.clone(), choice.len()))
            .collect()
    }

    /// Total number of selected values across facets.
    pub fn active_count(&self) -> usize {
        self.choices.values().map(FacetChoice::len).sum()
    }

    pub(crate) fn set_flag(&mut self, key: String, state: TriState) {
        match state.as_filter() {
            Some(b) => {
                self.choices.insert(key, FacetChoice::Flag(b));
            }
            None => {
                self.choices.remove(&key);
            }
        }
    }

    pub(crate) fn insert_value(&mut self, key: &str, value: FacetValue) {
        match self.choices.get_mut(key) {
            Some(FacetChoice::Values(values)) => {
                values.insert(value);
            }
            _ => {
                self.choices
                    .insert(key.to_string(), FacetChoice::Values(BTreeSet::from([value])));
            }
        }
    }

    pub(crate) fn remove_value(&mut self, key: &str, value: &FacetValue) {
        if let Some(FacetChoice::Values(values)) = self.choices.get_mut(key) {
            values.remove(value);
            if values.is_empty() {
                self.choices.remove(key);
            }
        }
    }

    pub(crate) fn replace_values(&mut self, key: &str, values: BTreeSet<FacetValue>) {
        if values.is_empty() {
            self.choices.remove(key);
        } else {
            self.choices.insert(key.to_string(), FacetChoice::Values(values));
        }
    }

    pub(crate) fn clear(&mut self, key: &str) {
        self.choices.remove(key);
    }

    pub(crate) fn clear_all(&mut self) {
        self.choices.clear();
    }

    /// Drop entries that would violate the "no empty choice" invariant.
    /// Needed for selections that arrive through deserialization.
    pub(crate) fn normalized(mut self) -> Self {
        self.choices.retain(|_, choice| !choice.is_empty());
        self
    }
}
