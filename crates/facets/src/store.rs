//! Filter state store.
//!
//! The single owner of the current selection. Desktop accordions and the
//! mobile sheet both write through [`SurfaceHandle`]s onto the same store, so
//! identical operation sequences give identical selections whichever surface
//! issued them.
//!
//! Commands are validated by `handle` (no mutation) and turned into events
//! that `apply` folds into state. A rejected command leaves the store as it
//! was.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use safegear_catalog::Category;
use safegear_core::{Aggregate, AggregateRoot, Event, SessionId};

use crate::error::{FilterError, FilterResult};
use crate::predicate::validate_selection;
use crate::schema::{FacetDefinition, FacetKind, FacetSchema, schema_for};
use crate::selection::FacetSelection;
use crate::value::{FacetValue, TriState};

/// UI surface issuing a command. Informational only: it is logged, never
/// consulted when deciding the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Desktop,
    Mobile,
    /// Selection restored from the page URL by the routing layer.
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterCommand {
    /// Switch category; the selection starts over.
    SetCategory { category: Category },
    /// Value facets: add the value if absent, else remove it.
    /// Boolean facets: with no value, cycle Any -> Yes -> No -> Any; with a
    /// tri-state token (`1`, `0`, `any`), set it directly.
    Toggle { key: String, value: Option<String> },
    /// Set a boolean facet directly.
    SetFlag { key: String, state: TriState },
    /// Replace one value facet's selection wholesale.
    Replace { key: String, values: Vec<String> },
    /// Replace the whole selection (e.g. restored from a URL).
    ReplaceAll { selection: FacetSelection },
    /// Clear one facet, or all facets when `key` is `None`.
    Clear { key: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterEvent {
    CategoryChanged { category: Category },
    FlagSet { key: String, state: TriState },
    ValueAdded { key: String, value: FacetValue },
    ValueRemoved { key: String, value: FacetValue },
    ValuesReplaced { key: String, values: BTreeSet<FacetValue> },
    FacetCleared { key: String },
    SelectionCleared,
    SelectionReplaced { selection: FacetSelection },
}

impl Event for FilterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FilterEvent::CategoryChanged { .. } => "facets.category.changed",
            FilterEvent::FlagSet { .. } => "facets.flag.set",
            FilterEvent::ValueAdded { .. } => "facets.value.added",
            FilterEvent::ValueRemoved { .. } => "facets.value.removed",
            FilterEvent::ValuesReplaced { .. } => "facets.values.replaced",
            FilterEvent::FacetCleared { .. } => "facets.facet.cleared",
            FilterEvent::SelectionCleared => "facets.selection.cleared",
            FilterEvent::SelectionReplaced { .. } => "facets.selection.replaced",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

/// Aggregate root: the selection of one mounted category view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStore {
    id: SessionId,
    category: Category,
    selection: FacetSelection,
    version: u64,
}

impl FilterStore {
    /// Fresh store for a category view, with an empty selection.
    pub fn new(category: Category) -> Self {
        Self::with_id(SessionId::new(), category)
    }

    pub fn with_id(id: SessionId, category: Category) -> Self {
        Self {
            id,
            category,
            selection: FacetSelection::new(),
            version: 0,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn schema(&self) -> FacetSchema {
        schema_for(self.category)
    }

    /// Read access for rendering checked/selected widget states.
    pub fn selection(&self) -> &FacetSelection {
        &self.selection
    }

    /// Detached copy of the current selection.
    pub fn snapshot(&self) -> FacetSelection {
        self.selection.clone()
    }

    /// Validate and apply a command issued from `surface`.
    pub fn dispatch(&mut self, surface: Surface, command: FilterCommand) -> FilterResult<Vec<FilterEvent>> {
        match self.execute(&command) {
            Ok(events) => {
                tracing::debug!(
                    session = %self.id,
                    ?surface,
                    ?command,
                    events = events.len(),
                    version = self.version,
                    "filter command applied"
                );
                Ok(events)
            }
            Err(err) => {
                tracing::warn!(session = %self.id, ?surface, ?command, error = %err, "filter command rejected");
                Err(err)
            }
        }
    }

    pub fn desktop(&mut self) -> SurfaceHandle<'_> {
        SurfaceHandle {
            store: self,
            surface: Surface::Desktop,
        }
    }

    pub fn mobile(&mut self) -> SurfaceHandle<'_> {
        SurfaceHandle {
            store: self,
            surface: Surface::Mobile,
        }
    }

    pub fn surface(&mut self, surface: Surface) -> SurfaceHandle<'_> {
        SurfaceHandle { store: self, surface }
    }
}

impl AggregateRoot for FilterStore {
    type Id = SessionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for FilterStore {
    type Command = FilterCommand;
    type Event = FilterEvent;
    type Error = FilterError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            FilterEvent::CategoryChanged { category } => {
                self.category = *category;
                self.selection.clear_all();
            }
            FilterEvent::FlagSet { key, state } => {
                self.selection.set_flag(key.clone(), *state);
            }
            FilterEvent::ValueAdded { key, value } => {
                self.selection.insert_value(key, value.clone());
            }
            FilterEvent::ValueRemoved { key, value } => {
                self.selection.remove_value(key, value);
            }
            FilterEvent::ValuesReplaced { key, values } => {
                self.selection.replace_values(key, values.clone());
            }
            FilterEvent::FacetCleared { key } => {
                self.selection.clear(key);
            }
            FilterEvent::SelectionCleared => {
                self.selection.clear_all();
            }
            FilterEvent::SelectionReplaced { selection } => {
                self.selection = selection.clone();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            FilterCommand::SetCategory { category } => Ok(vec![FilterEvent::CategoryChanged {
                category: *category,
            }]),
            FilterCommand::Toggle { key, value } => self.handle_toggle(key, value.as_deref()),
            FilterCommand::SetFlag { key, state } => self.handle_set_flag(key, *state),
            FilterCommand::Replace { key, values } => self.handle_replace(key, values),
            FilterCommand::ReplaceAll { selection } => self.handle_replace_all(selection),
            FilterCommand::Clear { key } => self.handle_clear(key.as_deref()),
        }
    }
}

impl FilterStore {
    fn flag_event(&self, facet: &FacetDefinition, state: TriState) -> Vec<FilterEvent> {
        if self.selection.flag(facet.key) == state {
            return Vec::new();
        }
        vec![FilterEvent::FlagSet {
            key: facet.key.to_string(),
            state,
        }]
    }

    fn handle_toggle(&self, key: &str, value: Option<&str>) -> FilterResult<Vec<FilterEvent>> {
        let facet = self.schema().require(key)?;

        if facet.kind == FacetKind::Boolean {
            let state = match value {
                None => self.selection.flag(key).cycle(),
                Some(token) => TriState::from_token(token).ok_or_else(|| {
                    FilterError::invalid_value(key, token, "expected 1, 0 or any")
                })?,
            };
            return Ok(self.flag_event(facet, state));
        }

        let raw = value
            .ok_or_else(|| FilterError::invalid_value(key, "", format!("{} facets need a value to toggle", facet.kind)))?;
        let value = FacetValue::parse(facet, raw)?;
        let key = facet.key.to_string();

        if self.selection.contains(&key, &value) {
            Ok(vec![FilterEvent::ValueRemoved { key, value }])
        } else {
            Ok(vec![FilterEvent::ValueAdded { key, value }])
        }
    }

    fn handle_set_flag(&self, key: &str, state: TriState) -> FilterResult<Vec<FilterEvent>> {
        let facet = self.schema().require(key)?;
        if facet.kind != FacetKind::Boolean {
            return Err(FilterError::invalid_value(
                key,
                format!("{state:?}"),
                format!("{} facets take values, not a tri-state", facet.kind),
            ));
        }
        Ok(self.flag_event(facet, state))
    }

    fn handle_replace(&self, key: &str, raw_values: &[String]) -> FilterResult<Vec<FilterEvent>> {
        let facet = self.schema().require(key)?;
        if facet.kind == FacetKind::Boolean {
            return Err(FilterError::invalid_value(
                key,
                raw_values.join(","),
                "boolean facets take a tri-state",
            ));
        }

        // Parse everything before emitting so a bad token changes nothing.
        let values = raw_values
            .iter()
            .map(|raw| FacetValue::parse(facet, raw))
            .collect::<FilterResult<BTreeSet<_>>>()?;

        let key = facet.key.to_string();
        if values.is_empty() {
            return Ok(self.clear_event(key));
        }
        Ok(vec![FilterEvent::ValuesReplaced { key, values }])
    }

    fn handle_replace_all(&self, selection: &FacetSelection) -> FilterResult<Vec<FilterEvent>> {
        let selection = selection.clone().normalized();
        validate_selection(&selection, &self.schema())?;
        Ok(vec![FilterEvent::SelectionReplaced { selection }])
    }

    fn handle_clear(&self, key: Option<&str>) -> FilterResult<Vec<FilterEvent>> {
        match key {
            Some(key) => {
                let facet = self.schema().require(key)?;
                Ok(self.clear_event(facet.key.to_string()))
            }
            None if self.selection.is_empty() => Ok(Vec::new()),
            None => Ok(vec![FilterEvent::SelectionCleared]),
        }
    }

    fn clear_event(&self, key: String) -> Vec<FilterEvent> {
        if self.selection.get(&key).is_none() {
            return Vec::new();
        }
        vec![FilterEvent::FacetCleared { key }]
    }
}

/// Entry point for one UI surface. Every operation is a [`FilterCommand`]
/// dispatched to the shared store.
#[derive(Debug)]
pub struct SurfaceHandle<'a> {
    store: &'a mut FilterStore,
    surface: Surface,
}

impl SurfaceHandle<'_> {
    pub fn set_category(&mut self, category: Category) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::SetCategory { category })
    }

    pub fn toggle(&mut self, key: &str, value: &str) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::Toggle {
            key: key.to_string(),
            value: Some(value.to_string()),
        })
    }

    /// Generic boolean toggle (Any -> Yes -> No -> Any).
    pub fn cycle(&mut self, key: &str) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::Toggle {
            key: key.to_string(),
            value: None,
        })
    }

    pub fn set_flag(&mut self, key: &str, state: TriState) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::SetFlag {
            key: key.to_string(),
            state,
        })
    }

    pub fn replace<I, S>(&mut self, key: &str, values: I) -> FilterResult<Vec<FilterEvent>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dispatch(FilterCommand::Replace {
            key: key.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn replace_all(&mut self, selection: FacetSelection) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::ReplaceAll { selection })
    }

    pub fn clear(&mut self, key: &str) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::Clear {
            key: Some(key.to_string()),
        })
    }

    pub fn clear_all(&mut self) -> FilterResult<Vec<FilterEvent>> {
        self.dispatch(FilterCommand::Clear { key: None })
    }

    pub fn selection(&self) -> &FacetSelection {
        self.store.selection()
    }

    fn dispatch(&mut self, command: FilterCommand) -> FilterResult<Vec<FilterEvent>> {
        self.store.dispatch(self.surface, command)
    }
}
