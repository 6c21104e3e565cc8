use serde::{Deserialize, Serialize};

use safegear_catalog::AttributeValue;
use safegear_core::ValueObject;

use crate::error::{FilterError, FilterResult};
use crate::schema::{FacetDefinition, FacetKind};

/// A selectable value of a non-boolean facet.
///
/// Text tokens (EN codes, ladder classes, materials) are opaque; numeric
/// facets hold integral classes (SNR dB, arc class, EU size).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FacetValue {
    Number(i64),
    Text(String),
}

impl ValueObject for FacetValue {}

impl FacetValue {
    pub fn text(token: impl Into<String>) -> Self {
        FacetValue::Text(token.into())
    }

    /// Parse a raw widget/query token for the given facet.
    pub fn parse(facet: &FacetDefinition, raw: &str) -> FilterResult<Self> {
        let token = raw.trim();
        match facet.kind {
            FacetKind::Boolean => Err(FilterError::invalid_value(
                facet.key,
                raw,
                "boolean facets take a tri-state, not a value",
            )),
            FacetKind::NumericEnum => token.parse::<i64>().map(FacetValue::Number).map_err(|_| {
                FilterError::invalid_value(facet.key, raw, "expected an integer class")
            }),
            FacetKind::Enum | FacetKind::MultiEnum => {
                if token.is_empty() {
                    return Err(FilterError::invalid_value(facet.key, raw, "empty value"));
                }
                if facet.display_order.is_some()
                    && facet.ladder_rank(token).is_none()
                    && !facet.is_sentinel(token)
                {
                    return Err(FilterError::invalid_value(
                        facet.key,
                        raw,
                        format!("not a {} class", facet.label),
                    ));
                }
                Ok(FacetValue::Text(token.to_string()))
            }
        }
    }

    /// Whether this value's shape fits the facet kind.
    pub fn fits(&self, kind: FacetKind) -> bool {
        match self {
            FacetValue::Number(_) => kind == FacetKind::NumericEnum,
            FacetValue::Text(_) => matches!(kind, FacetKind::Enum | FacetKind::MultiEnum),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FacetValue::Text(s) => Some(s),
            FacetValue::Number(_) => None,
        }
    }
}

impl core::fmt::Display for FacetValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FacetValue::Number(n) => write!(f, "{n}"),
            FacetValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FacetValue {
    fn from(value: i64) -> Self {
        FacetValue::Number(value)
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        FacetValue::Text(value.to_string())
    }
}

/// The facet values a product attribute contributes, de-duplicated in
/// attribute order. `None` when the attribute shape does not fit the facet.
pub(crate) fn attribute_values(facet: &FacetDefinition, attr: &AttributeValue) -> Option<Vec<FacetValue>> {
    let mut values: Vec<FacetValue> = match facet.kind {
        FacetKind::Boolean => return None,
        FacetKind::NumericEnum => attr.as_numbers()?.iter().copied().map(FacetValue::Number).collect(),
        FacetKind::Enum | FacetKind::MultiEnum => {
            if facet.kind == FacetKind::Enum && !matches!(attr, AttributeValue::Text(_)) {
                return None;
            }
            attr.as_texts()?.iter().map(|s| FacetValue::Text(s.clone())).collect()
        }
    };

    let mut seen = Vec::with_capacity(values.len());
    values.retain(|v| {
        if seen.contains(v) {
            false
        } else {
            seen.push(v.clone());
            true
        }
    });
    Some(values)
}

/// Boolean facet selection.
///
/// `Any` is "no restriction"; `Yes`/`No` require the product to carry the
/// attribute with that exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    #[default]
    Any,
    Yes,
    No,
}

impl TriState {
    /// Generic toggle order: Any -> Yes -> No -> Any.
    pub fn cycle(self) -> Self {
        match self {
            TriState::Any => TriState::Yes,
            TriState::Yes => TriState::No,
            TriState::No => TriState::Any,
        }
    }

    pub fn as_filter(self) -> Option<bool> {
        match self {
            TriState::Any => None,
            TriState::Yes => Some(true),
            TriState::No => Some(false),
        }
    }

    /// Widget token. Accepts `1|true|yes`, `0|false|no`, and `any` or empty.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Some(TriState::Any),
            "1" | "true" | "yes" => Some(TriState::Yes),
            "0" | "false" | "no" => Some(TriState::No),
            _ => None,
        }
    }
}

impl From<Option<bool>> for TriState {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => TriState::Any,
            Some(true) => TriState::Yes,
            Some(false) => TriState::No,
        }
    }
}

/// Two-state checkbox over a tri-state facet.
///
/// It cannot express `No`: checked means `Yes`, unchecked means `Any`, and a
/// `No` set elsewhere renders unchecked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryFlagView;

impl BinaryFlagView {
    pub fn is_checked(state: TriState) -> bool {
        state == TriState::Yes
    }

    pub fn state_for(checked: bool) -> TriState {
        if checked { TriState::Yes } else { TriState::Any }
    }
}
