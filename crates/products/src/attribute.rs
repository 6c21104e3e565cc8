use serde::{Deserialize, Serialize};

/// A single entry of a product's attribute bag.
///
/// The facet schema decides which shape is legal for a key; the record itself
/// only carries what the catalog supplied. Absence is expressed by the key
/// being missing from the bag, never by a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(i64),
    Text(String),
    Numbers(Vec<i64>),
    Tags(Vec<String>),
}

impl AttributeValue {
    /// Human-readable shape name, used in mismatch diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            AttributeValue::Flag(_) => "boolean",
            AttributeValue::Number(_) => "number",
            AttributeValue::Text(_) => "string",
            AttributeValue::Numbers(_) => "number set",
            AttributeValue::Tags(_) => "string set",
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            AttributeValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// String view: a single string is a one-element set.
    pub fn as_texts(&self) -> Option<&[String]> {
        match self {
            AttributeValue::Text(s) => Some(core::slice::from_ref(s)),
            AttributeValue::Tags(tags) => Some(tags),
            _ => None,
        }
    }

    /// Numeric view: a single number is a one-element set.
    pub fn as_numbers(&self) -> Option<&[i64]> {
        match self {
            AttributeValue::Number(n) => Some(core::slice::from_ref(n)),
            AttributeValue::Numbers(ns) => Some(ns),
            _ => None,
        }
    }

    /// True for set-shaped values with no members.
    pub fn is_empty_set(&self) -> bool {
        match self {
            AttributeValue::Numbers(ns) => ns.is_empty(),
            AttributeValue::Tags(tags) => tags.is_empty(),
            _ => false,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(value: Vec<i64>) -> Self {
        AttributeValue::Numbers(value)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(value: Vec<&str>) -> Self {
        AttributeValue::Tags(value.into_iter().map(str::to_string).collect())
    }
}
