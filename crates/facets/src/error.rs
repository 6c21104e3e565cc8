//! Filter engine error taxonomy.
//!
//! Every error is recoverable at the boundary that detects it: the store
//! rejects the command and keeps its state, the projector skips the offending
//! product and carries on with the rest of the catalog.

use thiserror::Error;

use safegear_catalog::Category;

pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A product or selection references a facet key the category does not
    /// declare, or holds a value of the wrong shape for it.
    #[error("schema mismatch for {category} facet {key:?}: {reason}")]
    SchemaMismatch {
        category: Category,
        key: String,
        reason: String,
    },

    /// A selection value is inconsistent with the facet's kind.
    #[error("invalid value {value:?} for facet {key:?}: {reason}")]
    InvalidSelectionValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A selection query string could not be parsed.
    #[error("malformed selection query: {0}")]
    MalformedQuery(String),
}

impl FilterError {
    pub fn schema_mismatch(category: Category, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            category,
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelectionValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedQuery(msg.into())
    }
}
