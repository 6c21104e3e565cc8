use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use safegear_core::{DomainError, DomainResult, Entity, ProductId};

use crate::attribute::AttributeValue;
use crate::category::Category;

/// A catalog product as seen by the filter engine.
///
/// Records are immutable once built. The attribute bag maps facet keys to
/// values; which keys are legal for the category is checked by the facet
/// schema, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    category: Category,
    attributes: BTreeMap<String, AttributeValue>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, category: Category) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation(format!("product {id}: name cannot be empty")));
        }

        Ok(Self {
            id,
            name,
            category,
            attributes: BTreeMap::new(),
        })
    }

    /// Builder-style attribute insertion. Empty sets are dropped so that
    /// "no values" and "not applicable" read the same way downstream.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let value = value.into();
        let key = key.into();
        if value.is_empty_set() {
            self.attributes.remove(&key);
        } else {
            self.attributes.insert(key, value);
        }
        self
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Wire shape of a product: attribute values may be `null`.
#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    category: Category,
    #[serde(default)]
    attributes: BTreeMap<String, Option<AttributeValue>>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let product = Product::new(record.id, record.name, record.category)?;
        Ok(record
            .attributes
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .fold(product, |p, (key, value)| p.with_attribute(key, value)))
    }
}
