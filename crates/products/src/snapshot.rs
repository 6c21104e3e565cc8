use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use safegear_core::{DomainError, DomainResult, Entity, SnapshotId};

use crate::category::Category;
use crate::product::Product;

/// A payload record that could not be turned into a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position in the payload array.
    pub index: usize,
    /// The record's `id`, when it carried a readable one.
    pub id: Option<String>,
    pub error: DomainError,
}

/// An immutable catalog snapshot.
///
/// A filtering session reads from exactly one snapshot. When the catalog is
/// refetched a new snapshot (with a new id) is built; existing snapshots are
/// never mutated. Cloning is cheap (shared product slice).
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    id: SnapshotId,
    loaded_at: DateTime<Utc>,
    products: Arc<[Product]>,
    rejected: Arc<[RejectedRecord]>,
}

impl CatalogSnapshot {
    /// Freeze a product collection. Product ids must be unique.
    pub fn from_products(products: Vec<Product>) -> DomainResult<Self> {
        Self::with_identity(SnapshotId::new(), Utc::now(), products)
    }

    /// Like [`CatalogSnapshot::from_products`] with explicit identity, for
    /// deterministic tests and replays.
    pub fn with_identity(
        id: SnapshotId,
        loaded_at: DateTime<Utc>,
        products: Vec<Product>,
    ) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id()) {
                return Err(DomainError::invariant(format!(
                    "duplicate product id in catalog: {}",
                    product.id()
                )));
            }
        }

        Ok(Self {
            id,
            loaded_at,
            products: products.into(),
            rejected: Vec::new().into(),
        })
    }

    /// Parse a JSON array of product records (nulls normalized to absent).
    ///
    /// Records are converted one by one. A record that does not parse (unknown
    /// category, ill-typed attribute, repeated id) is kept out of the snapshot
    /// and listed in [`CatalogSnapshot::rejected`]; the rest still load. Only a
    /// payload that is not a JSON array fails as a whole.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let records: Vec<Value> = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed catalog payload: {e}")))?;

        let mut products = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();
        let mut seen = HashSet::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            let id = record.get("id").and_then(Value::as_str).map(str::to_string);
            let parsed = serde_json::from_value::<Product>(record)
                .map_err(|e| DomainError::validation(format!("malformed product record: {e}")))
                .and_then(|product| {
                    if seen.contains(product.id()) {
                        Err(DomainError::invariant(format!(
                            "duplicate product id in catalog: {}",
                            product.id()
                        )))
                    } else {
                        seen.insert(product.id().clone());
                        Ok(product)
                    }
                });

            match parsed {
                Ok(product) => products.push(product),
                Err(error) => {
                    tracing::warn!(index, id = ?id, error = %error, "skipping catalog record");
                    rejected.push(RejectedRecord { index, id, error });
                }
            }
        }

        let mut snapshot = Self::from_products(products)?;
        snapshot.rejected = rejected.into();
        Ok(snapshot)
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Payload records left out when loading through [`CatalogSnapshot::from_json`].
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    /// Products of one category, in catalog order.
    pub fn for_category(&self, category: Category) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category() == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, category: Category) -> Product {
        Product::new(id.parse().unwrap(), format!("Product {id}"), category).unwrap()
    }

    #[test]
    fn rejects_duplicate_product_ids() {
        let err = CatalogSnapshot::from_products(vec![
            product("a", Category::Gloves),
            product("a", Category::Eyewear),
        ])
        .unwrap_err();

        match err {
            DomainError::InvariantViolation(msg) => assert!(msg.contains("a")),
            _ => panic!("Expected InvariantViolation for duplicate id"),
        }
    }

    #[test]
    fn from_json_parses_catalog_payload() {
        let json = r#"[
            { "id": "g-1", "name": "Cut glove", "category": "gloves",
              "attributes": { "cut_level": "C", "en_standards": ["EN 388"] } },
            { "id": "h-1", "name": "Ear plugs", "category": "hearing",
              "attributes": { "snr": 37, "reusable": null } }
        ]"#;

        let snapshot = CatalogSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.for_category(Category::Hearing).len(), 1);
        assert!(snapshot.for_category(Category::Swabs).is_empty());
    }

    #[test]
    fn from_json_reports_malformed_payload() {
        let err = CatalogSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = CatalogSnapshot::from_json(r#"{ "id": "h-1" }"#).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn from_json_skips_bad_records_and_keeps_the_rest() {
        let json = r#"[
            { "id": "h-1", "name": "Ear plugs", "category": "hearing", "attributes": { "snr": 32 } },
            { "id": "h-2", "name": "Ear muffs", "category": "hearing", "attributes": { "snr": 28.5 } },
            { "id": "t-1", "name": "Tool belt", "category": "toolbelts" },
            { "id": "h-1", "name": "Ear plugs again", "category": "hearing" },
            { "name": "No id", "category": "hearing" }
        ]"#;

        let snapshot = CatalogSnapshot::from_json(json).unwrap();
        let ids: Vec<&str> = snapshot.products().iter().map(|p| p.id_typed().as_str()).collect();
        assert_eq!(ids, ["h-1"]);
        assert_eq!(snapshot.for_category(Category::Hearing).len(), 1);

        let rejected = snapshot.rejected();
        assert_eq!(rejected.len(), 4);
        assert_eq!(rejected[0].index, 1);
        assert_eq!(rejected[0].id.as_deref(), Some("h-2"));
        assert!(matches!(rejected[0].error, DomainError::Validation(_)));
        assert_eq!(rejected[1].id.as_deref(), Some("t-1"));
        assert!(matches!(rejected[1].error, DomainError::Validation(_)));
        assert!(matches!(rejected[2].error, DomainError::InvariantViolation(_)));
        assert_eq!(rejected[3].id, None);
    }

    #[test]
    fn snapshots_built_from_products_reject_nothing() {
        let snapshot = CatalogSnapshot::from_products(vec![product("a", Category::Gloves)]).unwrap();
        assert!(snapshot.rejected().is_empty());
    }

    #[test]
    fn clones_share_identity() {
        let snapshot = CatalogSnapshot::from_products(vec![product("a", Category::Gloves)]).unwrap();
        let clone = snapshot.clone();
        assert_eq!(snapshot.id(), clone.id());
        assert_eq!(snapshot.loaded_at(), clone.loaded_at());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: per-category views partition the catalog and keep catalog order.
            #[test]
            fn category_views_partition_catalog(picks in proptest::collection::vec(0usize..8, 0..40)) {
                let products: Vec<Product> = picks
                    .iter()
                    .enumerate()
                    .map(|(i, pick)| product(&format!("p-{i}"), Category::ALL[*pick]))
                    .collect();
                let snapshot = CatalogSnapshot::from_products(products).unwrap();

                let total: usize = Category::ALL
                    .iter()
                    .map(|c| snapshot.for_category(*c).len())
                    .sum();
                prop_assert_eq!(total, snapshot.len());

                for category in Category::ALL {
                    let ids: Vec<&str> = snapshot
                        .for_category(category)
                        .iter()
                        .map(|p| p.id_typed().as_str())
                        .collect();
                    let expected: Vec<&str> = snapshot
                        .products()
                        .iter()
                        .filter(|p| p.category() == category)
                        .map(|p| p.id_typed().as_str())
                        .collect();
                    prop_assert_eq!(ids, expected);
                }
            }
        }
    }
}
