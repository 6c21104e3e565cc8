//! Filter predicate evaluation.
//!
//! AND across facets, OR within a facet. A facet without a choice does not
//! restrict anything; a missing attribute never satisfies a restriction
//! (unless the facet's sentinel is what was selected).

use safegear_catalog::Product;

use crate::error::{FilterError, FilterResult};
use crate::schema::{FacetDefinition, FacetKind, FacetSchema};
use crate::selection::{FacetChoice, FacetSelection};
use crate::value::{FacetValue, attribute_values};

/// Whether `product` satisfies every active facet of `selection`.
///
/// Only facets declared in `schema` are evaluated.
pub fn matches(product: &Product, selection: &FacetSelection, schema: &FacetSchema) -> bool {
    schema.facets().iter().all(|facet| match selection.get(facet.key) {
        None => true,
        Some(choice) => facet_matches(product, facet, choice),
    })
}

/// Per-facet predicate.
pub fn facet_matches(product: &Product, facet: &FacetDefinition, choice: &FacetChoice) -> bool {
    let attr = product.attribute(facet.key);
    match (facet.kind, choice) {
        (FacetKind::Boolean, FacetChoice::Flag(wanted)) => {
            attr.and_then(|a| a.as_flag()) == Some(*wanted)
        }
        (FacetKind::Boolean, FacetChoice::Values(_)) | (_, FacetChoice::Flag(_)) => false,
        (_, FacetChoice::Values(selected)) if selected.is_empty() => true,
        (_, FacetChoice::Values(selected)) => match attr {
            None => facet
                .unspecified
                .is_some_and(|label| selected.contains(&FacetValue::text(label))),
            Some(attr) => attribute_values(facet, attr)
                .is_some_and(|values| values.iter().any(|v| selected.contains(v))),
        },
    }
}

/// Check a product record against its category schema.
///
/// Rejects category mismatches, undeclared keys, attribute shapes the facet
/// cannot read, and off-ladder values on ladder facets.
pub fn validate_product(product: &Product, schema: &FacetSchema) -> FilterResult<()> {
    if product.category() != schema.category() {
        return Err(FilterError::schema_mismatch(
            schema.category(),
            "category",
            format!("product {} belongs to {}", product.id_typed(), product.category()),
        ));
    }

    for (key, value) in product.attributes() {
        let facet = schema.require(key)?;
        if !facet.accepts(value) {
            return Err(FilterError::schema_mismatch(
                schema.category(),
                key.as_str(),
                format!("expected {} attribute, found {}", facet.kind, value.shape()),
            ));
        }
        if facet.display_order.is_some() {
            let off_ladder = value
                .as_texts()
                .into_iter()
                .flatten()
                .find(|t| facet.ladder_rank(t).is_none());
            if let Some(token) = off_ladder {
                return Err(FilterError::schema_mismatch(
                    schema.category(),
                    key.as_str(),
                    format!("{token:?} is not a {} class", facet.label),
                ));
            }
        }
    }

    Ok(())
}

/// Check every active choice against the schema: declared key, choice shape
/// matching the kind, and each value parseable for the facet.
pub fn validate_selection(selection: &FacetSelection, schema: &FacetSchema) -> FilterResult<()> {
    selection
        .iter()
        .try_for_each(|(key, choice)| validate_choice(key, choice, schema))
}

pub(crate) fn validate_choice(key: &str, choice: &FacetChoice, schema: &FacetSchema) -> FilterResult<()> {
    let facet = schema.require(key)?;
    match (facet.kind, choice) {
        (FacetKind::Boolean, FacetChoice::Flag(_)) => Ok(()),
        (FacetKind::Boolean, FacetChoice::Values(_)) => Err(FilterError::invalid_value(
            key,
            "values",
            "boolean facets take a tri-state",
        )),
        (_, FacetChoice::Flag(b)) => Err(FilterError::invalid_value(
            key,
            b.to_string(),
            format!("{} facets take values", facet.kind),
        )),
        (kind, FacetChoice::Values(values)) => {
            for value in values {
                if !value.fits(kind) {
                    return Err(FilterError::invalid_value(
                        key,
                        value.to_string(),
                        format!("wrong value type for {kind} facet"),
                    ));
                }
                // Stored values must be exactly what parsing would produce, or
                // they could never match a product and would not survive the
                // URL encoding.
                let raw = value.to_string();
                if FacetValue::parse(facet, &raw)? != *value {
                    return Err(FilterError::invalid_value(key, raw, "not in canonical form"));
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema_for;
    use crate::value::TriState;
    use safegear_catalog::{AttributeValue, Category};

    fn eyewear(id: &str, attrs: Vec<(&str, AttributeValue)>) -> Product {
        attrs.into_iter().fold(
            Product::new(id.parse().unwrap(), format!("Eyewear {id}"), Category::Eyewear).unwrap(),
            |p, (k, v)| p.with_attribute(k, v),
        )
    }

    #[test]
    fn and_across_facets() {
        let schema = schema_for(Category::Eyewear);
        let product = eyewear("a", vec![("uv", "UV1".into()), ("esd", true.into())]);

        let both = FacetSelection::new()
            .with_values("uv", ["UV1"])
            .with_flag("esd", TriState::Yes);
        assert!(matches(&product, &both, &schema));

        let conflicting = FacetSelection::new()
            .with_values("uv", ["UV1"])
            .with_flag("esd", TriState::No);
        assert!(!matches(&product, &conflicting, &schema));
    }

    #[test]
    fn or_within_facet_intersects_product_tags() {
        let schema = schema_for(Category::Eyewear);
        let product = eyewear("a", vec![("en_standards", vec!["EN 166", "EN 170"].into())]);

        let selection = FacetSelection::new().with_values("en_standards", ["EN 172", "EN 170"]);
        assert!(matches(&product, &selection, &schema));

        let selection = FacetSelection::new().with_values("en_standards", ["EN 172"]);
        assert!(!matches(&product, &selection, &schema));
    }

    #[test]
    fn missing_boolean_is_not_a_wildcard() {
        let schema = schema_for(Category::Eyewear);
        let product = eyewear("a", vec![]);

        assert!(!matches(&product, &FacetSelection::new().with_flag("esd", TriState::Yes), &schema));
        assert!(!matches(&product, &FacetSelection::new().with_flag("esd", TriState::No), &schema));
        assert!(matches(&product, &FacetSelection::new(), &schema));
    }

    #[test]
    fn sentinel_selection_matches_missing_attribute() {
        let schema = schema_for(Category::Eyewear);
        let bare = eyewear("a", vec![]);
        let tinted = eyewear("b", vec![("lens_tint", "Smoke".into())]);
        let selection = FacetSelection::new().with_values("lens_tint", ["Not specified"]);

        assert!(matches(&bare, &selection, &schema));
        assert!(!matches(&tinted, &selection, &schema));
    }

    #[test]
    fn empty_value_set_is_inactive() {
        let facet = schema_for(Category::Eyewear).get("uv").unwrap();
        let product = eyewear("a", vec![]);
        assert!(facet_matches(&product, facet, &FacetChoice::Values(Default::default())));
    }

    #[test]
    fn validate_product_rejects_undeclared_keys() {
        let schema = schema_for(Category::Eyewear);
        let product = eyewear("a", vec![("cut_level", "C".into())]);

        let err = validate_product(&product, &schema).unwrap_err();
        match err {
            FilterError::SchemaMismatch { key, .. } => assert_eq!(key, "cut_level"),
            _ => panic!("Expected SchemaMismatch"),
        }
    }

    #[test]
    fn validate_product_rejects_wrong_shape_and_off_ladder_values() {
        let schema = schema_for(Category::Eyewear);
        let product = eyewear("a", vec![("esd", "yes".into())]);
        assert!(validate_product(&product, &schema).is_err());

        let schema = schema_for(Category::Respiratory);
        let mask = Product::new("r-1".parse().unwrap(), "Mask", Category::Respiratory)
            .unwrap()
            .with_attribute("protection_class", "FFP4");
        assert!(validate_product(&mask, &schema).is_err());
    }

    #[test]
    fn validate_product_rejects_foreign_category() {
        let schema = schema_for(Category::Gloves);
        let product = eyewear("a", vec![]);
        assert!(matches!(
            validate_product(&product, &schema),
            Err(FilterError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn validate_selection_checks_keys_and_shapes() {
        let schema = schema_for(Category::Hearing);

        let ok = FacetSelection::new()
            .with_values("snr", [32_i64])
            .with_flag("reusable", TriState::Yes);
        assert!(validate_selection(&ok, &schema).is_ok());

        let unknown = FacetSelection::new().with_values("uv", ["UV1"]);
        assert!(matches!(
            validate_selection(&unknown, &schema),
            Err(FilterError::SchemaMismatch { .. })
        ));

        let wrong_type = FacetSelection::new().with_values("snr", ["32"]);
        assert!(matches!(
            validate_selection(&wrong_type, &schema),
            Err(FilterError::InvalidSelectionValue { .. })
        ));

        let flag_on_values = FacetSelection::new().with_flag("snr", TriState::Yes);
        assert!(validate_selection(&flag_on_values, &schema).is_err());
    }

    #[test]
    fn validate_selection_rejects_untrimmed_values() {
        let schema = schema_for(Category::Eyewear);
        let padded = FacetSelection::new().with_values("uv", [" UV1"]);

        match validate_selection(&padded, &schema).unwrap_err() {
            FilterError::InvalidSelectionValue { key, value, .. } => {
                assert_eq!(key, "uv");
                assert_eq!(value, " UV1");
            }
            other => panic!("Expected InvalidSelectionValue, got {other:?}"),
        }

        let canonical = FacetSelection::new().with_values("uv", ["UV1"]);
        assert!(validate_selection(&canonical, &schema).is_ok());
    }
}
