//! Facet schema registry.
//!
//! One static schema per category. Facet keys are unique within a category;
//! the same key may appear in several categories, each with its own
//! definition (see [`kind_conflicts`] for keys whose kind differs).

use std::collections::BTreeMap;

use serde::Serialize;

use safegear_catalog::{AttributeValue, Category};

use crate::error::{FilterError, FilterResult};

/// Option label shown for products that do not carry the attribute, on facets
/// that opt into it.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Keys that are deliberately declared with different kinds across categories.
pub const INTENTIONAL_KIND_REUSE: &[&str] = &["sizes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKind {
    Boolean,
    Enum,
    MultiEnum,
    NumericEnum,
}

impl FacetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FacetKind::Boolean => "boolean",
            FacetKind::Enum => "enum",
            FacetKind::MultiEnum => "multiEnum",
            FacetKind::NumericEnum => "numericEnum",
        }
    }
}

impl core::fmt::Display for FacetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generic widget a renderer uses for a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetWidget {
    BooleanToggle,
    SingleSelectList,
    MultiSelectList,
    NumericClassList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacetDefinition {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FacetKind,
    pub category: Category,
    /// Fixed display ladder. When set, only ladder values are legal and
    /// options are listed in ladder order.
    pub display_order: Option<&'static [&'static str]>,
    /// Sentinel option standing for "attribute absent".
    pub unspecified: Option<&'static str>,
}

impl FacetDefinition {
    const fn of(category: Category, key: &'static str, label: &'static str, kind: FacetKind) -> Self {
        Self {
            key,
            label,
            kind,
            category,
            display_order: None,
            unspecified: None,
        }
    }

    pub const fn boolean(category: Category, key: &'static str, label: &'static str) -> Self {
        Self::of(category, key, label, FacetKind::Boolean)
    }

    pub const fn single(category: Category, key: &'static str, label: &'static str) -> Self {
        Self::of(category, key, label, FacetKind::Enum)
    }

    pub const fn multi(category: Category, key: &'static str, label: &'static str) -> Self {
        Self::of(category, key, label, FacetKind::MultiEnum)
    }

    pub const fn numeric(category: Category, key: &'static str, label: &'static str) -> Self {
        Self::of(category, key, label, FacetKind::NumericEnum)
    }

    pub const fn with_order(self, ladder: &'static [&'static str]) -> Self {
        Self {
            display_order: Some(ladder),
            ..self
        }
    }

    pub const fn with_unspecified(self, label: &'static str) -> Self {
        Self {
            unspecified: Some(label),
            ..self
        }
    }

    pub fn widget(&self) -> FacetWidget {
        match self.kind {
            FacetKind::Boolean => FacetWidget::BooleanToggle,
            FacetKind::Enum => FacetWidget::SingleSelectList,
            FacetKind::MultiEnum => FacetWidget::MultiSelectList,
            FacetKind::NumericEnum => FacetWidget::NumericClassList,
        }
    }

    /// Whether a product attribute has a shape this facet can read.
    pub fn accepts(&self, value: &AttributeValue) -> bool {
        match self.kind {
            FacetKind::Boolean => matches!(value, AttributeValue::Flag(_)),
            FacetKind::Enum => matches!(value, AttributeValue::Text(_)),
            FacetKind::MultiEnum => matches!(value, AttributeValue::Text(_) | AttributeValue::Tags(_)),
            FacetKind::NumericEnum => {
                matches!(value, AttributeValue::Number(_) | AttributeValue::Numbers(_))
            }
        }
    }

    /// Position on the display ladder; `None` when off-ladder or unordered.
    pub fn ladder_rank(&self, token: &str) -> Option<usize> {
        self.display_order?.iter().position(|v| *v == token)
    }

    pub fn is_sentinel(&self, token: &str) -> bool {
        self.unspecified == Some(token)
    }
}

/// The facets applicable to one category.
#[derive(Debug, Clone, Copy)]
pub struct FacetSchema {
    category: Category,
    facets: &'static [FacetDefinition],
}

impl FacetSchema {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn facets(&self) -> &'static [FacetDefinition] {
        self.facets
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&'static FacetDefinition> {
        self.facets.iter().find(|f| f.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.facets.iter().position(|f| f.key == key)
    }

    /// Like [`FacetSchema::get`], reporting undeclared keys as a schema mismatch.
    pub fn require(&self, key: &str) -> FilterResult<&'static FacetDefinition> {
        self.get(key).ok_or_else(|| {
            FilterError::schema_mismatch(self.category, key, "facet is not declared for this category")
        })
    }
}

/// Schema lookup. Total over the closed category set; unknown category tokens
/// are rejected when parsing [`Category`].
pub fn schema_for(category: Category) -> FacetSchema {
    let facets = match category {
        Category::Gloves => GLOVES,
        Category::Clothing => CLOTHING,
        Category::Eyewear => EYEWEAR,
        Category::Footwear => FOOTWEAR,
        Category::Headgear => HEADGEAR,
        Category::Hearing => HEARING,
        Category::Respiratory => RESPIRATORY,
        Category::Swabs => SWABS,
    };
    FacetSchema { category, facets }
}

/// A key declared with more than one kind across categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindConflict {
    pub key: &'static str,
    pub usages: Vec<(Category, FacetKind)>,
}

/// Registry audit: keys whose kind differs between categories, sorted by key.
pub fn kind_conflicts() -> Vec<KindConflict> {
    let mut usages: BTreeMap<&'static str, Vec<(Category, FacetKind)>> = BTreeMap::new();
    for category in Category::ALL {
        for facet in schema_for(category).facets() {
            usages.entry(facet.key).or_default().push((category, facet.kind));
        }
    }

    usages
        .into_iter()
        .filter(|(_, uses)| uses.iter().any(|(_, kind)| *kind != uses[0].1))
        .map(|(key, usages)| KindConflict { key, usages })
        .collect()
}

const CUT_LEVELS: &[&str] = &["A", "B", "C", "D", "E", "F"];
const GARMENT_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL", "3XL"];
const HI_VIS_CLASSES: &[&str] = &["Class 1", "Class 2", "Class 3"];
const FOOTWEAR_RATINGS: &[&str] = &["SB", "S1", "S1P", "S2", "S3", "S4", "S5", "S6", "S7"];
const FFP_CLASSES: &[&str] = &["FFP1", "FFP2", "FFP3"];

use Category as C;

static GLOVES: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Gloves, "en_standards", "EN standards"),
    FacetDefinition::single(C::Gloves, "cut_level", "Cut level").with_order(CUT_LEVELS),
    FacetDefinition::numeric(C::Gloves, "heat_level", "Heat level"),
    FacetDefinition::multi(C::Gloves, "material", "Material"),
    FacetDefinition::single(C::Gloves, "coating", "Coating").with_unspecified(NOT_SPECIFIED),
    FacetDefinition::multi(C::Gloves, "sizes", "Sizes").with_order(GARMENT_SIZES),
    FacetDefinition::boolean(C::Gloves, "food_safe", "Food safe"),
    FacetDefinition::boolean(C::Gloves, "touchscreen", "Touchscreen compatible"),
    FacetDefinition::boolean(C::Gloves, "esd", "ESD safe"),
];

static CLOTHING: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Clothing, "en_standards", "EN standards"),
    FacetDefinition::multi(C::Clothing, "garment_type", "Garment type"),
    FacetDefinition::numeric(C::Clothing, "arc_class", "Arc class"),
    FacetDefinition::single(C::Clothing, "hi_vis_class", "Hi-vis class").with_order(HI_VIS_CLASSES),
    FacetDefinition::multi(C::Clothing, "colours", "Colours"),
    FacetDefinition::multi(C::Clothing, "sizes", "Sizes").with_order(GARMENT_SIZES),
    FacetDefinition::boolean(C::Clothing, "flame_retardant", "Flame retardant"),
    FacetDefinition::boolean(C::Clothing, "waterproof", "Waterproof"),
];

static EYEWEAR: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Eyewear, "en_standards", "EN standards"),
    FacetDefinition::single(C::Eyewear, "uv", "UV protection"),
    FacetDefinition::single(C::Eyewear, "lens_tint", "Lens tint").with_unspecified(NOT_SPECIFIED),
    FacetDefinition::single(C::Eyewear, "frame_style", "Frame style"),
    FacetDefinition::numeric(C::Eyewear, "optical_class", "Optical class"),
    FacetDefinition::boolean(C::Eyewear, "anti_fog", "Anti-fog"),
    FacetDefinition::boolean(C::Eyewear, "esd", "ESD safe"),
    FacetDefinition::boolean(C::Eyewear, "prescription", "Prescription available"),
];

static FOOTWEAR: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Footwear, "en_standards", "EN standards"),
    FacetDefinition::single(C::Footwear, "safety_rating", "Safety rating").with_order(FOOTWEAR_RATINGS),
    FacetDefinition::single(C::Footwear, "sole_material", "Sole material"),
    FacetDefinition::single(C::Footwear, "toe_cap", "Toe cap"),
    FacetDefinition::numeric(C::Footwear, "sizes", "EU sizes"),
    FacetDefinition::boolean(C::Footwear, "esd", "ESD safe"),
    FacetDefinition::boolean(C::Footwear, "metal_free", "Metal free"),
];

static HEADGEAR: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Headgear, "en_standards", "EN standards"),
    FacetDefinition::single(C::Headgear, "headgear_type", "Type"),
    FacetDefinition::multi(C::Headgear, "colours", "Colours"),
    FacetDefinition::numeric(C::Headgear, "arc_class", "Arc class"),
    FacetDefinition::boolean(C::Headgear, "vented", "Vented"),
    FacetDefinition::boolean(C::Headgear, "electrically_insulated", "Electrically insulated"),
];

static HEARING: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Hearing, "en_standards", "EN standards"),
    FacetDefinition::numeric(C::Hearing, "snr", "SNR (dB)"),
    FacetDefinition::single(C::Hearing, "hearing_type", "Type"),
    FacetDefinition::boolean(C::Hearing, "reusable", "Reusable"),
    FacetDefinition::boolean(C::Hearing, "detectable", "Metal detectable"),
];

static RESPIRATORY: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Respiratory, "en_standards", "EN standards"),
    FacetDefinition::single(C::Respiratory, "protection_class", "Protection class").with_order(FFP_CLASSES),
    FacetDefinition::multi(C::Respiratory, "filter_types", "Filter types"),
    FacetDefinition::single(C::Respiratory, "mask_type", "Mask type"),
    FacetDefinition::boolean(C::Respiratory, "valved", "Valved"),
    FacetDefinition::boolean(C::Respiratory, "reusable", "Reusable"),
];

static SWABS: &[FacetDefinition] = &[
    FacetDefinition::multi(C::Swabs, "en_standards", "EN standards"),
    FacetDefinition::single(C::Swabs, "swab_material", "Material"),
    FacetDefinition::boolean(C::Swabs, "sterile", "Sterile"),
];
