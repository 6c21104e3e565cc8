//! Engine configuration.

/// Tunables for projection. Defaults suit the storefront; `from_env` lets a
/// deployment override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Hide boolean facets where the reachable products carry only one value
    /// (a toggle there would have no effect). A facet with an active choice
    /// is always shown so it can be reset.
    pub hide_single_value_flags: bool,
    /// Catalog size above which a projection may not fit one UI frame; only
    /// triggers a warning.
    pub frame_budget_products: usize,
}

pub const HIDE_SINGLE_VALUE_FLAGS_VAR: &str = "SAFEGEAR_HIDE_SINGLE_VALUE_FLAGS";
pub const FRAME_BUDGET_PRODUCTS_VAR: &str = "SAFEGEAR_FRAME_BUDGET_PRODUCTS";

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hide_single_value_flags: true,
            frame_budget_products: 500,
        }
    }
}

impl EngineConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`; unset or unparsable values keep their
    /// default (the latter with a warning).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let hide_single_value_flags = match lookup(HIDE_SINGLE_VALUE_FLAGS_VAR) {
            None => defaults.hide_single_value_flags,
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(var = HIDE_SINGLE_VALUE_FLAGS_VAR, value = %raw, "invalid boolean; using default");
                defaults.hide_single_value_flags
            }),
        };

        let frame_budget_products = match lookup(FRAME_BUDGET_PRODUCTS_VAR) {
            None => defaults.frame_budget_products,
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(var = FRAME_BUDGET_PRODUCTS_VAR, value = %raw, "invalid product count; using default");
                defaults.frame_budget_products
            }),
        };

        Self {
            hide_single_value_flags,
            frame_budget_products,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
