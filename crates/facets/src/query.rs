//! Selection <-> URL query string.
//!
//! Encoding per facet kind:
//! - boolean: `key=1` or `key=0`; an unset flag is absent
//! - enum / multiEnum: `key=tok1,tok2` with each token percent-encoded
//! - numericEnum: `key=25,32`
//!
//! Facets are written in schema order and values in their canonical set
//! order, so equal selections always encode to the same string and decoding
//! an encoded selection reproduces it exactly.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::error::{FilterError, FilterResult};
use crate::schema::{FacetKind, FacetSchema};
use crate::selection::{FacetChoice, FacetSelection};
use crate::value::{FacetValue, TriState};

pub fn encode_selection(selection: &FacetSelection, schema: &FacetSchema) -> String {
    schema
        .facets()
        .iter()
        .filter_map(|facet| {
            let encoded = match selection.get(facet.key)? {
                FacetChoice::Flag(true) => "1".to_string(),
                FacetChoice::Flag(false) => "0".to_string(),
                FacetChoice::Values(values) => values
                    .iter()
                    .map(|v| urlencoding::encode(&v.to_string()).into_owned())
                    .collect::<Vec<_>>()
                    .join(","),
            };
            Some(format!("{}={}", urlencoding::encode(facet.key), encoded))
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse a query string (with or without a leading `?`) into a selection.
///
/// Unknown keys are a schema mismatch; tokens that do not fit the facet are
/// invalid values. Empty values are treated as absent.
pub fn decode_selection(query: &str, schema: &FacetSchema) -> FilterResult<FacetSelection> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut selection = FacetSelection::new();
    let mut seen = BTreeSet::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair
            .split_once('=')
            .ok_or_else(|| FilterError::malformed(format!("missing '=' in {pair:?}")))?;
        let key = decode(raw_key)?;
        let facet = schema.require(&key)?;

        if !seen.insert(facet.key) {
            return Err(FilterError::malformed(format!("facet {key:?} appears more than once")));
        }
        if raw_value.is_empty() {
            continue;
        }

        if facet.kind == FacetKind::Boolean {
            let state = match raw_value {
                "1" => TriState::Yes,
                "0" => TriState::No,
                other => return Err(FilterError::invalid_value(facet.key, other, "expected 1 or 0")),
            };
            selection.set_flag(facet.key.to_string(), state);
            continue;
        }

        let values = raw_value
            .split(',')
            .map(|token| decode(token).and_then(|t| FacetValue::parse(facet, &t)))
            .collect::<FilterResult<BTreeSet<_>>>()?;
        selection.replace_values(facet.key, values);
    }

    Ok(selection)
}

fn decode(raw: &str) -> FilterResult<Cow<'_, str>> {
    urlencoding::decode(raw).map_err(|e| FilterError::malformed(format!("bad percent-encoding in {raw:?}: {e}")))
}
