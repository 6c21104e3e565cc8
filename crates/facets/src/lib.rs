//! Faceted filter engine for the safety-equipment catalog.
//!
//! Given a catalog snapshot, a category and the visitor's facet selection, the
//! engine computes the visible products, the option inventory of every facet
//! (leave-one-out, with counts) and per-facet selection counts. Desktop and
//! mobile renderers share one [`FilterStore`]; all computation is synchronous
//! and side-effect free apart from logging.

pub mod config;
pub mod error;
pub mod extractor;
pub mod predicate;
pub mod projector;
pub mod query;
pub mod schema;
pub mod selection;
pub mod session;
pub mod store;
pub mod value;

pub use config::EngineConfig;
pub use error::{FilterError, FilterResult};
pub use extractor::{FacetOption, FacetOptionSet, FacetOptions, FlagPresence, extract_options};
pub use predicate::{facet_matches, matches, validate_product, validate_selection};
pub use projector::{Projection, Projector, RejectedProduct, project};
pub use query::{decode_selection, encode_selection};
pub use schema::{FacetDefinition, FacetKind, FacetSchema, FacetWidget, schema_for};
pub use selection::{FacetChoice, FacetSelection};
pub use session::FilterSession;
pub use store::{FilterCommand, FilterEvent, FilterStore, Surface, SurfaceHandle};
pub use value::{BinaryFlagView, FacetValue, TriState};
