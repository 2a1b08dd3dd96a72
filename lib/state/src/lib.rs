//! Persistence of semantic search states.
//!
//! A session state (the search, the facet selection, and the per-component result state) is
//! serialized into a stable JSON shape with compacted IRIs, packed, deflated, and encoded into a
//! URL-safe token. Restoring resolves every reference against a [`semsearch_model::SearchProfileStore`].
//!
//! The crate also contains the codec that stores arbitrary JSON documents as RDF graphs.

mod error;
mod json_graph;
mod pack;
mod serialized;
mod serializer;
mod token;

pub use error::*;
pub use json_graph::*;
pub use pack::*;
pub use serialized::*;
pub use serializer::*;
pub use token::*;
