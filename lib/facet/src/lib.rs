//! Faceted navigation over the results of a base query.
//!
//! A [`FacetStore`] owns the facet constraints of one search session. Opening a category lists
//! the relations into it, opening a relation lists its values, and selecting values adds
//! relation conjuncts to the facet AST. After every action the store recomputes the
//! [`FacetData`] snapshot by querying a [`TripleStore`] with the queries built by
//! [`FacetQueries`].

mod config;
mod data;
mod error;
mod queries;
mod store;
mod triple_store;
mod value;

pub use config::*;
pub use data::*;
pub use error::*;
pub use queries::*;
pub use store::*;
pub use triple_store::*;
pub use value::*;
