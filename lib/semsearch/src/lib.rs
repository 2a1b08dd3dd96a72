//! Faceted semantic search over SPARQL endpoints.
//!
//! This crate bundles the search model, the query compiler, the facet store and the state
//! persistence, and adds the [`SearchSession`](session::SearchSession) that ties them together
//! for one user-facing search.

pub mod error;
pub mod history;
pub mod session;

pub mod model {
    pub use semsearch_model::*;
}

pub mod query {
    pub use semsearch_query::*;
}

pub mod facet {
    pub use semsearch_facet::*;
}

pub mod state {
    pub use semsearch_state::*;
}
