use crate::StoreError;
use async_trait::async_trait;
use semsearch_model::{Query, Tuple};

/// The SPARQL endpoint the facet queries are evaluated against.
#[async_trait]
pub trait TripleStore: Send + Sync {
    /// Evaluates a SELECT query. Returns one tuple per solution, keyed by variable name, without
    /// entries for unbound variables.
    async fn select(&self, query: &Query) -> Result<Vec<Tuple>, StoreError>;
}
