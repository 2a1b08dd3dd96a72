use crate::FacetValueKind;
use semsearch_model::ModelError;
use semsearch_query::QueryError;
use std::error::Error;
use thiserror::Error;

/// Errors of the triple store seam.
pub type StoreError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FacetError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Triple store query failed: {0}")]
    Store(#[source] StoreError),
    #[error("Cannot set a {actual} value on a {expected} relation")]
    ValueKindMismatch {
        expected: FacetValueKind,
        actual: FacetValueKind,
    },
    #[error("Facet recomputation was aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}
