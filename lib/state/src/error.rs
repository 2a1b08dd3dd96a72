use semsearch_model::{DisjunctKind, IriParseError, ModelError};
use thiserror::Error;

/// Errors raised while persisting or restoring a search state.
///
/// The messages of the shape errors are shown to users when a shared search link cannot be
/// restored.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Invalid serialized conjunct")]
    InvalidConjunct,
    #[error("Invalid disjuncts for serialized relation conjunct")]
    InvalidRelationDisjuncts,
    #[error("Invalid disjuncts for serialized text conjunct")]
    InvalidTextDisjuncts,
    #[error("Invalid serialized relation disjunct")]
    InvalidRelationDisjunct,
    #[error("Invalid serialized text disjunct")]
    InvalidTextDisjunct,
    #[error("Unexpected conjunct kind for facet: {0}")]
    UnexpectedFacetConjunct(&'static str),
    #[error("Invalid value for {kind} disjunct: {source}")]
    InvalidDisjunctValue {
        kind: DisjunctKind,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON key should not include \"/\" char: {0}")]
    InvalidJsonKey(String),
    #[error("JSON key cannot be used in an IRI: {key}")]
    UnsupportedJsonKey {
        key: String,
        #[source]
        source: IriParseError,
    },
    #[error("Invalid JSON graph: {0}")]
    InvalidGraph(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Invalid state token: {0}")]
    Token(#[from] base64::DecodeError),
    #[error("Cannot decompress state token: {0}")]
    Compression(#[from] std::io::Error),
}
