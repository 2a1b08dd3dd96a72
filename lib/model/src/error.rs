use oxiri::IriParseError;
use thiserror::Error;

/// Errors raised while building or resolving the search model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Relation not found: {0}")]
    RelationNotFound(String),
    #[error("Category IRI cannot be empty")]
    EmptyCategoryIri,
    #[error("Relation IRI cannot be empty")]
    EmptyRelationIri,
    #[error("Unknown disjunct kind: {0}")]
    UnknownDisjunctKind(String),
    #[error("Unknown prefix '{prefix}' in '{name}'")]
    UnknownPrefix { prefix: String, name: String },
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error(transparent)]
    Iri(#[from] IriParseError),
    #[error(transparent)]
    Query(#[from] spargebra::SparqlSyntaxError),
}
