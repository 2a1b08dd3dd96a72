use semsearch_model::ModelError;
use spargebra::SparqlSyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    #[error("Invalid query pattern template '{template}': {source}")]
    Template {
        template: String,
        #[source]
        source: SparqlSyntaxError,
    },
    #[error(transparent)]
    Syntax(#[from] SparqlSyntaxError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("Expected a SELECT query")]
    NotASelectQuery,
    #[error("The query does not project any variable")]
    NoProjectionVariable,
    #[error("No text pattern is configured for category {0}")]
    MissingTextPattern(String),
    #[error("Date is out of the supported range: {0}")]
    DateOutOfRange(String),
}
