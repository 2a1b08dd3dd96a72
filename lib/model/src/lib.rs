mod error;
mod numeric;
mod prefixes;
mod profile;
mod search;
pub mod serde_term;
mod value;
pub mod vocab;

pub use error::*;
pub use numeric::*;
pub use prefixes::*;
pub use profile::*;
pub use search::*;
pub use value::*;

// Re-export some oxrdf types.
pub use oxiri::Iri;
pub use oxrdf::{
    BlankNode, BlankNodeRef, Graph, IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef,
    Subject, SubjectRef, Term, TermRef, Triple, TripleRef, Variable, VariableRef,
};
pub use spargebra::Query;

/// Additional columns of a category, relation, or resource, keyed by the variable name that
/// produced them.
pub type Tuple = std::collections::BTreeMap<String, Term>;
