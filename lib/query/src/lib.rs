//! This crate turns semantic searches into SPARQL.
//!
//! # Pattern Templates
//!
//! A [`SearchConfig`] maps categories and relations to SPARQL pattern templates. Templates are
//! written against a fixed set of placeholder variables (see [`semsearch_model::vocab::search`]):
//! `?subject` stands for whatever the caller projects, `?__value__` for the selected resource, and
//! so on. The resolver picks a template for a constraint, and the compiler parses it, binds the
//! placeholders and gives all remaining variables fresh names.
//!
//! ```text
//! Conjunct -> Template (resolver) -> Graph Pattern (spargebra) -> Bound & Randomized Pattern
//! ```
//!
//! # Splicing
//!
//! Compiled patterns are joined into the WHERE clause of a base query with the helpers of the
//! [`pattern`] module. The results are `spargebra` queries that serialize to SPARQL via
//! [`Display`](std::fmt::Display).

mod compiler;
mod config;
mod error;
pub mod pattern;
mod resolver;
pub mod rewrite;

pub use compiler::*;
pub use config::*;
pub use error::*;
pub use resolver::*;
