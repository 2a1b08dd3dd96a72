use semsearch_model::{NamedNodeRef, Prefixes};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Query patterns and global options of a semantic search.
///
/// Pattern lists are keyed by category or relation IRI, written either in full or with one of
/// the configured prefixes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    pub categories: BTreeMap<String, Vec<PatternConfig>>,
    pub relations: BTreeMap<String, Vec<PatternConfig>>,
    #[serde(deserialize_with = "with_default_prefixes")]
    pub prefixes: Prefixes,
    pub optimizer: Optimizer,
    pub limit: usize,
    /// How the search form presents its selectors. The compiler does not read it; it is kept so
    /// that existing configurations load unchanged.
    pub selector_mode: SelectorMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            relations: BTreeMap::new(),
            prefixes: Prefixes::default(),
            optimizer: Optimizer::default(),
            limit: 1000,
            selector_mode: SelectorMode::default(),
        }
    }
}

impl SearchConfig {
    pub fn category_patterns(&self, iri: NamedNodeRef<'_>) -> Option<&[PatternConfig]> {
        find_by_iri(&self.categories, &self.prefixes, iri).map(Vec::as_slice)
    }

    pub fn relation_patterns(&self, iri: NamedNodeRef<'_>) -> Option<&[PatternConfig]> {
        find_by_iri(&self.relations, &self.prefixes, iri).map(Vec::as_slice)
    }
}

/// Looks up an entry of a configuration map whose keys are IRIs, written in full, as a prefixed
/// name or as an IRI reference.
pub fn find_by_iri<'a, T>(
    entries: &'a BTreeMap<String, T>,
    prefixes: &Prefixes,
    iri: NamedNodeRef<'_>,
) -> Option<&'a T> {
    entries
        .get(iri.as_str())
        .or_else(|| entries.get(&prefixes.compact(iri)))
        .or_else(|| entries.get(&format!("<{}>", iri.as_str())))
}

fn with_default_prefixes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Prefixes, D::Error> {
    let mut prefixes = Prefixes::default();
    prefixes.extend(&Prefixes::deserialize(deserializer)?);
    Ok(prefixes)
}

/// Query engine specific optimisations applied to generated queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimizer {
    /// Leave query planning to the triple store.
    Default,
    /// Emit Blazegraph query hints that keep the base query first.
    #[default]
    Blazegraph,
}

/// How facet relations are presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorMode {
    #[default]
    Stack,
    Dropdown,
}

/// One way of expressing a constraint in SPARQL, authored as a query pattern template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PatternConfig {
    #[serde(rename_all = "camelCase")]
    Resource { query_pattern: String },
    #[serde(rename_all = "camelCase")]
    Hierarchy { query_pattern: String },
    #[serde(rename_all = "camelCase")]
    Set { query_pattern: String },
    #[serde(rename_all = "camelCase")]
    Literal { query_pattern: String },
    #[serde(rename_all = "camelCase")]
    DateRange { query_pattern: String },
    #[serde(rename_all = "camelCase")]
    NumericRange { query_pattern: String },
    #[serde(rename_all = "camelCase")]
    Text {
        query_pattern: String,
        #[serde(default = "escape_lucene_syntax_default")]
        escape_lucene_syntax: bool,
    },
    #[serde(rename_all = "camelCase")]
    Place {
        distance_query_pattern: String,
        bounding_box_query_pattern: String,
    },
}

fn escape_lucene_syntax_default() -> bool {
    true
}

impl PatternConfig {
    pub fn kind(&self) -> PatternKind {
        match self {
            PatternConfig::Resource { .. } => PatternKind::Resource,
            PatternConfig::Hierarchy { .. } => PatternKind::Hierarchy,
            PatternConfig::Set { .. } => PatternKind::Set,
            PatternConfig::Literal { .. } => PatternKind::Literal,
            PatternConfig::DateRange { .. } => PatternKind::DateRange,
            PatternConfig::NumericRange { .. } => PatternKind::NumericRange,
            PatternConfig::Text { .. } => PatternKind::Text,
            PatternConfig::Place { .. } => PatternKind::Place,
        }
    }

    /// The template of single-pattern kinds. `Place` has two templates and returns `None`.
    pub fn query_pattern(&self) -> Option<&str> {
        match self {
            PatternConfig::Resource { query_pattern }
            | PatternConfig::Hierarchy { query_pattern }
            | PatternConfig::Set { query_pattern }
            | PatternConfig::Literal { query_pattern }
            | PatternConfig::DateRange { query_pattern }
            | PatternConfig::NumericRange { query_pattern }
            | PatternConfig::Text { query_pattern, .. } => Some(query_pattern),
            PatternConfig::Place { .. } => None,
        }
    }
}

/// The kind tag of a [`PatternConfig`]. Ordered by tag name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Resource,
    Hierarchy,
    Set,
    Literal,
    DateRange,
    NumericRange,
    Text,
    Place,
}

impl PatternKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Resource => "resource",
            PatternKind::Hierarchy => "hierarchy",
            PatternKind::Set => "set",
            PatternKind::Literal => "literal",
            PatternKind::DateRange => "date-range",
            PatternKind::NumericRange => "numeric-range",
            PatternKind::Text => "text",
            PatternKind::Place => "place",
        }
    }
}

impl PartialOrd for PatternKind {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PatternKind {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
