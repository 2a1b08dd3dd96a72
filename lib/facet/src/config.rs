use semsearch_model::vocab::search;
use semsearch_model::{NamedNodeRef, Prefixes};
use semsearch_query::find_by_iri;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Counts the results of the base query per range category.
pub const DEFAULT_CATEGORIES_QUERY: &str = "SELECT ?__range__ (COUNT(DISTINCT ?subject) AS ?count) WHERE {
  ?subject ?__relation__ ?__value__ .
  ?__value__ a ?__range__ .
} GROUP BY ?__range__";

/// Counts the results of the base query per relation.
pub const DEFAULT_RELATIONS_QUERY: &str = "SELECT ?__relation__ (COUNT(DISTINCT ?subject) AS ?count) WHERE {
  ?subject ?__relation__ ?__value__ .
} GROUP BY ?__relation__";

/// Resource values of a relation with their labels, most frequent first.
pub const DEFAULT_RESOURCE_VALUES_QUERY: &str = "SELECT DISTINCT ?value ?label (COUNT(DISTINCT ?subject) AS ?count) WHERE {
  FILTER(?__relationPattern__)
  OPTIONAL { ?value <http://www.w3.org/2000/01/rdf-schema#label> ?label . }
} GROUP BY ?value ?label ORDER BY DESC(?count)";

/// Literal values of a relation, most frequent first.
pub const DEFAULT_LITERAL_VALUES_QUERY: &str = "SELECT DISTINCT ?literal (COUNT(DISTINCT ?subject) AS ?count) WHERE {
  FILTER(?__relationPattern__)
} GROUP BY ?literal ORDER BY DESC(?count)";

/// Relation pattern for resource values if the search configuration has none.
pub fn default_resource_relation_pattern() -> String {
    format!(
        "?{} ?{} ?{} .",
        search::SUBJECT,
        search::RELATION,
        search::VALUE
    )
}

/// Relation pattern for literal values if the search configuration has none.
pub fn default_literal_relation_pattern() -> String {
    format!(
        "?{} ?{} ?{} .",
        search::SUBJECT,
        search::RELATION,
        search::LITERAL
    )
}

/// Queries and templates of the facet panel.
///
/// Value query maps are keyed by relation or category IRI in any of the forms accepted by
/// [`find_by_iri`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacetConfig {
    pub categories: FacetQueryConfig,
    pub relations: FacetQueryConfig,
    pub default_value_template: ValueTemplates,
    pub value_categories: BTreeMap<String, FacetValuePattern>,
    pub value_relations: BTreeMap<String, FacetValuePattern>,
    pub default_value_queries: DefaultValueQueries,
}

impl FacetConfig {
    pub fn categories_query(&self) -> &str {
        self.categories
            .query
            .as_deref()
            .unwrap_or(DEFAULT_CATEGORIES_QUERY)
    }

    pub fn relations_query(&self) -> &str {
        self.relations
            .query
            .as_deref()
            .unwrap_or(DEFAULT_RELATIONS_QUERY)
    }

    /// Template for generated resource values queries.
    pub fn resource_values_query(&self) -> &str {
        self.default_value_queries
            .resource
            .as_deref()
            .unwrap_or(DEFAULT_RESOURCE_VALUES_QUERY)
    }

    /// Template for generated literal values queries.
    pub fn literal_values_query(&self) -> &str {
        self.default_value_queries
            .literal
            .as_deref()
            .unwrap_or(DEFAULT_LITERAL_VALUES_QUERY)
    }

    pub fn value_relation(
        &self,
        prefixes: &Prefixes,
        relation: NamedNodeRef<'_>,
    ) -> Option<&FacetValuePattern> {
        find_by_iri(&self.value_relations, prefixes, relation)
    }

    pub fn value_category(
        &self,
        prefixes: &Prefixes,
        category: NamedNodeRef<'_>,
    ) -> Option<&FacetValuePattern> {
        find_by_iri(&self.value_categories, prefixes, category)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacetQueryConfig {
    /// Uses `?subject` for the base query results. Falls back to a built-in query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuple_template: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueTemplates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultValueQueries {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

/// A query returning the values of a relation.
///
/// The query binds `?value` and `?label` for resources, `?literal` for literals,
/// `?dateBegin` and `?dateEnd` for date ranges and `?numericRangeBegin` and
/// `?numericRangeEnd` (or `?literal`) for numeric ranges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetValuePattern {
    pub kind: FacetValueKind,
    pub values_query: String,
}

/// How the values of a facet relation are presented and selected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacetValueKind {
    #[default]
    Resource,
    Literal,
    DateRange,
    NumericRange,
}

impl FacetValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FacetValueKind::Resource => "resource",
            FacetValueKind::Literal => "literal",
            FacetValueKind::DateRange => "date-range",
            FacetValueKind::NumericRange => "numeric-range",
        }
    }
}

impl fmt::Display for FacetValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semsearch_model::NamedNode;

    #[test]
    fn partial_config_keeps_defaults() -> Result<(), serde_json::Error> {
        let config: FacetConfig = serde_json::from_str(
            r#"{
                "categories": {"tupleTemplate": "{{label}}"},
                "defaultValueQueries": {"literal": "SELECT ?literal WHERE { FILTER(?__relationPattern__) }"},
                "valueRelations": {
                    "ex:created": {"kind": "date-range", "valuesQuery": "SELECT ?dateBegin ?dateEnd WHERE {}"}
                }
            }"#,
        )?;
        assert_eq!(config.categories_query(), DEFAULT_CATEGORIES_QUERY);
        assert_eq!(config.categories.tuple_template.as_deref(), Some("{{label}}"));
        assert_eq!(config.relations_query(), DEFAULT_RELATIONS_QUERY);
        assert_eq!(config.resource_values_query(), DEFAULT_RESOURCE_VALUES_QUERY);
        assert!(config.literal_values_query().starts_with("SELECT ?literal"));

        let prefixes = Prefixes::empty().with("ex", "http://example.com/");
        let created = NamedNode::new_unchecked("http://example.com/created");
        let pattern = config.value_relation(&prefixes, created.as_ref());
        assert_eq!(pattern.map(|p| p.kind), Some(FacetValueKind::DateRange));
        Ok(())
    }
}
