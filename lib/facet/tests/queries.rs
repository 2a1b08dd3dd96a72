use semsearch_facet::{FacetConfig, FacetQueries, FacetValueKind};
use semsearch_model::{Category, NamedNode, Query, Relation, SearchProfileStore};
use semsearch_query::SearchConfig;
use std::error::Error;
use std::sync::Arc;

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

fn category(name: &str) -> Category {
    Category::new(iri(name), name)
}

fn relation(name: &str, range: &str) -> Relation {
    Relation::new(iri(name), name, category("Painting"), category(range))
}

fn queries(facet_config: FacetConfig) -> Result<FacetQueries, Box<dyn Error>> {
    let search_config: SearchConfig = serde_json::from_str(
        r#"{
            "optimizer": "default",
            "prefixes": {"ex": "http://example.com/"},
            "categories": {
                "ex:Label": [{"kind": "literal", "queryPattern": "?subject ?__relation__ ?__literal__ ."}]
            },
            "relations": {
                "ex:title": [
                    {"kind": "date-range", "queryPattern": "?subject ex:titleDate ?date ."},
                    {"kind": "literal", "queryPattern": "?subject ex:title ?__literal__ ."}
                ],
                "ex:keyword": [
                    {"kind": "resource", "queryPattern": "?subject ex:keyword ?__value__ ."},
                    {"kind": "literal", "queryPattern": "?subject ex:keywordText ?__literal__ ."}
                ]
            }
        }"#,
    )?;
    Ok(FacetQueries::new(
        category("Painting"),
        Query::parse(
            "SELECT ?painting WHERE { ?painting a <http://example.com/Painting> }",
            None,
        )?,
        facet_config,
        search_config,
        Arc::new(SearchProfileStore::default()),
    )?)
}

#[test]
fn literal_values_query_is_generated_from_the_relation_pattern() -> Result<(), Box<dyn Error>> {
    let queries = queries(FacetConfig::default())?;
    let title = relation("title", "Label");
    assert_eq!(queries.value_kind(&title), FacetValueKind::Literal);

    let values = queries.value_pattern(&title)?;
    assert_eq!(values.kind, FacetValueKind::Literal);
    let text = values.query.to_string();
    assert!(text.contains("?subject <http://example.com/title> ?literal"), "{text}");
    assert!(!text.contains("__relationPattern__"), "{text}");
    assert!(!text.contains("__literal__"), "{text}");
    Ok(())
}

#[test]
fn ambiguous_patterns_are_chosen_by_kind_name() -> Result<(), Box<dyn Error>> {
    let queries = queries(FacetConfig::default())?;
    let keyword = relation("keyword", "Concept");
    assert_eq!(queries.value_kind(&keyword), FacetValueKind::Literal);
    let text = queries.value_pattern(&keyword)?.query.to_string();
    assert!(text.contains("<http://example.com/keywordText>"), "{text}");
    Ok(())
}

#[test]
fn range_patterns_are_used_without_relation_patterns() -> Result<(), Box<dyn Error>> {
    let queries = queries(FacetConfig::default())?;
    let caption = relation("caption", "Label");
    assert_eq!(queries.value_kind(&caption), FacetValueKind::Literal);
    let unconfigured = relation("creator", "Person");
    assert_eq!(queries.value_kind(&unconfigured), FacetValueKind::Resource);
    Ok(())
}

#[test]
fn values_query_uses_the_base_projection() -> Result<(), Box<dyn Error>> {
    let queries = queries(FacetConfig::default())?;
    let creator = relation("creator", "Person");
    let values = queries.values_query(&Default::default(), &creator)?;
    let text = Query::parse(&values.query.to_string(), None)?.to_string();
    assert!(text.contains("?painting <http://example.com/creator> ?value"), "{text}");
    assert!(text.contains("COUNT(DISTINCT ?painting)"), "{text}");
    assert!(!text.contains("?subject"), "{text}");
    Ok(())
}

#[test]
fn configured_category_values_query_wins() -> Result<(), Box<dyn Error>> {
    let facet_config: FacetConfig = serde_json::from_str(
        r#"{"valueCategories": {"http://example.com/Label": {
            "kind": "numeric-range",
            "valuesQuery": "SELECT (MIN(?n) AS ?numericRangeBegin) (MAX(?n) AS ?numericRangeEnd) WHERE { ?subject ?__relation__ ?n }"
        }}}"#,
    )?;
    let queries = queries(facet_config)?;
    let title = relation("title", "Label");
    assert_eq!(queries.value_kind(&title), FacetValueKind::NumericRange);
    let values = queries.values_query(&Default::default(), &title)?;
    let text = values.query.to_string();
    assert!(text.contains("?painting <http://example.com/title> ?n"), "{text}");
    Ok(())
}
