//! Chooses the configured pattern template that expresses a constraint.

use crate::compiler::ConjunctRef;
use crate::config::{PatternConfig, PatternKind, SearchConfig};
use crate::QueryError;
use semsearch_model::vocab::{ldp, platform, search};
use semsearch_model::{Category, DisjunctKind, Relation};

/// Used when nothing is configured for a relation or its range.
pub fn default_query_pattern() -> String {
    format!(
        "?{} ?{} ?{} .",
        search::SUBJECT,
        search::RELATION,
        search::VALUE
    )
}

/// Membership of `?__value__` in the set `?__set__`.
pub fn default_set_query_pattern() -> String {
    format!(
        "?{} {}/{} ?{} .",
        search::SET,
        ldp::CONTAINS,
        platform::SET_ITEM,
        search::VALUE
    )
}

/// Patterns configured for `relation`: the relation's own patterns if any, else those of `range`,
/// else none.
pub fn try_get_relation_patterns<'a>(
    config: &'a SearchConfig,
    relation: &Relation,
    range: &Category,
) -> &'a [PatternConfig] {
    config
        .relation_patterns(relation.iri.as_ref())
        .or_else(|| config.category_patterns(range.iri.as_ref()))
        .unwrap_or_default()
}

pub(crate) fn find_pattern(patterns: &[PatternConfig], kind: PatternKind) -> Option<&PatternConfig> {
    patterns.iter().find(|pattern| pattern.kind() == kind)
}

fn find_template(patterns: &[PatternConfig], kind: PatternKind) -> Option<&str> {
    find_pattern(patterns, kind).and_then(PatternConfig::query_pattern)
}

/// The set pattern has to come first so that Blazegraph, which is told not to reorder joins,
/// starts from the small set instead of the whole relation.
fn apply_set_pattern(relation_pattern: &str, set_pattern: &str) -> String {
    format!("{set_pattern}\n{relation_pattern}")
}

/// The text pattern configured for a category.
pub fn text_pattern<'a>(
    config: &'a SearchConfig,
    category: &Category,
) -> Result<(&'a str, bool), QueryError> {
    match config
        .category_patterns(category.iri.as_ref())
        .and_then(|patterns| find_pattern(patterns, PatternKind::Text))
    {
        Some(PatternConfig::Text {
            query_pattern,
            escape_lucene_syntax,
        }) => Ok((query_pattern, *escape_lucene_syntax)),
        _ => Err(QueryError::MissingTextPattern(category.iri.to_string())),
    }
}

/// Selects the template that expresses a disjunct of kind `kind` within `conjunct`.
pub fn matching_pattern(
    config: &SearchConfig,
    conjunct: ConjunctRef<'_>,
    kind: DisjunctKind,
) -> Result<String, QueryError> {
    let conjunct = match conjunct {
        ConjunctRef::Relation(conjunct) => conjunct,
        ConjunctRef::Text(conjunct) => {
            return text_pattern(config, &conjunct.range).map(|(pattern, _)| pattern.to_owned())
        }
    };
    let patterns = try_get_relation_patterns(config, &conjunct.relation, &conjunct.range);
    let is_set = kind == DisjunctKind::Set;
    if patterns.is_empty() {
        return Ok(if is_set {
            apply_set_pattern(&default_query_pattern(), &default_set_query_pattern())
        } else {
            default_query_pattern()
        });
    }

    if kind.is_temporal() {
        if let Some(pattern) = find_template(patterns, PatternKind::DateRange) {
            return Ok(pattern.to_owned());
        }
        tracing::warn!(
            relation = %conjunct.relation.iri,
            "No date-range pattern configured for a temporal value, using the default pattern"
        );
        return Ok(default_query_pattern());
    }

    if kind.is_spatial() {
        let place = find_pattern(patterns, PatternKind::Place).and_then(|pattern| match pattern {
            PatternConfig::Place {
                distance_query_pattern,
                bounding_box_query_pattern,
            } => Some(if kind == DisjunctKind::Distance {
                distance_query_pattern
            } else {
                bounding_box_query_pattern
            }),
            _ => None,
        });
        if let Some(pattern) = place {
            return Ok(pattern.clone());
        }
        tracing::warn!(
            relation = %conjunct.relation.iri,
            "No place pattern configured for a spatial value, using the default pattern"
        );
        return Ok(default_query_pattern());
    }

    let hierarchy = find_template(patterns, PatternKind::Hierarchy);
    let resource = find_template(patterns, PatternKind::Resource);
    if is_set {
        let set = find_template(patterns, PatternKind::Set)
            .map_or_else(default_set_query_pattern, str::to_owned);
        return Ok(match hierarchy.or(resource) {
            Some(pattern) => apply_set_pattern(pattern, &set),
            None => apply_set_pattern(&default_query_pattern(), &default_set_query_pattern()),
        });
    }

    Ok(hierarchy
        .or(resource)
        .or_else(|| find_template(patterns, PatternKind::Literal))
        .or_else(|| find_template(patterns, PatternKind::NumericRange))
        .map_or_else(default_query_pattern, str::to_owned))
}
