//! Parsing of pattern templates and splicing of patterns into queries.

use crate::QueryError;
use semsearch_model::vocab::hint;
use semsearch_model::{Literal, NamedNode, Prefixes, Query, Variable};
use spargebra::algebra::{Expression, GraphPattern};
use spargebra::term::{GroundTerm, NamedNodePattern, TermPattern, TriplePattern};

/// Parses a pattern template, i.e. the body of a group graph pattern, using `prefixes` for
/// prefixed names.
pub fn parse_pattern(template: &str, prefixes: &Prefixes) -> Result<GraphPattern, QueryError> {
    let query = format!("{}SELECT * WHERE {{ {template} }}", prefixes.sparql_prologue());
    match Query::parse(&query, None) {
        Ok(Query::Select { pattern, .. }) => Ok(where_pattern(pattern)),
        Ok(_) => Err(QueryError::NotASelectQuery),
        Err(source) => Err(QueryError::Template {
            template: template.to_owned(),
            source,
        }),
    }
}

/// Parses a SELECT query. Prefixes declared by the query itself take precedence over `prefixes`.
pub fn parse_select(query: &str, prefixes: &Prefixes) -> Result<Query, QueryError> {
    let query = Query::parse(&format!("{}{query}", prefixes.sparql_prologue()), None)?;
    match query {
        Query::Select { .. } => Ok(query),
        _ => Err(QueryError::NotASelectQuery),
    }
}

/// The first projected variable of a SELECT query.
pub fn projection_variable(query: &Query) -> Result<Variable, QueryError> {
    let Query::Select { pattern, .. } = query else {
        return Err(QueryError::NotASelectQuery);
    };
    let mut pattern = pattern;
    loop {
        pattern = match pattern {
            GraphPattern::Slice { inner, .. }
            | GraphPattern::Distinct { inner }
            | GraphPattern::Reduced { inner }
            | GraphPattern::OrderBy { inner, .. } => inner,
            GraphPattern::Project { variables, .. } => {
                return variables
                    .first()
                    .cloned()
                    .ok_or(QueryError::NoProjectionVariable)
            }
            _ => return Err(QueryError::NoProjectionVariable),
        };
    }
}

/// The root pattern of a SELECT query.
pub fn select_pattern(query: Query) -> Result<GraphPattern, QueryError> {
    match query {
        Query::Select { pattern, .. } => Ok(pattern),
        _ => Err(QueryError::NotASelectQuery),
    }
}

/// Applies `f` to the root pattern of a SELECT query.
pub fn map_select(
    query: Query,
    f: impl FnOnce(GraphPattern) -> GraphPattern,
) -> Result<Query, QueryError> {
    match query {
        Query::Select {
            dataset,
            pattern,
            base_iri,
        } => Ok(Query::Select {
            dataset,
            pattern: f(pattern),
            base_iri,
        }),
        _ => Err(QueryError::NotASelectQuery),
    }
}

/// Strips solution modifiers, projection and grouping and returns the WHERE clause.
pub fn where_pattern(pattern: GraphPattern) -> GraphPattern {
    let mut result = None;
    let _ = map_where(pattern, |inner| {
        let empty = empty_pattern();
        result = Some(inner);
        empty
    });
    result.unwrap_or_else(empty_pattern)
}

/// Applies `f` to the WHERE clause of a root pattern, keeping solution modifiers, projection and
/// grouping around it.
pub fn map_where(
    pattern: GraphPattern,
    f: impl FnOnce(GraphPattern) -> GraphPattern,
) -> GraphPattern {
    match pattern {
        GraphPattern::Slice {
            inner,
            start,
            length,
        } => GraphPattern::Slice {
            inner: Box::new(map_where(*inner, f)),
            start,
            length,
        },
        GraphPattern::Distinct { inner } => GraphPattern::Distinct {
            inner: Box::new(map_where(*inner, f)),
        },
        GraphPattern::Reduced { inner } => GraphPattern::Reduced {
            inner: Box::new(map_where(*inner, f)),
        },
        GraphPattern::OrderBy { inner, expression } => GraphPattern::OrderBy {
            inner: Box::new(map_where(*inner, f)),
            expression,
        },
        GraphPattern::Project { inner, variables } => GraphPattern::Project {
            inner: Box::new(map_where(*inner, f)),
            variables,
        },
        pattern if is_grouped(&pattern) => map_grouped(pattern, f),
        pattern => f(pattern),
    }
}

/// Aggregates sit below `Extend`s for the projected expressions and `Filter`s for `HAVING`.
fn is_grouped(pattern: &GraphPattern) -> bool {
    match pattern {
        GraphPattern::Group { .. } => true,
        GraphPattern::Extend { inner, .. } | GraphPattern::Filter { inner, .. } => {
            is_grouped(inner)
        }
        _ => false,
    }
}

fn map_grouped(
    pattern: GraphPattern,
    f: impl FnOnce(GraphPattern) -> GraphPattern,
) -> GraphPattern {
    match pattern {
        GraphPattern::Group {
            inner,
            variables,
            aggregates,
        } => GraphPattern::Group {
            inner: Box::new(f(*inner)),
            variables,
            aggregates,
        },
        GraphPattern::Extend {
            inner,
            variable,
            expression,
        } => GraphPattern::Extend {
            inner: Box::new(map_grouped(*inner, f)),
            variable,
            expression,
        },
        GraphPattern::Filter { expr, inner } => GraphPattern::Filter {
            expr,
            inner: Box::new(map_grouped(*inner, f)),
        },
        pattern => f(pattern),
    }
}

pub fn empty_pattern() -> GraphPattern {
    GraphPattern::Bgp {
        patterns: Vec::new(),
    }
}

fn is_empty(pattern: &GraphPattern) -> bool {
    matches!(pattern, GraphPattern::Bgp { patterns } if patterns.is_empty())
}

/// Joins two patterns, dropping empty basic graph patterns.
pub fn join(left: GraphPattern, right: GraphPattern) -> GraphPattern {
    if is_empty(&left) {
        right
    } else if is_empty(&right) {
        left
    } else {
        GraphPattern::Join {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Joins all patterns left to right, as if they were written one after another.
pub fn join_all(patterns: impl IntoIterator<Item = GraphPattern>) -> GraphPattern {
    patterns.into_iter().fold(empty_pattern(), join)
}

/// Puts `prefix` at the beginning of the group `pattern` was parsed from.
pub fn prepend(pattern: GraphPattern, prefix: GraphPattern) -> GraphPattern {
    match pattern {
        GraphPattern::Join { left, right } => GraphPattern::Join {
            left: Box::new(prepend(*left, prefix)),
            right,
        },
        GraphPattern::LeftJoin {
            left,
            right,
            expression,
        } => GraphPattern::LeftJoin {
            left: Box::new(prepend(*left, prefix)),
            right,
            expression,
        },
        GraphPattern::Minus { left, right } => GraphPattern::Minus {
            left: Box::new(prepend(*left, prefix)),
            right,
        },
        GraphPattern::Filter { expr, inner } => GraphPattern::Filter {
            expr,
            inner: Box::new(prepend(*inner, prefix)),
        },
        GraphPattern::Extend {
            inner,
            variable,
            expression,
        } => GraphPattern::Extend {
            inner: Box::new(prepend(*inner, prefix)),
            variable,
            expression,
        },
        pattern => join(prefix, pattern),
    }
}

/// Puts `suffix` at the end of the group `pattern` was parsed from. Filters of the group keep
/// applying to the whole group.
pub fn append(pattern: GraphPattern, suffix: GraphPattern) -> GraphPattern {
    match pattern {
        GraphPattern::Filter { expr, inner } => GraphPattern::Filter {
            expr,
            inner: Box::new(append(*inner, suffix)),
        },
        pattern => join(pattern, suffix),
    }
}

/// Replaces the `FILTER(?placeholder)` of a group with `replacement`, placed at the beginning of
/// that group. Returns `None` if no such filter exists.
pub fn replace_placeholder_filter(
    pattern: GraphPattern,
    placeholder: &str,
    replacement: GraphPattern,
) -> Option<GraphPattern> {
    let mut replacement = Some(replacement);
    let result = replace_placeholder(pattern, placeholder, &mut replacement);
    replacement.is_none().then_some(result)
}

fn replace_placeholder(
    pattern: GraphPattern,
    placeholder: &str,
    replacement: &mut Option<GraphPattern>,
) -> GraphPattern {
    if replacement.is_none() {
        return pattern;
    }
    match pattern {
        GraphPattern::Filter { expr, inner } => {
            let mut conditions = Vec::new();
            flatten_and(expr, &mut conditions);
            let before = conditions.len();
            conditions.retain(
                |c| !matches!(c, Expression::Variable(v) if v.as_str() == placeholder),
            );
            let inner = if conditions.len() < before {
                match replacement.take() {
                    Some(replacement) => prepend(*inner, replacement),
                    None => *inner,
                }
            } else {
                replace_placeholder(*inner, placeholder, replacement)
            };
            match conditions.into_iter().reduce(|a, b| Expression::And(Box::new(a), Box::new(b))) {
                Some(expr) => GraphPattern::Filter {
                    expr,
                    inner: Box::new(inner),
                },
                None => inner,
            }
        }
        GraphPattern::Join { left, right } => {
            let left = replace_placeholder(*left, placeholder, replacement);
            let right = replace_placeholder(*right, placeholder, replacement);
            GraphPattern::Join {
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        GraphPattern::LeftJoin {
            left,
            right,
            expression,
        } => {
            let left = replace_placeholder(*left, placeholder, replacement);
            let right = replace_placeholder(*right, placeholder, replacement);
            GraphPattern::LeftJoin {
                left: Box::new(left),
                right: Box::new(right),
                expression,
            }
        }
        GraphPattern::Union { left, right } => {
            let left = replace_placeholder(*left, placeholder, replacement);
            let right = replace_placeholder(*right, placeholder, replacement);
            GraphPattern::Union {
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        GraphPattern::Minus { left, right } => {
            let left = replace_placeholder(*left, placeholder, replacement);
            GraphPattern::Minus {
                left: Box::new(left),
                right,
            }
        }
        GraphPattern::Graph { name, inner } => GraphPattern::Graph {
            name,
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
        },
        GraphPattern::Extend {
            inner,
            variable,
            expression,
        } => GraphPattern::Extend {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
            variable,
            expression,
        },
        GraphPattern::Slice {
            inner,
            start,
            length,
        } => GraphPattern::Slice {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
            start,
            length,
        },
        GraphPattern::Distinct { inner } => GraphPattern::Distinct {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
        },
        GraphPattern::Reduced { inner } => GraphPattern::Reduced {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
        },
        GraphPattern::OrderBy { inner, expression } => GraphPattern::OrderBy {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
            expression,
        },
        GraphPattern::Project { inner, variables } => GraphPattern::Project {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
            variables,
        },
        GraphPattern::Group {
            inner,
            variables,
            aggregates,
        } => GraphPattern::Group {
            inner: Box::new(replace_placeholder(*inner, placeholder, replacement)),
            variables,
            aggregates,
        },
        pattern => pattern,
    }
}

fn flatten_and(expression: Expression, conditions: &mut Vec<Expression>) {
    match expression {
        Expression::And(a, b) => {
            flatten_and(*a, conditions);
            flatten_and(*b, conditions);
        }
        expression => conditions.push(expression),
    }
}

/// `VALUES ?variable { ... }` with one row per value.
pub fn values_pattern(
    variable: Variable,
    values: impl IntoIterator<Item = NamedNode>,
) -> GraphPattern {
    GraphPattern::Values {
        variables: vec![variable],
        bindings: values
            .into_iter()
            .map(|value| vec![Some(GroundTerm::NamedNode(value))])
            .collect(),
    }
}

fn hint_pattern(subject: NamedNode, predicate: NamedNode, object: &str) -> GraphPattern {
    GraphPattern::Bgp {
        patterns: vec![TriplePattern {
            subject: TermPattern::NamedNode(subject),
            predicate: NamedNodePattern::NamedNode(predicate),
            object: TermPattern::Literal(Literal::new_simple_literal(object)),
        }],
    }
}

/// `hint:Query hint:optimizer "None"`: disables Blazegraph's join reordering for the query.
pub fn blazegraph_no_optimize_pattern() -> GraphPattern {
    hint_pattern(hint::QUERY.into_owned(), hint::OPTIMIZER.into_owned(), "None")
}

/// `hint:Prior hint:runFirst "true"`: makes Blazegraph evaluate the preceding pattern first.
pub fn blazegraph_run_first_pattern() -> GraphPattern {
    hint_pattern(hint::PRIOR.into_owned(), hint::RUN_FIRST.into_owned(), "true")
}
