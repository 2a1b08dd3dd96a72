//! Variable rewriting over the SPARQL algebra.
//!
//! Every function in this module takes its input by value and returns a new pattern, so callers
//! that want to keep the original clone it first.

use semsearch_model::vocab::search;
use semsearch_model::{Literal, Term, Variable};
use spargebra::algebra::{AggregateExpression, Expression, GraphPattern, OrderExpression};
use spargebra::term::{GroundTerm, NamedNodePattern, TermPattern, TriplePattern};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Values substituted for variables, keyed by variable name.
pub type Parameters = BTreeMap<String, Term>;

/// Decides what a variable is replaced with.
pub trait VariableMapper {
    /// Returns the replacement for `variable`, or `None` to keep it unchanged.
    fn map_variable(&mut self, variable: &Variable) -> Option<TermPattern>;
}

/// Applies `mapper` to every variable of `pattern`.
///
/// Variables that are replaced by a constant keep their meaning where SPARQL only allows a
/// variable: a projected variable is re-bound with `BIND`, a `BIND` target turns into a
/// `FILTER(sameTerm(...))`, a `VALUES` column is dropped together with the rows that disagree and
/// a `GROUP BY` key is removed.
pub fn rewrite_variables(pattern: GraphPattern, mapper: &mut impl VariableMapper) -> GraphPattern {
    PatternVariableRewriter { mapper }.rewrite_graph_pattern(pattern)
}

/// Renames every variable except `subject` to a fresh name. Repeated occurrences of a variable
/// get the same fresh name. `subject` is kept, or replaced by `rewrite_subject` if given.
pub fn randomize_variables(
    pattern: GraphPattern,
    subject: &Variable,
    rewrite_subject: Option<&Variable>,
) -> GraphPattern {
    rewrite_variables(pattern, &mut Randomizer::new(subject, rewrite_subject))
}

/// Replaces the `?subject` alias used in configured patterns with the real projection variable.
pub fn rewrite_projection_variable(pattern: GraphPattern, projection: &Variable) -> GraphPattern {
    rename_variable(pattern, search::SUBJECT, projection)
}

/// Replaces every occurrence of the variable named `from` with `to`.
pub fn rename_variable(pattern: GraphPattern, from: &str, to: &Variable) -> GraphPattern {
    rewrite_variables(
        pattern,
        &mut |variable: &Variable| {
            (variable.as_str() == from).then(|| TermPattern::Variable(to.clone()))
        },
    )
}

/// Substitutes the given values for the variables they are keyed by.
pub fn bind_variables(pattern: GraphPattern, parameters: &Parameters) -> GraphPattern {
    rewrite_variables(
        pattern,
        &mut |variable: &Variable| parameters.get(variable.as_str()).map(term_pattern),
    )
}

impl<F: FnMut(&Variable) -> Option<TermPattern>> VariableMapper for F {
    fn map_variable(&mut self, variable: &Variable) -> Option<TermPattern> {
        self(variable)
    }
}

/// Gives every variable but the subject a collision-free name.
#[derive(Debug)]
pub struct Randomizer {
    subject: Variable,
    rewrite_subject: Option<Variable>,
    renamed: HashMap<Variable, Variable>,
}

impl Randomizer {
    pub fn new(subject: &Variable, rewrite_subject: Option<&Variable>) -> Self {
        Self {
            subject: subject.clone(),
            rewrite_subject: rewrite_subject.cloned(),
            renamed: HashMap::new(),
        }
    }
}

impl VariableMapper for Randomizer {
    fn map_variable(&mut self, variable: &Variable) -> Option<TermPattern> {
        if *variable == self.subject {
            return self.rewrite_subject.clone().map(TermPattern::Variable);
        }
        let renamed = self
            .renamed
            .entry(variable.clone())
            .or_insert_with(|| fresh_variable(variable));
        Some(TermPattern::Variable(renamed.clone()))
    }
}

fn fresh_variable(variable: &Variable) -> Variable {
    let suffix = Uuid::new_v4().to_string().replace('-', "_");
    Variable::new_unchecked(format!("{}_{suffix}", variable.as_str()))
}

pub(crate) fn term_pattern(term: &Term) -> TermPattern {
    match term {
        Term::NamedNode(node) => TermPattern::NamedNode(node.clone()),
        Term::BlankNode(node) => TermPattern::BlankNode(node.clone()),
        Term::Literal(literal) => TermPattern::Literal(literal.clone()),
    }
}

fn constant_expression(term: &TermPattern) -> Option<Expression> {
    match term {
        TermPattern::NamedNode(node) => Some(Expression::NamedNode(node.clone())),
        TermPattern::Literal(literal) => Some(Expression::Literal(literal.clone())),
        _ => None,
    }
}

fn ground_term(term: &TermPattern) -> Option<GroundTerm> {
    match term {
        TermPattern::NamedNode(node) => Some(GroundTerm::NamedNode(node.clone())),
        TermPattern::Literal(literal) => Some(GroundTerm::Literal(literal.clone())),
        _ => None,
    }
}

/// How a variable in a variable-only position is affected by the mapper.
enum Slot {
    Keep(Variable),
    Constant(Variable, Expression),
}

struct PatternVariableRewriter<'a, M: ?Sized> {
    mapper: &'a mut M,
}

impl<M: VariableMapper + ?Sized> PatternVariableRewriter<'_, M> {
    fn rewrite_graph_pattern(&mut self, pattern: GraphPattern) -> GraphPattern {
        match pattern {
            GraphPattern::Bgp { patterns } => GraphPattern::Bgp {
                patterns: patterns
                    .into_iter()
                    .map(|p| self.rewrite_triple_pattern(p))
                    .collect(),
            },
            GraphPattern::Path {
                subject,
                path,
                object,
            } => GraphPattern::Path {
                subject: self.rewrite_term_pattern(subject),
                path,
                object: self.rewrite_term_pattern(object),
            },
            GraphPattern::Join { left, right } => GraphPattern::Join {
                left: self.rewrite_boxed(*left),
                right: self.rewrite_boxed(*right),
            },
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => GraphPattern::LeftJoin {
                left: self.rewrite_boxed(*left),
                right: self.rewrite_boxed(*right),
                expression: expression.map(|e| self.rewrite_expression(e)),
            },
            GraphPattern::Filter { expr, inner } => GraphPattern::Filter {
                expr: self.rewrite_expression(expr),
                inner: self.rewrite_boxed(*inner),
            },
            GraphPattern::Union { left, right } => GraphPattern::Union {
                left: self.rewrite_boxed(*left),
                right: self.rewrite_boxed(*right),
            },
            GraphPattern::Graph { name, inner } => GraphPattern::Graph {
                name: self.rewrite_named_node_pattern(name),
                inner: self.rewrite_boxed(*inner),
            },
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let inner = self.rewrite_boxed(*inner);
                let expression = self.rewrite_expression(expression);
                match self.slot(variable) {
                    Slot::Keep(variable) => GraphPattern::Extend {
                        inner,
                        variable,
                        expression,
                    },
                    Slot::Constant(_, constant) => GraphPattern::Filter {
                        expr: Expression::SameTerm(Box::new(expression), Box::new(constant)),
                        inner,
                    },
                }
            }
            GraphPattern::Minus { left, right } => GraphPattern::Minus {
                left: self.rewrite_boxed(*left),
                right: self.rewrite_boxed(*right),
            },
            GraphPattern::Values {
                variables,
                bindings,
            } => self.rewrite_values(variables, bindings),
            GraphPattern::OrderBy { inner, expression } => GraphPattern::OrderBy {
                inner: self.rewrite_boxed(*inner),
                expression: expression
                    .into_iter()
                    .map(|e| match e {
                        OrderExpression::Asc(e) => OrderExpression::Asc(self.rewrite_expression(e)),
                        OrderExpression::Desc(e) => {
                            OrderExpression::Desc(self.rewrite_expression(e))
                        }
                    })
                    .collect(),
            },
            GraphPattern::Project { inner, variables } => {
                let mut inner = self.rewrite_graph_pattern(*inner);
                let mut projected = Vec::with_capacity(variables.len());
                for variable in variables {
                    match self.slot(variable) {
                        Slot::Keep(variable) => projected.push(variable),
                        Slot::Constant(variable, constant) => {
                            inner = GraphPattern::Extend {
                                inner: Box::new(inner),
                                variable: variable.clone(),
                                expression: constant,
                            };
                            projected.push(variable);
                        }
                    }
                }
                GraphPattern::Project {
                    inner: Box::new(inner),
                    variables: projected,
                }
            }
            GraphPattern::Distinct { inner } => GraphPattern::Distinct {
                inner: self.rewrite_boxed(*inner),
            },
            GraphPattern::Reduced { inner } => GraphPattern::Reduced {
                inner: self.rewrite_boxed(*inner),
            },
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => GraphPattern::Slice {
                inner: self.rewrite_boxed(*inner),
                start,
                length,
            },
            GraphPattern::Group {
                inner,
                variables,
                aggregates,
            } => GraphPattern::Group {
                inner: self.rewrite_boxed(*inner),
                variables: variables
                    .into_iter()
                    .filter_map(|v| match self.slot(v) {
                        Slot::Keep(v) => Some(v),
                        Slot::Constant(..) => None,
                    })
                    .collect(),
                aggregates: aggregates
                    .into_iter()
                    .map(|(v, a)| (self.rewrite_variable(v), self.rewrite_aggregate(a)))
                    .collect(),
            },
            GraphPattern::Service {
                name,
                inner,
                silent,
            } => GraphPattern::Service {
                name: self.rewrite_named_node_pattern(name),
                inner: self.rewrite_boxed(*inner),
                silent,
            },
        }
    }

    fn rewrite_boxed(&mut self, pattern: GraphPattern) -> Box<GraphPattern> {
        Box::new(self.rewrite_graph_pattern(pattern))
    }

    fn rewrite_values(
        &mut self,
        variables: Vec<Variable>,
        bindings: Vec<Vec<Option<GroundTerm>>>,
    ) -> GraphPattern {
        let mut kept = Vec::new();
        let mut columns = Vec::new();
        let mut fixed = Vec::new();
        for (column, variable) in variables.into_iter().enumerate() {
            match self.mapper.map_variable(&variable) {
                Some(TermPattern::Variable(renamed)) => {
                    kept.push(renamed);
                    columns.push(column);
                }
                Some(constant) => match ground_term(&constant) {
                    Some(constant) => fixed.push((column, constant)),
                    None => {
                        kept.push(variable);
                        columns.push(column);
                    }
                },
                None => {
                    kept.push(variable);
                    columns.push(column);
                }
            }
        }
        let bindings = bindings
            .into_iter()
            .filter(|row| {
                fixed.iter().all(|(column, constant)| {
                    row.get(*column)
                        .and_then(Option::as_ref)
                        .map_or(true, |value| value == constant)
                })
            })
            .map(|row| {
                columns
                    .iter()
                    .map(|column| row.get(*column).cloned().flatten())
                    .collect()
            })
            .collect();
        GraphPattern::Values {
            variables: kept,
            bindings,
        }
    }

    fn rewrite_aggregate(&mut self, aggregate: AggregateExpression) -> AggregateExpression {
        match aggregate {
            AggregateExpression::CountSolutions { distinct } => {
                AggregateExpression::CountSolutions { distinct }
            }
            AggregateExpression::FunctionCall {
                name,
                expr,
                distinct,
            } => AggregateExpression::FunctionCall {
                name,
                expr: self.rewrite_expression(expr),
                distinct,
            },
        }
    }

    fn rewrite_expression(&mut self, expression: Expression) -> Expression {
        match expression {
            Expression::NamedNode(_) | Expression::Literal(_) => expression,
            Expression::Variable(variable) => match self.mapper.map_variable(&variable) {
                Some(TermPattern::Variable(renamed)) => Expression::Variable(renamed),
                Some(constant) => {
                    constant_expression(&constant).unwrap_or(Expression::Variable(variable))
                }
                None => Expression::Variable(variable),
            },
            Expression::Or(a, b) => Expression::Or(self.rewrite_expr(*a), self.rewrite_expr(*b)),
            Expression::And(a, b) => {
                Expression::And(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::Equal(a, b) => {
                Expression::Equal(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::SameTerm(a, b) => {
                Expression::SameTerm(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::Greater(a, b) => {
                Expression::Greater(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::GreaterOrEqual(a, b) => {
                Expression::GreaterOrEqual(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::Less(a, b) => {
                Expression::Less(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::LessOrEqual(a, b) => {
                Expression::LessOrEqual(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::In(a, list) => Expression::In(
                self.rewrite_expr(*a),
                list.into_iter()
                    .map(|e| self.rewrite_expression(e))
                    .collect(),
            ),
            Expression::Add(a, b) => Expression::Add(self.rewrite_expr(*a), self.rewrite_expr(*b)),
            Expression::Subtract(a, b) => {
                Expression::Subtract(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::Multiply(a, b) => {
                Expression::Multiply(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::Divide(a, b) => {
                Expression::Divide(self.rewrite_expr(*a), self.rewrite_expr(*b))
            }
            Expression::UnaryPlus(a) => Expression::UnaryPlus(self.rewrite_expr(*a)),
            Expression::UnaryMinus(a) => Expression::UnaryMinus(self.rewrite_expr(*a)),
            Expression::Not(a) => Expression::Not(self.rewrite_expr(*a)),
            Expression::Exists(pattern) => Expression::Exists(self.rewrite_boxed(*pattern)),
            Expression::Bound(variable) => match self.slot(variable) {
                Slot::Keep(variable) => Expression::Bound(variable),
                Slot::Constant(..) => Expression::Literal(Literal::from(true)),
            },
            Expression::If(a, b, c) => Expression::If(
                self.rewrite_expr(*a),
                self.rewrite_expr(*b),
                self.rewrite_expr(*c),
            ),
            Expression::Coalesce(list) => Expression::Coalesce(
                list.into_iter()
                    .map(|e| self.rewrite_expression(e))
                    .collect(),
            ),
            Expression::FunctionCall(function, args) => Expression::FunctionCall(
                function,
                args.into_iter()
                    .map(|e| self.rewrite_expression(e))
                    .collect(),
            ),
        }
    }

    fn rewrite_expr(&mut self, expression: Expression) -> Box<Expression> {
        Box::new(self.rewrite_expression(expression))
    }

    fn rewrite_triple_pattern(&mut self, pattern: TriplePattern) -> TriplePattern {
        TriplePattern {
            subject: self.rewrite_term_pattern(pattern.subject),
            predicate: self.rewrite_named_node_pattern(pattern.predicate),
            object: self.rewrite_term_pattern(pattern.object),
        }
    }

    fn rewrite_term_pattern(&mut self, term: TermPattern) -> TermPattern {
        match term {
            TermPattern::Variable(variable) => self
                .mapper
                .map_variable(&variable)
                .unwrap_or(TermPattern::Variable(variable)),
            term => term,
        }
    }

    fn rewrite_named_node_pattern(&mut self, pattern: NamedNodePattern) -> NamedNodePattern {
        match pattern {
            NamedNodePattern::Variable(variable) => match self.mapper.map_variable(&variable) {
                Some(TermPattern::Variable(renamed)) => NamedNodePattern::Variable(renamed),
                Some(TermPattern::NamedNode(node)) => NamedNodePattern::NamedNode(node),
                _ => NamedNodePattern::Variable(variable),
            },
            pattern @ NamedNodePattern::NamedNode(_) => pattern,
        }
    }

    /// Rewrites a variable that must stay a variable, e.g. an aggregate target.
    fn rewrite_variable(&mut self, variable: Variable) -> Variable {
        match self.mapper.map_variable(&variable) {
            Some(TermPattern::Variable(renamed)) => renamed,
            _ => variable,
        }
    }

    fn slot(&mut self, variable: Variable) -> Slot {
        match self.mapper.map_variable(&variable) {
            Some(TermPattern::Variable(renamed)) => Slot::Keep(renamed),
            Some(constant) => match constant_expression(&constant) {
                Some(constant) => Slot::Constant(variable, constant),
                None => Slot::Keep(variable),
            },
            None => Slot::Keep(variable),
        }
    }
}
