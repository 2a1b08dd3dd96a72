//! Compiles the conjuncts of a search into SPARQL graph patterns.

use crate::config::{Optimizer, SearchConfig};
use crate::pattern::{
    blazegraph_no_optimize_pattern, join, join_all, parse_pattern, projection_variable,
    select_pattern,
};
use crate::resolver::{matching_pattern, text_pattern};
use crate::rewrite::{
    bind_variables, randomize_variables, rewrite_projection_variable, Parameters,
};
use crate::QueryError;
use oxrdf::vocab::xsd;
use semsearch_model::vocab::search;
use semsearch_model::{
    double_literal, format_xsd_date, Category, Conjunct, ConjunctIndex, Disjunct,
    DisjunctKind, DisjunctValue, Literal, Query, RelationConjunct, Search, Term, TextConjunct,
    TextDisjunct, Variable, Year,
};
use spargebra::algebra::GraphPattern;
use time::{Date, Duration, Month};

/// A borrowed conjunct of either kind.
#[derive(Clone, Copy, Debug)]
pub enum ConjunctRef<'a> {
    Relation(&'a RelationConjunct),
    Text(&'a TextConjunct),
}

impl<'a> ConjunctRef<'a> {
    pub fn range(self) -> &'a Category {
        match self {
            ConjunctRef::Relation(conjunct) => &conjunct.range,
            ConjunctRef::Text(conjunct) => &conjunct.range,
        }
    }

    pub fn index(self) -> ConjunctIndex {
        match self {
            ConjunctRef::Relation(conjunct) => conjunct.index,
            ConjunctRef::Text(conjunct) => conjunct.index,
        }
    }
}

impl<'a> From<&'a Conjunct> for ConjunctRef<'a> {
    fn from(conjunct: &'a Conjunct) -> Self {
        match conjunct {
            Conjunct::Relation(conjunct) => ConjunctRef::Relation(conjunct),
            Conjunct::Text(conjunct) => ConjunctRef::Text(conjunct),
        }
    }
}

impl<'a> From<&'a RelationConjunct> for ConjunctRef<'a> {
    fn from(conjunct: &'a RelationConjunct) -> Self {
        ConjunctRef::Relation(conjunct)
    }
}

impl<'a> From<&'a TextConjunct> for ConjunctRef<'a> {
    fn from(conjunct: &'a TextConjunct) -> Self {
        ConjunctRef::Text(conjunct)
    }
}

/// Turns conjuncts into graph patterns constraining `projection`.
///
/// Every produced pattern has its variables randomized, except for the projection variable, so
/// the patterns can be joined with each other and with a base query.
#[derive(Clone, Copy, Debug)]
pub struct SearchCompiler<'a> {
    config: &'a SearchConfig,
    projection: &'a Variable,
    domain: &'a Category,
}

impl<'a> SearchCompiler<'a> {
    pub fn new(config: &'a SearchConfig, projection: &'a Variable, domain: &'a Category) -> Self {
        Self {
            config,
            projection,
            domain,
        }
    }

    /// The pattern of a single alternative value of a relation conjunct.
    pub fn disjunct_to_query_pattern(
        &self,
        conjunct: &RelationConjunct,
        disjunct: &Disjunct,
    ) -> Result<GraphPattern, QueryError> {
        let conjunct = ConjunctRef::Relation(conjunct);
        match &disjunct.value {
            DisjunctValue::Search(nested) => {
                let compiler = SearchCompiler::new(self.config, self.projection, &nested.domain);
                let nested = compiler.search_pattern(nested)?;
                self.nested_query_pattern(conjunct, disjunct.kind(), nested, self.projection)
            }
            DisjunctValue::SavedSearch(saved) => {
                let projection = projection_variable(&saved.query)?;
                let nested = select_pattern(saved.query.clone())?;
                self.nested_query_pattern(conjunct, disjunct.kind(), nested, &projection)
            }
            value => {
                let parameters = self.disjunct_parameters(conjunct, value)?;
                let pattern = self.bound_pattern(conjunct, value.kind(), parameters)?;
                Ok(randomize_variables(pattern, self.projection, None))
            }
        }
    }

    /// The pattern of a single free text value of a text conjunct.
    pub fn text_disjunct_to_query_pattern(
        &self,
        conjunct: &TextConjunct,
        disjunct: &TextDisjunct,
    ) -> Result<GraphPattern, QueryError> {
        let conjunct = ConjunctRef::Text(conjunct);
        let parameters = self.text_parameters(conjunct, &disjunct.value);
        let pattern = self.bound_pattern(conjunct, DisjunctKind::Text, parameters)?;
        Ok(randomize_variables(pattern, self.projection, None))
    }

    /// The union of the patterns of all disjuncts of `conjunct`, or `None` if it has none.
    pub fn conjunct_to_query_pattern(
        &self,
        conjunct: ConjunctRef<'_>,
    ) -> Result<Option<GraphPattern>, QueryError> {
        let patterns = match conjunct {
            ConjunctRef::Relation(conjunct) => conjunct
                .disjuncts
                .iter()
                .map(|disjunct| self.disjunct_to_query_pattern(conjunct, disjunct))
                .collect::<Result<Vec<_>, _>>()?,
            ConjunctRef::Text(conjunct) => conjunct
                .disjuncts
                .iter()
                .map(|disjunct| self.text_disjunct_to_query_pattern(conjunct, disjunct))
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(patterns
            .into_iter()
            .reduce(|left, right| GraphPattern::Union {
                left: Box::new(left),
                right: Box::new(right),
            }))
    }

    /// One pattern per conjunct that has disjuncts, in conjunct index order.
    pub fn conjuncts_to_query_patterns<'c>(
        &self,
        conjuncts: impl IntoIterator<Item = ConjunctRef<'c>>,
    ) -> Result<Vec<GraphPattern>, QueryError> {
        let mut conjuncts = conjuncts.into_iter().collect::<Vec<_>>();
        conjuncts.sort_by_key(|conjunct| conjunct.index());
        let mut patterns = Vec::with_capacity(conjuncts.len());
        for conjunct in conjuncts {
            if let Some(pattern) = self.conjunct_to_query_pattern(conjunct)? {
                patterns.push(pattern);
            }
        }
        Ok(patterns)
    }

    /// All conjuncts of `search` joined together.
    pub fn search_pattern(&self, search: &Search) -> Result<GraphPattern, QueryError> {
        Ok(join_all(
            self.conjuncts_to_query_patterns(search.conjuncts.iter().map(ConjunctRef::from))?,
        ))
    }

    /// Joins the result of a nested search, whose results are bound to `nested_projection`, with
    /// the relation pattern of `conjunct`.
    fn nested_query_pattern(
        &self,
        conjunct: ConjunctRef<'_>,
        kind: DisjunctKind,
        nested: GraphPattern,
        nested_projection: &Variable,
    ) -> Result<GraphPattern, QueryError> {
        let value = Variable::new_unchecked(search::VALUE);
        let nested = randomize_variables(nested, nested_projection, Some(&value));
        let relation = self.bound_pattern(conjunct, kind, Parameters::new())?;
        Ok(randomize_variables(join(nested, relation), self.projection, None))
    }

    fn bound_pattern(
        &self,
        conjunct: ConjunctRef<'_>,
        kind: DisjunctKind,
        parameters: Parameters,
    ) -> Result<GraphPattern, QueryError> {
        let template = matching_pattern(self.config, conjunct, kind)?;
        let pattern = parse_pattern(&template, &self.config.prefixes)?;
        let pattern = rewrite_projection_variable(pattern, self.projection);
        let mut bindings = self.generic_parameters(conjunct);
        bindings.extend(parameters);
        Ok(bind_variables(pattern, &bindings))
    }

    fn generic_parameters(&self, conjunct: ConjunctRef<'_>) -> Parameters {
        let mut parameters = Parameters::new();
        parameters.insert(search::DOMAIN.to_owned(), self.domain.iri.clone().into());
        if let ConjunctRef::Relation(conjunct) = conjunct {
            parameters.insert(search::RANGE.to_owned(), conjunct.range.iri.clone().into());
            parameters.insert(search::RELATION.to_owned(), conjunct.relation.iri.clone().into());
        }
        parameters
    }

    fn disjunct_parameters(
        &self,
        conjunct: ConjunctRef<'_>,
        value: &DisjunctValue,
    ) -> Result<Parameters, QueryError> {
        Ok(match value {
            DisjunctValue::Resource(resource) => {
                parameters([(search::VALUE, resource.iri.clone().into())])
            }
            DisjunctValue::Set(set) => parameters([(search::SET, set.iri.clone().into())]),
            DisjunctValue::Search(_) | DisjunctValue::SavedSearch(_) => Parameters::new(),
            DisjunctValue::Date(date) => date_parameters(*date, *date),
            DisjunctValue::DateRange(range) => date_parameters(range.begin, range.end),
            DisjunctValue::DateDeviation(deviation) => {
                let out_of_range = || QueryError::DateOutOfRange(format_xsd_date(deviation.date));
                let days = deviation
                    .deviation
                    .checked_mul(SECONDS_PER_DAY)
                    .map(Duration::seconds)
                    .ok_or_else(out_of_range)?;
                date_parameters(
                    deviation.date.checked_sub(days).ok_or_else(out_of_range)?,
                    deviation.date.checked_add(days).ok_or_else(out_of_range)?,
                )
            }
            DisjunctValue::Year(year) => {
                let year = signed_year(*year)?;
                date_parameters(first_day_of(year)?, last_day_of(year)?)
            }
            DisjunctValue::YearRange(range) => date_parameters(
                first_day_of(signed_year(range.begin)?)?,
                last_day_of(signed_year(range.end)?)?,
            ),
            DisjunctValue::YearDeviation(deviation) => {
                let year = signed_year(deviation.year)?;
                let out_of_range = || QueryError::DateOutOfRange(year.to_string());
                date_parameters(
                    first_day_of(year.checked_sub(deviation.deviation).ok_or_else(out_of_range)?)?,
                    last_day_of(year.checked_add(deviation.deviation).ok_or_else(out_of_range)?)?,
                )
            }
            DisjunctValue::Text(text) => self.text_parameters(conjunct, text),
            DisjunctValue::Distance(distance) => parameters([
                (
                    search::MAP_CENTER,
                    Literal::new_simple_literal(distance.center.to_string()).into(),
                ),
                (
                    search::MAP_DISTANCE,
                    Literal::new_simple_literal(distance.distance.to_string()).into(),
                ),
            ]),
            DisjunctValue::BoundingBox(bounding_box) => parameters([
                (
                    search::MAP_SOUTH_WEST,
                    Literal::new_simple_literal(bounding_box.south_west.to_string()).into(),
                ),
                (
                    search::MAP_NORTH_EAST,
                    Literal::new_simple_literal(bounding_box.north_east.to_string()).into(),
                ),
            ]),
            DisjunctValue::Literal(literal) => {
                parameters([(search::LITERAL, literal.literal.clone().into())])
            }
            DisjunctValue::NumericRange(range) => parameters([
                (search::NUMERIC_RANGE_BEGIN, double_literal(range.begin).into()),
                (search::NUMERIC_RANGE_END, double_literal(range.end).into()),
            ]),
        })
    }

    fn text_parameters(&self, conjunct: ConjunctRef<'_>, text: &str) -> Parameters {
        let escape = text_pattern(self.config, conjunct.range()).map_or(true, |(_, escape)| escape);
        let value = if escape {
            Literal::new_simple_literal(lucene_query(text))
        } else {
            Literal::new_simple_literal(text)
        };
        parameters([(search::VALUE, value.into())])
    }
}

fn parameters<const N: usize>(values: [(&str, Term); N]) -> Parameters {
    values
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}

fn date_parameters(begin: Date, end: Date) -> Parameters {
    parameters([
        (search::DATE_BEGIN, date_literal(begin).into()),
        (search::DATE_END, date_literal(end).into()),
    ])
}

const SECONDS_PER_DAY: i64 = 86_400;

fn signed_year(year: Year) -> Result<i32, QueryError> {
    // Only a year before Christ can fail to negate.
    year.signed()
        .ok_or_else(|| QueryError::DateOutOfRange(format!("{} BC", year.year)))
}

fn first_day_of(year: i32) -> Result<Date, QueryError> {
    Date::from_calendar_date(year, Month::January, 1)
        .map_err(|_| QueryError::DateOutOfRange(year.to_string()))
}

fn last_day_of(year: i32) -> Result<Date, QueryError> {
    Date::from_calendar_date(year, Month::December, 31)
        .map_err(|_| QueryError::DateOutOfRange(year.to_string()))
}

/// An `xsd:date` literal. Year zero does not exist in the XML Schema 1.0 date space used by
/// Blazegraph, so it is moved to year -1.
pub fn date_literal(date: Date) -> Literal {
    let date = if date.year() == 0 {
        date.replace_year(-1)
            .or_else(|_| Date::from_calendar_date(-1, date.month(), 28))
            .unwrap_or(date)
    } else {
        date
    };
    Literal::new_typed_literal(format_xsd_date(date), xsd::DATE)
}

const LUCENE_SPECIAL_CHARACTERS: &str = "+-&|!(){}[]^\"~*?:/\\";

/// A Lucene prefix query matching every whitespace separated token of `text`.
pub fn lucene_query(text: &str) -> String {
    text.split_whitespace()
        .map(|token| {
            let mut escaped = String::with_capacity(token.len() + 1);
            for c in token.chars() {
                if LUCENE_SPECIAL_CHARACTERS.contains(c) {
                    escaped.push('\\');
                }
                escaped.push(c);
            }
            escaped.push('*');
            escaped
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `SELECT DISTINCT ?projection WHERE { ... } LIMIT limit` for all conjuncts of `search`.
pub fn generate_select_query(
    config: &SearchConfig,
    projection: &Variable,
    search: &Search,
) -> Result<Query, QueryError> {
    let compiler = SearchCompiler::new(config, projection, &search.domain);
    let mut patterns = Vec::new();
    if config.optimizer == Optimizer::Blazegraph {
        patterns.push(blazegraph_no_optimize_pattern());
    }
    patterns.extend(
        compiler.conjuncts_to_query_patterns(search.conjuncts.iter().map(ConjunctRef::from))?,
    );
    let pattern = GraphPattern::Slice {
        inner: Box::new(GraphPattern::Distinct {
            inner: Box::new(GraphPattern::Project {
                inner: Box::new(join_all(patterns)),
                variables: vec![projection.clone()],
            }),
        }),
        start: 0,
        length: Some(config.limit),
    };
    let query = Query::Select {
        dataset: None,
        pattern,
        base_iri: None,
    };
    tracing::debug!(%query, "Generated search query");
    Ok(query)
}
