use crate::FacetValueKind;
use semsearch_model::vocab::facet;
use semsearch_model::{
    literal_number, parse_number, parse_xsd_date, DateRange, DisjunctValue, LiteralValue,
    NumericRange, Resource, Term, Tuple,
};

/// A value offered by a facet relation.
#[derive(Clone, Debug, PartialEq)]
pub enum FacetValue {
    Resource(Resource),
    Literal(LiteralValue),
    DateRange(DateRange),
    NumericRange(NumericRange),
}

impl FacetValue {
    pub fn kind(&self) -> FacetValueKind {
        match self {
            FacetValue::Resource(_) => FacetValueKind::Resource,
            FacetValue::Literal(_) => FacetValueKind::Literal,
            FacetValue::DateRange(_) => FacetValueKind::DateRange,
            FacetValue::NumericRange(_) => FacetValueKind::NumericRange,
        }
    }

    /// The disjunct that selects this value.
    pub fn into_disjunct_value(self) -> DisjunctValue {
        match self {
            FacetValue::Resource(resource) => DisjunctValue::Resource(resource),
            FacetValue::Literal(literal) => DisjunctValue::Literal(literal),
            FacetValue::DateRange(range) => DisjunctValue::DateRange(range),
            FacetValue::NumericRange(range) => DisjunctValue::NumericRange(range),
        }
    }
}

/// Reads the values of the given kind from the solutions of a values query. Solutions that do
/// not bind the expected variables are skipped.
pub fn facet_values(kind: FacetValueKind, tuples: Vec<Tuple>) -> Vec<FacetValue> {
    tuples
        .into_iter()
        .filter_map(|tuple| match kind {
            FacetValueKind::Resource => resource_value(tuple).map(FacetValue::Resource),
            FacetValueKind::Literal => literal_value(tuple).map(FacetValue::Literal),
            FacetValueKind::DateRange => date_range_value(&tuple).map(FacetValue::DateRange),
            FacetValueKind::NumericRange => {
                numeric_range_value(tuple).map(FacetValue::NumericRange)
            }
        })
        .collect()
}

fn term_value(term: &Term) -> &str {
    match term {
        Term::NamedNode(node) => node.as_str(),
        Term::BlankNode(node) => node.as_str(),
        Term::Literal(literal) => literal.value(),
    }
}

fn resource_value(tuple: Tuple) -> Option<Resource> {
    let Some(Term::NamedNode(iri)) = tuple.get(facet::VALUE) else {
        return None;
    };
    let label = tuple
        .get(facet::LABEL)
        .map_or_else(|| iri.as_str(), term_value)
        .to_owned();
    let mut resource = Resource::new(iri.clone(), label);
    resource.description = tuple.get(facet::DESCRIPTION).map(|t| term_value(t).to_owned());
    resource.tuple = tuple;
    Some(resource)
}

fn literal_value(tuple: Tuple) -> Option<LiteralValue> {
    let Some(Term::Literal(literal)) = tuple.get(facet::LITERAL) else {
        return None;
    };
    let mut value = LiteralValue::new(literal.clone());
    value.tuple = tuple;
    Some(value)
}

fn date_range_value(tuple: &Tuple) -> Option<DateRange> {
    let date = |name: &str| parse_xsd_date(term_value(tuple.get(name)?));
    Some(DateRange {
        begin: date(facet::DATE_BEGIN)?,
        end: date(facet::DATE_END)?,
    })
}

fn number(term: &Term) -> Option<f64> {
    match term {
        Term::Literal(literal) => {
            literal_number(literal.as_ref()).or_else(|| parse_number(literal.value()))
        }
        _ => None,
    }
}

fn numeric_range_value(tuple: Tuple) -> Option<NumericRange> {
    let bound = |name: &str| {
        tuple
            .get(name)
            .or_else(|| tuple.get(facet::LITERAL))
            .and_then(number)
    };
    let mut range = NumericRange::new(
        bound(facet::NUMERIC_RANGE_BEGIN)?,
        bound(facet::NUMERIC_RANGE_END)?,
    );
    range.tuple = tuple;
    Some(range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use semsearch_model::{Literal, NamedNode};

    fn tuple<const N: usize>(entries: [(&str, Term); N]) -> Tuple {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect()
    }

    #[test]
    fn resources_need_an_iri() {
        let values = facet_values(
            FacetValueKind::Resource,
            vec![
                tuple([
                    ("value", NamedNode::new_unchecked("http://example.com/a").into()),
                    ("label", Literal::new_simple_literal("A").into()),
                ]),
                tuple([("value", Literal::new_simple_literal("not an IRI").into())]),
                tuple([("value", NamedNode::new_unchecked("http://example.com/b").into())]),
            ],
        );
        let labels = values
            .iter()
            .filter_map(|v| match v {
                FacetValue::Resource(r) => Some(r.label.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(labels, ["A", "http://example.com/b"]);
    }

    #[test]
    fn invalid_date_ranges_are_dropped() {
        let values = facet_values(
            FacetValueKind::DateRange,
            vec![
                tuple([
                    ("dateBegin", Literal::new_simple_literal("1600-01-01").into()),
                    ("dateEnd", Literal::new_simple_literal("1650-12-31T00:00:00").into()),
                ]),
                tuple([
                    ("dateBegin", Literal::new_simple_literal("sometime").into()),
                    ("dateEnd", Literal::new_simple_literal("1650-12-31").into()),
                ]),
                tuple([("dateBegin", Literal::new_simple_literal("1600-01-01").into())]),
            ],
        );
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].kind(), FacetValueKind::DateRange);
    }

    #[test]
    fn numeric_ranges_fall_back_to_literal() {
        let values = facet_values(
            FacetValueKind::NumericRange,
            vec![
                tuple([
                    ("numericRangeBegin", Literal::from(1_i32).into()),
                    ("numericRangeEnd", Literal::from(10.5_f64).into()),
                ]),
                tuple([("literal", Literal::from(7_i32).into())]),
            ],
        );
        let ranges = values
            .iter()
            .filter_map(|v| match v {
                FacetValue::NumericRange(r) => Some((r.begin, r.end)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(ranges, [(1.0, 10.5), (7.0, 7.0)]);
    }
}
