use oxrdf::vocab::xsd;
use oxrdf::{Literal, LiteralRef};

/// Returns the lexical form of `value` as it would be written in a SPARQL query or JSON
/// document, e.g. `5` for `5.0` and `5.1` for `5.1`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value == f64::INFINITY {
        "INF".to_owned()
    } else if value == f64::NEG_INFINITY {
        "-INF".to_owned()
    } else if value == 0.0 {
        "0".to_owned()
    } else {
        value.to_string()
    }
}

/// Tags a number as `xsd:integer` if rounding does not change it and as `xsd:double` otherwise.
///
/// The same rule is used by the query compiler and by the JSON to RDF codec, so a number keeps
/// its datatype when it travels through both.
pub fn numeric_literal(value: f64) -> Literal {
    let datatype = if value.is_finite() && value.round() == value {
        xsd::INTEGER
    } else {
        xsd::DOUBLE
    };
    Literal::new_typed_literal(format_number(value), datatype)
}

/// A `xsd:double` literal, regardless of whether the value is integral.
pub fn double_literal(value: f64) -> Literal {
    Literal::new_typed_literal(format_number(value), xsd::DOUBLE)
}

/// Reads a numeric literal back. Returns `None` for literals that are not numbers.
pub fn literal_number(literal: LiteralRef<'_>) -> Option<f64> {
    let datatype = literal.datatype();
    if datatype == xsd::INTEGER
        || datatype == xsd::DOUBLE
        || datatype == xsd::DECIMAL
        || datatype == xsd::FLOAT
        || datatype == xsd::INT
        || datatype == xsd::LONG
    {
        parse_number(literal.value())
    } else {
        None
    }
}

/// Parses the lexical form of a number, accepting the XSD spellings of the special values.
pub fn parse_number(value: &str) -> Option<f64> {
    match value.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        value => value.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_tagged_as_integer() {
        assert_eq!(numeric_literal(5.0), Literal::new_typed_literal("5", xsd::INTEGER));
        assert_eq!(numeric_literal(-3.0), Literal::new_typed_literal("-3", xsd::INTEGER));
    }

    #[test]
    fn fractions_are_tagged_as_double() {
        assert_eq!(numeric_literal(5.1), Literal::new_typed_literal("5.1", xsd::DOUBLE));
        assert_eq!(
            numeric_literal(f64::INFINITY),
            Literal::new_typed_literal("INF", xsd::DOUBLE)
        );
    }

    #[test]
    fn numbers_survive_the_literal_round_trip() {
        for value in [5.0, -3.0, 5.1, 0.0] {
            let literal = numeric_literal(value);
            assert_eq!(literal_number(literal.as_ref()), Some(value));
        }
        assert_eq!(
            literal_number(Literal::new_simple_literal("5").as_ref()),
            None
        );
    }
}
