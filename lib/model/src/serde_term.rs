//! Serde adapters that write RDF terms as `{"#type": ..., "#value": ...}` objects.
//!
//! The `#type` / `#value` keys are part of the persisted search state, so the shape of
//! [`JsonTerm`] must only ever be extended.

use crate::Tuple;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "#type", content = "#value")]
pub enum JsonTerm {
    Iri(String),
    BNode(String),
    Literal {
        value: String,
        datatype: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
}

impl From<&Term> for JsonTerm {
    fn from(term: &Term) -> Self {
        match term {
            Term::NamedNode(node) => JsonTerm::Iri(node.as_str().to_owned()),
            Term::BlankNode(node) => JsonTerm::BNode(node.as_str().to_owned()),
            Term::Literal(literal) => literal.into(),
        }
    }
}

impl From<&Literal> for JsonTerm {
    fn from(literal: &Literal) -> Self {
        JsonTerm::Literal {
            value: literal.value().to_owned(),
            datatype: literal.datatype().as_str().to_owned(),
            lang: literal.language().map(str::to_owned),
        }
    }
}

impl TryFrom<JsonTerm> for Term {
    type Error = String;

    fn try_from(term: JsonTerm) -> Result<Self, Self::Error> {
        match term {
            JsonTerm::Iri(iri) => NamedNode::new(iri)
                .map(Term::NamedNode)
                .map_err(|e| e.to_string()),
            JsonTerm::BNode(id) => BlankNode::new(id)
                .map(Term::BlankNode)
                .map_err(|e| e.to_string()),
            JsonTerm::Literal {
                value,
                datatype,
                lang,
            } => json_literal(value, &datatype, lang).map(Term::Literal),
        }
    }
}

fn json_literal(value: String, datatype: &str, lang: Option<String>) -> Result<Literal, String> {
    match lang {
        Some(lang) => {
            Literal::new_language_tagged_literal(value, lang).map_err(|e| e.to_string())
        }
        None => {
            let datatype = NamedNode::new(datatype).map_err(|e| e.to_string())?;
            Ok(Literal::new_typed_literal(value, datatype))
        }
    }
}

pub mod named_node {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(node: &NamedNode, serializer: S) -> Result<S::Ok, S::Error> {
        JsonTerm::Iri(node.as_str().to_owned()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NamedNode, D::Error> {
        match JsonTerm::deserialize(deserializer)? {
            JsonTerm::Iri(iri) => NamedNode::new(iri).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected an IRI, found {other:?}"))),
        }
    }
}

pub mod literal {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(literal: &Literal, serializer: S) -> Result<S::Ok, S::Error> {
        JsonTerm::from(literal).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Literal, D::Error> {
        match JsonTerm::deserialize(deserializer)? {
            JsonTerm::Literal {
                value,
                datatype,
                lang,
            } => json_literal(value, &datatype, lang).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected a literal, found {other:?}"))),
        }
    }
}

pub mod tuple {
    use super::*;
    use serde::de::Error as _;

    pub fn serialize<S: Serializer>(tuple: &Tuple, serializer: S) -> Result<S::Ok, S::Error> {
        tuple
            .iter()
            .map(|(key, term)| (key, JsonTerm::from(term)))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Tuple, D::Error> {
        BTreeMap::<String, JsonTerm>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, term)| Ok((key, Term::try_from(term).map_err(D::Error::custom)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::xsd;

    #[test]
    fn literal_term_shape() -> Result<(), Box<dyn std::error::Error>> {
        let term = Term::from(Literal::new_typed_literal("5", xsd::INTEGER));
        let json = serde_json::to_value(JsonTerm::from(&term))?;
        assert_eq!(
            json,
            serde_json::json!({
                "#type": "Literal",
                "#value": {"value": "5", "datatype": "http://www.w3.org/2001/XMLSchema#integer"}
            })
        );
        let back: JsonTerm = serde_json::from_value(json)?;
        assert_eq!(Term::try_from(back)?, term);
        Ok(())
    }

    #[test]
    fn language_tagged_literal_keeps_tag() -> Result<(), Box<dyn std::error::Error>> {
        let literal = Literal::new_language_tagged_literal("Wien", "de")?;
        let term: JsonTerm = serde_json::from_str(&serde_json::to_string(&JsonTerm::from(&literal))?)?;
        assert_eq!(Term::try_from(term)?, Term::Literal(literal));
        Ok(())
    }

    #[test]
    fn invalid_iri_is_rejected() {
        let term = JsonTerm::Iri("not an iri".to_owned());
        assert!(Term::try_from(term).is_err());
    }
}
