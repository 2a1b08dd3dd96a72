//! Lossless mapping between JSON documents and RDF graphs.
//!
//! Arrays become RDF lists, objects become blank nodes whose predicates are the object keys
//! appended to the path from the root (`<key-base>/outer/inner`; array items add `_item`).
//! Strings, booleans and numbers become typed literals and `null` becomes a dedicated IRI.

use crate::StateError;
use oxrdf::vocab::{rdf, xsd};
use oxrdf::{
    BlankNode, Graph, Literal, LiteralRef, NamedNode, SubjectRef, Term, TermRef, Triple,
};
use semsearch_model::vocab::json;
use semsearch_model::{numeric_literal, parse_number};
use serde_json::{Map, Number, Value};

/// Nesting deeper than this is reported as an invalid graph instead of overflowing the stack.
const MAX_DEPTH: usize = 512;

/// A graph together with the node that represents the encoded document.
#[derive(Clone, Debug)]
pub struct PointedGraph {
    pub pointer: Term,
    pub graph: Graph,
}

pub fn json_to_graph(value: &Value) -> Result<PointedGraph, StateError> {
    let mut graph = Graph::new();
    let pointer = encode(value, json::KEY_BASE, &mut graph)?;
    Ok(PointedGraph { pointer, graph })
}

/// Reads back the document rooted at `pointer`.
///
/// Literals of unsupported datatypes are dropped from objects and read as `null` inside arrays.
pub fn graph_to_json(pointer: TermRef<'_>, graph: &Graph) -> Result<Value, StateError> {
    Ok(Decoder { graph }.term(pointer, 0)?.unwrap_or(Value::Null))
}

fn encode(value: &Value, base: &str, graph: &mut Graph) -> Result<Term, StateError> {
    Ok(match value {
        Value::Null => json::NULL.into_owned().into(),
        Value::Bool(value) => Literal::from(*value).into(),
        Value::Number(number) => number_literal(number).into(),
        Value::String(value) => Literal::new_simple_literal(value.as_str()).into(),
        Value::Array(items) => {
            let item_base = format!("{base}/_item");
            let mut rest: Term = rdf::NIL.into_owned().into();
            for item in items.iter().rev() {
                let node = BlankNode::default();
                let first = encode(item, &item_base, graph)?;
                graph.insert(&Triple::new(node.clone(), rdf::FIRST, first));
                graph.insert(&Triple::new(node.clone(), rdf::REST, rest));
                rest = node.into();
            }
            rest
        }
        Value::Object(object) => {
            let node = BlankNode::default();
            for (key, value) in object {
                let predicate = key_iri(base, key)?;
                let object = encode(value, &format!("{base}/{key}"), graph)?;
                graph.insert(&Triple::new(node.clone(), predicate, object));
            }
            node.into()
        }
    })
}

fn key_iri(base: &str, key: &str) -> Result<NamedNode, StateError> {
    if key.contains('/') {
        return Err(StateError::InvalidJsonKey(key.to_owned()));
    }
    NamedNode::new(format!("{base}/{key}")).map_err(|source| StateError::UnsupportedJsonKey {
        key: key.to_owned(),
        source,
    })
}

fn number_literal(number: &Number) -> Literal {
    if number.is_i64() || number.is_u64() {
        Literal::new_typed_literal(number.to_string(), xsd::INTEGER)
    } else {
        numeric_literal(number.as_f64().unwrap_or(f64::NAN))
    }
}

struct Decoder<'a> {
    graph: &'a Graph,
}

impl<'a> Decoder<'a> {
    fn term(&self, term: TermRef<'a>, depth: usize) -> Result<Option<Value>, StateError> {
        if depth > MAX_DEPTH {
            return Err(StateError::InvalidGraph(format!(
                "nesting exceeds {MAX_DEPTH} levels"
            )));
        }
        if let TermRef::Literal(literal) = term {
            return Ok(literal_value(literal));
        }
        if let TermRef::NamedNode(node) = term {
            if node == rdf::NIL {
                return Ok(Some(Value::Array(Vec::new())));
            }
            if node == json::NULL {
                return Ok(Some(Value::Null));
            }
            return self.node(node.into(), depth).map(Some);
        }
        if let TermRef::BlankNode(node) = term {
            return self.node(node.into(), depth).map(Some);
        }
        Err(StateError::InvalidGraph(format!("unsupported node {term}")))
    }

    fn node(&self, subject: SubjectRef<'a>, depth: usize) -> Result<Value, StateError> {
        if self
            .graph
            .object_for_subject_predicate(subject, rdf::FIRST)
            .is_some()
        {
            return self.list(subject, depth);
        }
        let mut object = Map::new();
        for triple in self.graph.triples_for_subject(subject) {
            let Some(key) = property_key(triple.predicate.as_str()) else {
                continue;
            };
            if let Some(value) = self.term(triple.object, depth + 1)? {
                object.insert(key.to_owned(), value);
            }
        }
        Ok(Value::Object(object))
    }

    fn list(&self, head: SubjectRef<'a>, depth: usize) -> Result<Value, StateError> {
        let mut items = Vec::new();
        let mut node = head;
        while let Some(first) = self.graph.object_for_subject_predicate(node, rdf::FIRST) {
            if items.len() >= self.graph.len() {
                return Err(StateError::InvalidGraph(format!("cyclic list at {node}")));
            }
            items.push(self.term(first, depth + 1)?.unwrap_or(Value::Null));
            node = match self.graph.object_for_subject_predicate(node, rdf::REST) {
                Some(TermRef::BlankNode(rest)) => rest.into(),
                Some(TermRef::NamedNode(rest)) if rest != rdf::NIL => rest.into(),
                _ => break,
            };
        }
        Ok(Value::Array(items))
    }
}

/// The last path segment of a key predicate.
fn property_key(predicate: &str) -> Option<&str> {
    let path = predicate.strip_prefix(json::KEY_BASE)?.strip_prefix('/')?;
    Some(path.rsplit('/').next().unwrap_or(path))
}

fn literal_value(literal: LiteralRef<'_>) -> Option<Value> {
    let datatype = literal.datatype();
    let value = literal.value();
    if datatype == xsd::STRING {
        Some(Value::String(value.to_owned()))
    } else if datatype == xsd::BOOLEAN {
        Some(Value::Bool(matches!(value, "true" | "1")))
    } else if datatype == xsd::INTEGER {
        value
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| value.parse::<u64>().map(Value::from))
            .ok()
            .or_else(|| parse_number(value).map(Value::from))
    } else if datatype == xsd::DOUBLE {
        parse_number(value).map(Value::from)
    } else {
        None
    }
}
