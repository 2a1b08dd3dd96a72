use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Subject, Term, Triple};
use semsearch_model::vocab::json;
use semsearch_state::{graph_to_json, json_to_graph};
use serde_json::{json, Value};
use std::error::Error;

fn document() -> Value {
    json!([
        {"abc": [123, 3.14, "str"], "def": "abc"},
        {"123": [3.14, {}], "def": true}
    ])
}

fn key(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{}/{name}", json::KEY_BASE))
}

fn bnode(id: &str) -> BlankNode {
    BlankNode::new_unchecked(id)
}

fn add(graph: &mut Graph, s: impl Into<Subject>, p: impl Into<NamedNode>, o: impl Into<Term>) {
    graph.insert(&Triple::new(s, p, o));
}

fn nil() -> NamedNode {
    NamedNodeRef::into_owned(rdf::NIL)
}

#[test]
fn documents_survive_the_graph() -> Result<(), Box<dyn Error>> {
    let document = document();
    let pointed = json_to_graph(&document)?;
    assert_eq!(graph_to_json(pointed.pointer.as_ref(), &pointed.graph)?, document);
    Ok(())
}

#[test]
fn hand_written_graphs_are_read() -> Result<(), Box<dyn Error>> {
    let root = NamedNode::new_unchecked("http://root.org");
    let mut g = Graph::new();
    add(&mut g, root.clone(), rdf::FIRST, bnode("0"));
    add(&mut g, root.clone(), rdf::REST, bnode("r0"));
    add(&mut g, bnode("r0"), rdf::FIRST, bnode("1"));
    add(&mut g, bnode("r0"), rdf::REST, nil());

    add(&mut g, bnode("0"), key("abc"), bnode("abc"));
    add(&mut g, bnode("0"), key("def"), Literal::new_simple_literal("abc"));
    add(&mut g, bnode("1"), key("123"), bnode("n123"));
    add(&mut g, bnode("1"), key("def"), Literal::from(true));

    add(&mut g, bnode("abc"), rdf::FIRST, Literal::new_typed_literal("123", xsd::INTEGER));
    add(&mut g, bnode("abc"), rdf::REST, bnode("abc0"));
    add(&mut g, bnode("abc0"), rdf::FIRST, Literal::new_typed_literal("3.14", xsd::DOUBLE));
    add(&mut g, bnode("abc0"), rdf::REST, bnode("abc1"));
    add(&mut g, bnode("abc1"), rdf::FIRST, Literal::new_simple_literal("str"));
    add(&mut g, bnode("abc1"), rdf::REST, nil());

    add(&mut g, bnode("n123"), rdf::FIRST, Literal::new_typed_literal("3.14", xsd::DOUBLE));
    add(&mut g, bnode("n123"), rdf::REST, bnode("n1230"));
    add(&mut g, bnode("n1230"), rdf::FIRST, bnode("n1231"));
    add(&mut g, bnode("n1230"), rdf::REST, nil());

    assert_eq!(graph_to_json(root.as_ref().into(), &g)?, document());
    Ok(())
}

#[test]
fn unsupported_literals_are_skipped() -> Result<(), Box<dyn Error>> {
    let root = bnode("root");
    let mut g = Graph::new();
    add(&mut g, root.clone(), key("kept"), Literal::new_simple_literal("yes"));
    add(
        &mut g,
        root.clone(),
        key("dropped"),
        Literal::new_language_tagged_literal_unchecked("ja", "en"),
    );
    assert_eq!(graph_to_json(root.as_ref().into(), &g)?, json!({"kept": "yes"}));
    Ok(())
}

#[test]
fn cyclic_graphs_are_rejected() {
    let root = bnode("root");
    let mut g = Graph::new();
    add(&mut g, root.clone(), key("self"), root.clone());
    assert!(graph_to_json(root.as_ref().into(), &g).is_err());
}
