use semsearch_model::{
    Category, Conjunct, Coordinate, DateDeviation, Distance, DateRange, DisjunctValue, NamedNode, Query, Relation,
    RelationConjunct, Resource, SavedSearch, Search, TextConjunct, Variable, Year, YearDeviation,
    YearRange,
};
use semsearch_query::pattern::{append, join_all, map_select, map_where, parse_select};
use semsearch_query::{
    generate_select_query, ConjunctRef, Optimizer, QueryError, SearchCompiler, SearchConfig,
};
use spargebra::algebra::GraphPattern;
use std::error::Error;
use time::{Date, Month};

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

fn category(name: &str) -> Category {
    Category::new(iri(name), name)
}

fn relation(name: &str, domain: &str, range: &str) -> Relation {
    Relation::new(iri(name), name, category(domain), category(range))
}

fn resource(name: &str) -> DisjunctValue {
    DisjunctValue::Resource(Resource::new(iri(name), name))
}

fn subject() -> Variable {
    Variable::new_unchecked("subject")
}

fn config() -> Result<SearchConfig, serde_json::Error> {
    serde_json::from_str(
        r#"{
            "prefixes": {"ex": "http://example.com/"},
            "optimizer": "default",
            "categories": {
                "ex:Person": [
                    {"kind": "text", "queryPattern": "?subject ex:name ?name . FILTER(CONTAINS(?name, ?__value__))", "escapeLuceneSyntax": false}
                ],
                "ex:Date": [
                    {"kind": "date-range", "queryPattern": "?subject ex:created ?date . FILTER(?date >= ?__dateBeginValue__ && ?date <= ?__dateEndValue__)"}
                ]
            }
        }"#,
    )
}

fn select(pattern: GraphPattern) -> Result<Query, Box<dyn Error>> {
    let query = Query::Select {
        dataset: None,
        pattern: GraphPattern::Project {
            inner: Box::new(pattern),
            variables: vec![subject()],
        },
        base_iri: None,
    };
    // Whatever is generated has to survive a round trip through the SPARQL syntax.
    Ok(Query::parse(&query.to_string(), None)?)
}

#[test]
fn resource_disjuncts_become_a_union() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(
        relation("creator", "Painting", "Person"),
        [resource("Artist1"), resource("Artist2")],
    );

    let compiler = SearchCompiler::new(&config, &projection, &domain);
    let pattern = compiler
        .conjunct_to_query_pattern(ConjunctRef::from(&conjunct))?
        .ok_or("expected a pattern")?;
    let GraphPattern::Union { left, right } = &pattern else {
        panic!("expected a union, got {pattern}");
    };
    for (side, artist) in [(left, "Artist1"), (right, "Artist2")] {
        let GraphPattern::Bgp { patterns } = side.as_ref() else {
            panic!("expected a triple pattern, got {side}");
        };
        assert_eq!(patterns.len(), 1);
        assert_eq!(
            patterns[0].to_string(),
            format!("?subject <http://example.com/creator> <http://example.com/{artist}>")
        );
    }

    let base = parse_select("SELECT ?subject WHERE { ?subject a ex:Painting }", &config.prefixes)?;
    let query = map_select(base, |root| map_where(root, |inner| append(inner, pattern)))?;
    let query = Query::parse(&query.to_string(), None)?;
    let text = query.to_string();
    assert!(text.contains("<http://example.com/Painting>"), "{text}");
    assert!(text.contains("UNION"), "{text}");
    Ok(())
}

#[test]
fn single_disjunct_has_no_union() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(
        relation("creator", "Painting", "Person"),
        [resource("Artist1")],
    );
    let pattern = SearchCompiler::new(&config, &projection, &domain)
        .conjunct_to_query_pattern((&conjunct).into())?;
    assert!(matches!(pattern, Some(GraphPattern::Bgp { .. })));
    Ok(())
}

#[test]
fn empty_conjunct_contributes_nothing() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(relation("creator", "Painting", "Person"), []);
    let compiler = SearchCompiler::new(&config, &projection, &domain);
    assert!(compiler.conjunct_to_query_pattern((&conjunct).into())?.is_none());
    assert!(compiler
        .conjuncts_to_query_patterns([ConjunctRef::from(&conjunct)])?
        .is_empty());
    Ok(())
}

#[test]
fn set_disjunct_on_unconfigured_relation() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(
        relation("creator", "Painting", "Person"),
        [DisjunctValue::Set(Resource::new(iri("Favourites"), "Favourites"))],
    );
    let pattern = SearchCompiler::new(&config, &projection, &domain)
        .conjunct_to_query_pattern((&conjunct).into())?
        .ok_or("expected a pattern")?;
    let text = select(pattern)?.to_string();
    assert!(text.contains("<http://example.com/Favourites>"), "{text}");
    assert!(text.contains("<http://www.w3.org/ns/ldp#contains>"), "{text}");
    assert!(text.contains("<http://example.com/creator>"), "{text}");
    assert!(!text.contains("?__set__"), "{text}");
    Ok(())
}

#[test]
fn temporal_disjuncts_bind_date_literals() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let created = relation("created", "Painting", "Date");
    let conjunct = RelationConjunct::new(
        created.clone(),
        [DisjunctValue::YearRange(YearRange {
            begin: Year::bc(44),
            end: Year::ad(1650),
        })],
    );
    let compiler = SearchCompiler::new(&config, &projection, &domain);
    let pattern = compiler
        .conjunct_to_query_pattern((&conjunct).into())?
        .ok_or("expected a pattern")?;
    let text = select(pattern)?.to_string();
    assert!(text.contains("\"-0044-01-01\"^^<http://www.w3.org/2001/XMLSchema#date>"), "{text}");
    assert!(text.contains("\"1650-12-31\"^^<http://www.w3.org/2001/XMLSchema#date>"), "{text}");

    let conjunct = RelationConjunct::new(
        created,
        [DisjunctValue::DateRange(DateRange {
            begin: Date::from_calendar_date(1642, Month::January, 1)?,
            end: Date::from_calendar_date(1642, Month::June, 30)?,
        })],
    );
    let pattern = compiler
        .conjunct_to_query_pattern((&conjunct).into())?
        .ok_or("expected a pattern")?;
    let text = select(pattern)?.to_string();
    assert!(text.contains("\"1642-06-30\"^^<http://www.w3.org/2001/XMLSchema#date>"), "{text}");
    Ok(())
}

fn compile_created(value: DisjunctValue) -> Result<String, Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(relation("created", "Painting", "Date"), [value]);
    let pattern = SearchCompiler::new(&config, &projection, &domain)
        .conjunct_to_query_pattern((&conjunct).into())?
        .ok_or("expected a pattern")?;
    Ok(select(pattern)?.to_string())
}

fn xsd_date(value: &str) -> String {
    format!("\"{value}\"^^<http://www.w3.org/2001/XMLSchema#date>")
}

#[test]
fn deviations_widen_the_date_window() -> Result<(), Box<dyn Error>> {
    let text = compile_created(DisjunctValue::DateDeviation(DateDeviation {
        date: Date::from_calendar_date(2000, Month::January, 10)?,
        deviation: 10,
    }))?;
    assert!(text.contains(&xsd_date("1999-12-31")), "{text}");
    assert!(text.contains(&xsd_date("2000-01-20")), "{text}");

    let text = compile_created(DisjunctValue::Date(Date::from_calendar_date(
        1642,
        Month::January,
        14,
    )?))?;
    assert_eq!(text.matches(&xsd_date("1642-01-14")).count(), 2, "{text}");

    // 2 AD minus two years is year zero, which is written as 1 BC.
    let text = compile_created(DisjunctValue::YearDeviation(YearDeviation {
        year: Year::ad(2),
        deviation: 2,
    }))?;
    assert!(text.contains(&xsd_date("-0001-01-01")), "{text}");
    assert!(text.contains(&xsd_date("0004-12-31")), "{text}");
    Ok(())
}

#[test]
fn dates_out_of_range_are_errors() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Painting");
    let compiler = SearchCompiler::new(&config, &projection, &domain);
    let created = relation("created", "Painting", "Date");

    let huge_deviation: DateDeviation =
        serde_json::from_str(r#"{"date": "2000-01-01", "deviation": 100000000000000000}"#)?;
    let beyond_calendar: DateDeviation =
        serde_json::from_str(r#"{"date": "2000-01-01", "deviation": 1000000000}"#)?;
    let values = [
        DisjunctValue::DateDeviation(huge_deviation),
        DisjunctValue::DateDeviation(beyond_calendar),
        DisjunctValue::Year(Year::bc(i32::MIN)),
        DisjunctValue::YearRange(YearRange {
            begin: Year::bc(i32::MIN),
            end: Year::ad(1),
        }),
        DisjunctValue::YearDeviation(YearDeviation {
            year: Year::ad(i32::MAX),
            deviation: 1,
        }),
    ];
    for value in values {
        let conjunct = RelationConjunct::new(created.clone(), [value.clone()]);
        let result = compiler.conjunct_to_query_pattern((&conjunct).into());
        assert!(
            matches!(result, Err(QueryError::DateOutOfRange(_))),
            "{value:?} gave {result:?}"
        );
    }
    Ok(())
}

#[test]
fn set_membership_comes_before_the_configured_relation_pattern() -> Result<(), Box<dyn Error>> {
    let config: SearchConfig = serde_json::from_str(
        r#"{"relations": {"http://example.com/creator": [
            {"kind": "resource", "queryPattern": "?subject <http://example.com/creator> ?__value__ ."}
        ]}}"#,
    )?;
    let search = Search::new(
        category("Painting"),
        [Conjunct::from(RelationConjunct::new(
            relation("creator", "Painting", "Person"),
            [DisjunctValue::Set(Resource::new(iri("Favourites"), "Favourites"))],
        ))],
    );
    let query = generate_select_query(&config, &subject(), &search)?;
    let text = Query::parse(&query.to_string(), None)?.to_string();
    let set = text
        .find("<http://www.w3.org/ns/ldp#contains>")
        .ok_or("missing set membership")?;
    let favourites = text
        .find("<http://example.com/Favourites>")
        .ok_or("missing set")?;
    let relation = text
        .find("?subject <http://example.com/creator>")
        .ok_or("missing relation pattern")?;
    assert!(favourites < set && set < relation, "{text}");
    assert!(text.contains("<http://www.metaphacts.com/ontologies/platform#setItem>"), "{text}");
    Ok(())
}

#[test]
fn distance_is_bound_as_plain_literals() -> Result<(), Box<dyn Error>> {
    let config: SearchConfig = serde_json::from_str(
        r#"{"relations": {"http://example.com/location": [{
            "kind": "place",
            "distanceQueryPattern": "?subject <http://example.com/location> ?point . FILTER(<http://example.com/near>(?point, ?__mapCenter__, ?__mapDistance__))",
            "boundingBoxQueryPattern": "?subject <http://example.com/location> ?point ."
        }]}}"#,
    )?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(
        relation("location", "Painting", "Place"),
        [DisjunctValue::Distance(Distance {
            center: Coordinate {
                lat: 52.37,
                long: 4.89,
            },
            distance: 10.0,
        })],
    );
    let pattern = SearchCompiler::new(&config, &projection, &domain)
        .conjunct_to_query_pattern((&conjunct).into())?
        .ok_or("expected a pattern")?;
    let text = select(pattern)?.to_string();
    assert!(text.contains("\"52.37#4.89\""), "{text}");
    assert!(text.contains("\"10\""), "{text}");
    assert!(!text.contains("XMLSchema#integer"), "{text}");
    Ok(())
}

#[test]
fn text_conjunct_uses_category_text_pattern() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let projection = subject();
    let domain = category("Person");
    let conjunct = TextConjunct::new(category("Person"), ["Rembrandt".to_owned()]);
    let pattern = SearchCompiler::new(&config, &projection, &domain)
        .conjunct_to_query_pattern((&conjunct).into())?
        .ok_or("expected a pattern")?;
    let text = select(pattern)?.to_string();
    assert!(text.contains("\"Rembrandt\""), "{text}");
    assert!(text.contains("<http://example.com/name>"), "{text}");
    Ok(())
}

#[test]
fn nested_search_is_joined_on_the_value() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let nested = Search::new(
        category("Person"),
        [Conjunct::from(RelationConjunct::new(
            relation("birthPlace", "Person", "Place"),
            [resource("London")],
        ))],
    );
    let search = Search::new(
        category("Painting"),
        [Conjunct::from(RelationConjunct::new(
            relation("creator", "Painting", "Person"),
            [DisjunctValue::Search(Box::new(nested))],
        ))],
    );
    let query = generate_select_query(&config, &subject(), &search)?;
    let query = Query::parse(&query.to_string(), None)?;
    let text = query.to_string();
    assert!(text.contains("<http://example.com/birthPlace> <http://example.com/London>"), "{text}");
    assert!(text.contains("?subject <http://example.com/creator> ?__value___"), "{text}");
    Ok(())
}

#[test]
fn saved_search_becomes_a_sub_select() -> Result<(), Box<dyn Error>> {
    let config = config()?;
    let saved = SavedSearch {
        iri: iri("saved/1"),
        label: "Londoners".to_owned(),
        query: Query::parse(
            "SELECT DISTINCT ?person WHERE { ?person <http://example.com/birthPlace> <http://example.com/London> }",
            None,
        )?,
    };
    let search = Search::new(
        category("Painting"),
        [Conjunct::from(RelationConjunct::new(
            relation("creator", "Painting", "Person"),
            [DisjunctValue::SavedSearch(saved)],
        ))],
    );
    let query = generate_select_query(&config, &subject(), &search)?;
    let text = Query::parse(&query.to_string(), None)?.to_string();
    assert!(!text.contains("?person "), "{text}");
    assert_eq!(text.matches("SELECT").count(), 2, "{text}");
    Ok(())
}

#[test]
fn select_query_with_blazegraph_hint() -> Result<(), Box<dyn Error>> {
    let mut config = config()?;
    config.optimizer = Optimizer::Blazegraph;
    config.limit = 20;
    let search = Search::new(
        category("Painting"),
        [Conjunct::from(RelationConjunct::new(
            relation("creator", "Painting", "Person"),
            [resource("Artist1")],
        ))],
    );
    let query = generate_select_query(&config, &subject(), &search)?;
    let text = Query::parse(&query.to_string(), None)?.to_string();
    assert!(text.starts_with("SELECT DISTINCT ?subject"), "{text}");
    assert!(text.contains("<http://www.bigdata.com/queryHints#optimizer> \"None\""), "{text}");
    assert!(text.contains("LIMIT 20"), "{text}");
    Ok(())
}

#[test]
fn compiled_patterns_do_not_share_variables() -> Result<(), Box<dyn Error>> {
    let config: SearchConfig = serde_json::from_str(
        r#"{"relations": {"http://example.com/creator": [
            {"kind": "resource", "queryPattern": "?subject <http://example.com/creator> ?artist . ?artist <http://example.com/sameAs> ?__value__ ."}
        ]}}"#,
    )?;
    let projection = subject();
    let domain = category("Painting");
    let conjunct = RelationConjunct::new(
        relation("creator", "Painting", "Person"),
        [resource("Artist1")],
    );
    let compiler = SearchCompiler::new(&config, &projection, &domain);
    let patterns = compiler.conjuncts_to_query_patterns([
        ConjunctRef::from(&conjunct),
        ConjunctRef::from(&conjunct),
    ])?;
    let variables = patterns
        .iter()
        .map(|pattern| {
            let mut variables = Vec::new();
            pattern.on_in_scope_variable(|v| variables.push(v.clone()));
            variables
        })
        .collect::<Vec<_>>();
    assert!(variables[0].contains(&projection));
    assert!(variables[1].contains(&projection));
    assert_eq!(variables[0].len(), 2);
    assert!(variables[0]
        .iter()
        .filter(|v| **v != projection)
        .all(|v| !variables[1].contains(v)));

    select(join_all(patterns))?;
    Ok(())
}
