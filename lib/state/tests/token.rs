use semsearch_model::{
    Category, Conjunct, DateRange, DisjunctValue, FacetAst, Literal, LiteralValue, NamedNode,
    NumericRange, Prefixes, Relation, RelationConjunct, Resource, Search, SearchProfileStore,
    TextConjunct, Year, YearRange,
};
use semsearch_state::{
    decode_state, encode_state, state_from_token, state_to_token, RawState, Serializer,
};
use serde_json::json;
use std::error::Error;
use time::{Date, Month};

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

struct Fixture {
    profile: SearchProfileStore,
    prefixes: Prefixes,
    person: Category,
    birth_place: Relation,
    birth_date: Relation,
    height: Relation,
    active: Relation,
    nickname: Relation,
}

fn fixture() -> Fixture {
    let person = Category::new(iri("Person"), "Person");
    let place = Category::new(iri("Place"), "Place");
    let date = Category::new(iri("Date"), "Date");
    let number = Category::new(iri("Number"), "Number");
    let text = Category::new(iri("Text"), "Text");
    let birth_place = Relation::new(iri("birthPlace"), "born in", person.clone(), place.clone());
    let birth_date = Relation::new(iri("birthDate"), "born on", person.clone(), date.clone());
    let height = Relation::new(iri("height"), "height", person.clone(), number.clone());
    let active = Relation::new(iri("active"), "active", person.clone(), date.clone());
    let nickname = Relation::new(iri("nickname"), "nickname", person.clone(), text.clone());
    Fixture {
        profile: SearchProfileStore::new(
            [person.clone(), place, date, number, text],
            [
                birth_place.clone(),
                birth_date.clone(),
                height.clone(),
                active.clone(),
                nickname.clone(),
            ],
        ),
        prefixes: Prefixes::default().with("ex", "http://example.com/"),
        person,
        birth_place,
        birth_date,
        height,
        active,
        nickname,
    }
}

fn state(fixture: &Fixture) -> Result<RawState, Box<dyn Error>> {
    let search = Search::new(
        fixture.person.clone(),
        [
            Conjunct::from(RelationConjunct::new(
                fixture.birth_place.clone(),
                [
                    DisjunctValue::Resource(Resource::new(iri("London"), "London")),
                    DisjunctValue::Resource(Resource::new(iri("Paris"), "Paris")),
                ],
            )),
            Conjunct::from(RelationConjunct::new(
                fixture.birth_date.clone(),
                [DisjunctValue::DateRange(DateRange {
                    begin: Date::from_calendar_date(1880, Month::March, 1)?,
                    end: Date::from_calendar_date(1899, Month::December, 31)?,
                })],
            )),
            Conjunct::from(TextConjunct::new(
                fixture.person.clone(),
                ["Rembrandt".to_owned()],
            )),
        ],
    );
    let facet = FacetAst::new([
        RelationConjunct::new(
            fixture.height.clone(),
            [DisjunctValue::NumericRange(NumericRange::new(1.5, 2.0))],
        ),
        RelationConjunct::new(
            fixture.active.clone(),
            [DisjunctValue::YearRange(YearRange {
                begin: Year::bc(44),
                end: Year::ad(14),
            })],
        ),
        RelationConjunct::new(
            fixture.nickname.clone(),
            [DisjunctValue::Literal(LiteralValue::new(
                Literal::new_simple_literal("Rembrandt"),
            ))],
        ),
    ]);
    Ok(RawState {
        search: Some(search),
        facet: Some(facet),
        result: [("table".to_owned(), json!({"page": 2, "sort": "label"}))]
            .into_iter()
            .collect(),
    })
}

#[test]
fn states_survive_the_token() -> Result<(), Box<dyn Error>> {
    let fixture = fixture();
    let state = state(&fixture)?;
    let token = state_to_token(&fixture.prefixes, &state)?;
    let restored = state_from_token(&fixture.profile, &fixture.prefixes, &token)?;
    assert_eq!(restored, state);
    Ok(())
}

#[test]
fn iris_are_compacted() -> Result<(), Box<dyn Error>> {
    let fixture = fixture();
    let serialized = Serializer::new(&fixture.prefixes).serialize_state(&state(&fixture)?)?;
    let search = serialized.search.ok_or("search missing")?;
    assert_eq!(search.domain, "ex:Person");
    let first = search.conjuncts[0].relation.as_ref().ok_or("relation missing")?;
    assert_eq!(first.range, "ex:Place");
    assert_eq!(first.relation.as_deref(), Some("ex:birthPlace"));
    let second = search.conjuncts[1].relation.as_ref().ok_or("relation missing")?;
    assert_eq!(
        second.disjuncts,
        Some(json!([["DateRange", {"begin": "1880-03-01", "end": "1899-12-31"}]]))
    );
    Ok(())
}

#[test]
fn tokens_decode_to_the_serialized_shape() -> Result<(), Box<dyn Error>> {
    let fixture = fixture();
    let serialized = Serializer::new(&fixture.prefixes).serialize_state(&state(&fixture)?)?;
    let token = encode_state(&serialized)?;
    assert_eq!(decode_state(&token)?, serialized);
    Ok(())
}

#[test]
fn states_from_another_profile_are_rejected() -> Result<(), Box<dyn Error>> {
    let fixture = fixture();
    let token = state_to_token(&fixture.prefixes, &state(&fixture)?)?;
    let other = SearchProfileStore::new([fixture.person.clone()], []);
    let error = state_from_token(&other, &fixture.prefixes, &token)
        .err()
        .map(|e| e.to_string());
    assert_eq!(
        error.as_deref(),
        Some("Relation not found: http://example.com/birthPlace")
    );
    Ok(())
}
