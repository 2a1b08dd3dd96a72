//! Key renaming that shrinks serialized states before compression.
//!
//! Well-known keys are replaced by short aliases. Keys that start with the escape marker `@` or
//! that are themselves an alias get the marker prepended, so unpacking can tell them apart.
//! Keys outside the table pass through unchanged.

use serde_json::{Map, Value};

const ESCAPE: char = '@';

/// Full key and its alias. Part of the persisted token format: only ever append.
const ALIASES: [(&str, &str); 11] = [
    ("search", "s"),
    ("facet", "f"),
    ("type", "t"),
    ("domain", "do"),
    ("range", "ra"),
    ("relation", "re"),
    ("text", "te"),
    ("conjuncts", "c"),
    ("disjuncts", "d"),
    ("#type", "T"),
    ("#value", "V"),
];

fn alias(key: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find_map(|(full, alias)| (*full == key).then_some(*alias))
}

fn full_key(alias: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find_map(|(full, a)| (*a == alias).then_some(*full))
}

pub fn pack_state(state: Value) -> Value {
    map_keys(state, &|key| {
        if key.starts_with(ESCAPE) || full_key(&key).is_some() {
            format!("{ESCAPE}{key}")
        } else {
            alias(&key).map_or(key, str::to_owned)
        }
    })
}

pub fn unpack_state(state: Value) -> Value {
    map_keys(state, &|key| match key.strip_prefix(ESCAPE) {
        Some(raw) => raw.to_owned(),
        None => full_key(&key).map_or(key, str::to_owned),
    })
}

fn map_keys(value: Value, mapper: &impl Fn(String) -> String) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_keys(item, mapper)).collect())
        }
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .map(|(key, value)| (mapper(key), map_keys(value, mapper)))
                .collect::<Map<_, _>>(),
        ),
        value => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn known_keys_are_aliased() {
        let packed = pack_state(json!({
            "search": {"domain": "ex:Person", "conjuncts": [{"relation": {"range": "ex:Place"}}]},
            "result": {}
        }));
        assert_eq!(
            packed,
            json!({
                "s": {"do": "ex:Person", "c": [{"re": {"ra": "ex:Place"}}]},
                "result": {}
            })
        );
    }

    #[test]
    fn colliding_keys_are_escaped() {
        let state = json!({
            "s": 1,
            "@s": 2,
            "@@": [{"do": "x", "domain": "y", "T": null}],
            "#value": "v",
            "uniqueId": 3
        });
        let packed = pack_state(state.clone());
        assert_eq!(
            packed,
            json!({
                "@s": 1,
                "@@s": 2,
                "@@@": [{"@do": "x", "do": "y", "@T": null}],
                "V": "v",
                "uniqueId": 3
            })
        );
        assert_eq!(unpack_state(packed), state);
    }
}
