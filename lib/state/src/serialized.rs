//! The JSON shape of a persisted search state.
//!
//! This shape is a persisted contract: tokens in shared links are decoded against it, so fields
//! may only be added.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SerializedSearch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet: Option<Vec<SerializedConjunct>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedSearch {
    /// Compacted IRI of the domain category.
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub conjuncts: Vec<SerializedConjunct>,
}

/// A conjunct, with exactly one of `relation` and `text` set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedConjunct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<SerializedConjunctBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<SerializedConjunctBody>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SerializedConjunctBody {
    /// Compacted IRI of the range category.
    #[serde(default)]
    pub range: String,
    /// Compacted IRI of the relation, for relation conjuncts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// `[kind, value]` pairs for relation conjuncts, plain strings for text conjuncts. Kept as
    /// JSON so that malformed entries are reported by the deserializer.
    #[serde(default)]
    pub disjuncts: Option<Value>,
}
