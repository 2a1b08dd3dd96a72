use crate::{
    SerializedConjunct, SerializedConjunctBody, SerializedSearch, SerializedState, StateError,
};
use semsearch_model::{
    format_xsd_date, parse_date, Category, Conjunct, ConjunctIndex, Disjunct, DisjunctIndex,
    DisjunctKind, DisjunctValue, FacetAst, ModelError, NamedNode, Prefixes, Relation,
    RelationConjunct, Search, SearchProfileStore, TextConjunct, TextDisjunct,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque per-component result state (paging, sorting, ...), keyed by component id.
pub type ResultState = BTreeMap<String, Value>;

/// Everything a search session persists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawState {
    pub search: Option<Search>,
    pub facet: Option<FacetAst>,
    pub result: ResultState,
}

/// Writes search states in their persisted JSON shape, compacting IRIs with `prefixes`.
#[derive(Clone, Copy, Debug)]
pub struct Serializer<'a> {
    prefixes: &'a Prefixes,
}

impl<'a> Serializer<'a> {
    pub fn new(prefixes: &'a Prefixes) -> Self {
        Self { prefixes }
    }

    pub fn serialize_state(&self, state: &RawState) -> Result<SerializedState, StateError> {
        Ok(SerializedState {
            search: state
                .search
                .as_ref()
                .map(|search| self.serialize_search(search))
                .transpose()?,
            facet: state
                .facet
                .as_ref()
                .map(|facet| self.serialize_facet(facet))
                .transpose()?,
            result: Some(serde_json::to_value(&state.result)?),
        })
    }

    pub fn serialize_search(&self, search: &Search) -> Result<SerializedSearch, StateError> {
        Ok(SerializedSearch {
            domain: self.compact(&search.domain.iri),
            conjuncts: search
                .conjuncts
                .iter()
                .map(|conjunct| match conjunct {
                    Conjunct::Relation(conjunct) => self.serialize_relation_conjunct(conjunct),
                    Conjunct::Text(conjunct) => Ok(self.serialize_text_conjunct(conjunct)),
                })
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn serialize_facet(&self, ast: &FacetAst) -> Result<Vec<SerializedConjunct>, StateError> {
        ast.conjuncts
            .iter()
            .map(|conjunct| self.serialize_relation_conjunct(conjunct))
            .collect()
    }

    fn serialize_relation_conjunct(
        &self,
        conjunct: &RelationConjunct,
    ) -> Result<SerializedConjunct, StateError> {
        let disjuncts = conjunct
            .disjuncts
            .iter()
            .map(|disjunct| self.serialize_disjunct(disjunct))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SerializedConjunct {
            unique_id: conjunct.unique_id,
            relation: Some(SerializedConjunctBody {
                range: self.compact(&conjunct.range.iri),
                relation: Some(self.compact(&conjunct.relation.iri)),
                disjuncts: Some(Value::Array(disjuncts)),
            }),
            text: None,
        })
    }

    fn serialize_text_conjunct(&self, conjunct: &TextConjunct) -> SerializedConjunct {
        SerializedConjunct {
            unique_id: conjunct.unique_id,
            relation: None,
            text: Some(SerializedConjunctBody {
                range: self.compact(&conjunct.range.iri),
                relation: None,
                disjuncts: Some(Value::Array(
                    conjunct
                        .disjuncts
                        .iter()
                        .map(|d| Value::String(d.value.clone()))
                        .collect(),
                )),
            }),
        }
    }

    /// `[kind, value]`.
    fn serialize_disjunct(&self, disjunct: &Disjunct) -> Result<Value, StateError> {
        let value = match &disjunct.value {
            DisjunctValue::Resource(resource) | DisjunctValue::Set(resource) => to_value(resource)?,
            DisjunctValue::Search(search) => to_value(&self.serialize_search(search)?)?,
            DisjunctValue::SavedSearch(saved) => to_value(saved)?,
            DisjunctValue::Date(date) => Value::String(format_xsd_date(*date)),
            DisjunctValue::DateRange(range) => to_value(range)?,
            DisjunctValue::DateDeviation(deviation) => to_value(deviation)?,
            DisjunctValue::Year(year) => to_value(year)?,
            DisjunctValue::YearRange(range) => to_value(range)?,
            DisjunctValue::YearDeviation(deviation) => to_value(deviation)?,
            DisjunctValue::Text(text) => Value::String(text.clone()),
            DisjunctValue::Distance(distance) => to_value(distance)?,
            DisjunctValue::BoundingBox(bbox) => to_value(bbox)?,
            DisjunctValue::Literal(literal) => to_value(literal)?,
            DisjunctValue::NumericRange(range) => to_value(range)?,
        };
        Ok(Value::Array(vec![
            Value::String(disjunct.kind().as_str().to_owned()),
            value,
        ]))
    }

    fn compact(&self, iri: &NamedNode) -> String {
        self.prefixes.compact(iri.as_ref())
    }
}

fn to_value(value: &impl Serialize) -> Result<Value, StateError> {
    Ok(serde_json::to_value(value)?)
}

/// Restores search states, resolving every category and relation against a profile store.
///
/// Restoring fails as soon as a reference cannot be resolved: a state from another profile is
/// rejected instead of being restored partially.
#[derive(Clone, Copy, Debug)]
pub struct Deserializer<'a> {
    profile: &'a SearchProfileStore,
    prefixes: &'a Prefixes,
}

impl<'a> Deserializer<'a> {
    pub fn new(profile: &'a SearchProfileStore, prefixes: &'a Prefixes) -> Self {
        Self { profile, prefixes }
    }

    /// A state without a search restores to the empty state.
    pub fn deserialize_state(&self, state: SerializedState) -> Result<RawState, StateError> {
        let Some(search) = state.search else {
            return Ok(RawState::default());
        };
        let result = match state.result {
            Some(Value::Object(result)) => result.into_iter().collect(),
            _ => ResultState::new(),
        };
        Ok(RawState {
            search: Some(self.deserialize_search(search)?),
            facet: state
                .facet
                .map(|facet| self.deserialize_facet(facet))
                .transpose()?,
            result,
        })
    }

    pub fn deserialize_search(&self, search: SerializedSearch) -> Result<Search, StateError> {
        Ok(Search {
            domain: self.category(&search.domain)?,
            conjuncts: search
                .conjuncts
                .into_iter()
                .enumerate()
                .map(|(index, conjunct)| self.deserialize_conjunct(conjunct, index))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn deserialize_facet(
        &self,
        facet: Vec<SerializedConjunct>,
    ) -> Result<FacetAst, StateError> {
        let conjuncts = facet
            .into_iter()
            .enumerate()
            .map(|(index, conjunct)| -> Result<_, StateError> {
                match self.deserialize_conjunct(conjunct, index)? {
                    Conjunct::Relation(conjunct) => Ok(conjunct),
                    Conjunct::Text(_) => Err(StateError::UnexpectedFacetConjunct("Text")),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(FacetAst { conjuncts })
    }

    fn deserialize_conjunct(
        &self,
        conjunct: SerializedConjunct,
        index: usize,
    ) -> Result<Conjunct, StateError> {
        if let Some(body) = conjunct.relation {
            let Some(Value::Array(disjuncts)) = body.disjuncts else {
                return Err(StateError::InvalidRelationDisjuncts);
            };
            Ok(Conjunct::Relation(RelationConjunct {
                unique_id: conjunct.unique_id,
                relation: self.relation(body.relation.as_deref().unwrap_or_default())?,
                range: self.category(&body.range)?,
                index: ConjunctIndex(index),
                disjuncts: disjuncts
                    .into_iter()
                    .enumerate()
                    .map(|(i, disjunct)| -> Result<_, StateError> {
                        Ok(Disjunct {
                            index: DisjunctIndex::new(index, i),
                            value: self.deserialize_disjunct(disjunct)?,
                        })
                    })
                    .collect::<Result<_, _>>()?,
            }))
        } else if let Some(body) = conjunct.text {
            let Some(Value::Array(disjuncts)) = body.disjuncts else {
                return Err(StateError::InvalidTextDisjuncts);
            };
            Ok(Conjunct::Text(TextConjunct {
                unique_id: conjunct.unique_id,
                range: self.category(&body.range)?,
                index: ConjunctIndex(index),
                disjuncts: disjuncts
                    .into_iter()
                    .enumerate()
                    .map(|(i, disjunct)| match disjunct {
                        Value::String(value) => Ok(TextDisjunct {
                            index: DisjunctIndex::new(index, i),
                            value,
                        }),
                        _ => Err(StateError::InvalidTextDisjunct),
                    })
                    .collect::<Result<_, _>>()?,
            }))
        } else {
            Err(StateError::InvalidConjunct)
        }
    }

    fn deserialize_disjunct(&self, disjunct: Value) -> Result<DisjunctValue, StateError> {
        let Value::Array(pair) = disjunct else {
            return Err(StateError::InvalidRelationDisjunct);
        };
        let Ok([Value::String(kind), value]) = <[Value; 2]>::try_from(pair) else {
            return Err(StateError::InvalidRelationDisjunct);
        };
        let kind = kind.parse::<DisjunctKind>()?;
        Ok(match kind {
            DisjunctKind::Resource => DisjunctValue::Resource(from_value(kind, value)?),
            DisjunctKind::Set => DisjunctValue::Set(from_value(kind, value)?),
            DisjunctKind::Search => DisjunctValue::Search(Box::new(
                self.deserialize_search(from_value(kind, value)?)?,
            )),
            DisjunctKind::SavedSearch => DisjunctValue::SavedSearch(from_value(kind, value)?),
            DisjunctKind::Date => {
                DisjunctValue::Date(parse_date(&from_value::<String>(kind, value)?)?)
            }
            DisjunctKind::DateRange => DisjunctValue::DateRange(from_value(kind, value)?),
            DisjunctKind::DateDeviation => DisjunctValue::DateDeviation(from_value(kind, value)?),
            DisjunctKind::Year => DisjunctValue::Year(from_value(kind, value)?),
            DisjunctKind::YearRange => DisjunctValue::YearRange(from_value(kind, value)?),
            DisjunctKind::YearDeviation => DisjunctValue::YearDeviation(from_value(kind, value)?),
            DisjunctKind::Text => DisjunctValue::Text(from_value(kind, value)?),
            DisjunctKind::Distance => DisjunctValue::Distance(from_value(kind, value)?),
            DisjunctKind::BoundingBox => DisjunctValue::BoundingBox(from_value(kind, value)?),
            DisjunctKind::Literal => DisjunctValue::Literal(from_value(kind, value)?),
            DisjunctKind::NumericRange => DisjunctValue::NumericRange(from_value(kind, value)?),
        })
    }

    fn category(&self, iri: &str) -> Result<Category, StateError> {
        if iri.is_empty() {
            return Err(ModelError::EmptyCategoryIri.into());
        }
        let iri = self.prefixes.expand(iri)?;
        Ok(self.profile.category(&iri)?.clone())
    }

    fn relation(&self, iri: &str) -> Result<Relation, StateError> {
        if iri.is_empty() {
            return Err(ModelError::EmptyRelationIri.into());
        }
        let iri = self.prefixes.expand(iri)?;
        Ok(self.profile.relation(&iri)?.clone())
    }
}

fn from_value<T: DeserializeOwned>(kind: DisjunctKind, value: Value) -> Result<T, StateError> {
    serde_json::from_value(value).map_err(|source| StateError::InvalidDisjunctValue { kind, source })
}
