use crate::ModelError;
use oxrdf::{NamedNode, NamedNodeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Namespace prefixes used to compact IRIs in the persisted search state and to resolve prefixed
/// names in query templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prefixes(BTreeMap<String, String>);

impl Default for Prefixes {
    fn default() -> Self {
        Self::empty()
            .with("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#")
            .with("rdfs", "http://www.w3.org/2000/01/rdf-schema#")
            .with("owl", "http://www.w3.org/2002/07/owl#")
            .with("xsd", "http://www.w3.org/2001/XMLSchema#")
            .with("ldp", "http://www.w3.org/ns/ldp#")
            .with("Platform", "http://www.metaphacts.com/ontologies/platform#")
            .with("hint", "http://www.bigdata.com/queryHints#")
    }
}

impl Prefixes {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn with(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.insert(prefix, namespace);
        self
    }

    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.0.insert(prefix.into(), namespace.into());
    }

    /// Adds all prefixes of `other`, overriding existing ones with the same name.
    pub fn extend(&mut self, other: &Prefixes) {
        self.0
            .extend(other.0.iter().map(|(p, ns)| (p.clone(), ns.clone())));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Writes `iri` as `prefix:local` using the longest matching namespace, or as `<iri>` when no
    /// namespace yields a valid local name.
    pub fn compact(&self, iri: NamedNodeRef<'_>) -> String {
        let iri = iri.as_str();
        self.0
            .iter()
            .filter_map(|(prefix, namespace)| {
                let local = iri.strip_prefix(namespace.as_str())?;
                is_local_name(local).then_some((prefix, namespace.len(), local))
            })
            .max_by_key(|(_, len, _)| *len)
            .map_or_else(
                || format!("<{iri}>"),
                |(prefix, _, local)| format!("{prefix}:{local}"),
            )
    }

    /// Resolves `<iri>`, `prefix:local` or a bare absolute IRI.
    pub fn expand(&self, name: &str) -> Result<NamedNode, ModelError> {
        let name = name.trim();
        if let Some(iri) = name.strip_prefix('<').and_then(|n| n.strip_suffix('>')) {
            return Ok(NamedNode::new(iri)?);
        }
        let Some((prefix, local)) = name.split_once(':') else {
            return Err(ModelError::UnknownPrefix {
                prefix: String::new(),
                name: name.to_owned(),
            });
        };
        match self.0.get(prefix) {
            Some(namespace) => Ok(NamedNode::new(format!("{namespace}{local}"))?),
            None if local.starts_with("//") => Ok(NamedNode::new(name)?),
            None => Err(ModelError::UnknownPrefix {
                prefix: prefix.to_owned(),
                name: name.to_owned(),
            }),
        }
    }

    /// The `PREFIX` declarations for all namespaces, to be put in front of a query template.
    pub fn sparql_prologue(&self) -> String {
        self.0
            .iter()
            .map(|(prefix, namespace)| format!("PREFIX {prefix}: <{namespace}>\n"))
            .collect()
    }
}

fn is_local_name(local: &str) -> bool {
    !local.ends_with('.')
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
