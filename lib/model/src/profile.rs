use crate::{ModelError, Prefixes, Tuple};
use oxrdf::NamedNode;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A searchable concept, usually an RDF class.
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub iri: NamedNode,
    pub label: String,
    pub thumbnail: Option<String>,
    pub tuple: Tuple,
}

impl Category {
    pub fn new(iri: NamedNode, label: impl Into<String>) -> Self {
        Self {
            iri,
            label: label.into(),
            thumbnail: None,
            tuple: Tuple::new(),
        }
    }
}

/// A property that connects instances of one category with instances of another.
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    pub iri: NamedNode,
    pub label: String,
    pub has_domain: Category,
    pub has_range: Category,
    pub tuple: Tuple,
}

impl Relation {
    pub fn new(
        iri: NamedNode,
        label: impl Into<String>,
        has_domain: Category,
        has_range: Category,
    ) -> Self {
        Self {
            iri,
            label: label.into(),
            has_domain,
            has_range,
            tuple: Tuple::new(),
        }
    }
}

pub type Categories = BTreeMap<NamedNode, Category>;
pub type Relations = BTreeMap<NamedNode, Relation>;

/// The categories and relations of one search profile.
///
/// The store is read-only once built. Deserializing a search state resolves every IRI against
/// it and fails for IRIs it does not know.
#[derive(Clone, Debug, Default)]
pub struct SearchProfileStore {
    categories: Categories,
    relations: Relations,
}

impl SearchProfileStore {
    pub fn new(
        categories: impl IntoIterator<Item = Category>,
        relations: impl IntoIterator<Item = Relation>,
    ) -> Self {
        Self {
            categories: categories.into_iter().map(|c| (c.iri.clone(), c)).collect(),
            relations: relations.into_iter().map(|r| (r.iri.clone(), r)).collect(),
        }
    }

    /// Builds the store from its JSON definition, expanding prefixed names with `prefixes`.
    pub fn from_definition(
        definition: &ProfileDefinition,
        prefixes: &Prefixes,
    ) -> Result<Self, ModelError> {
        let categories = definition
            .categories
            .iter()
            .map(|c| {
                let mut category = Category::new(prefixes.expand(&c.iri)?, c.label.clone());
                category.thumbnail.clone_from(&c.thumbnail);
                Ok((category.iri.clone(), category))
            })
            .collect::<Result<Categories, ModelError>>()?;

        let lookup = |name: &str| -> Result<Category, ModelError> {
            let iri = prefixes.expand(name)?;
            categories
                .get(&iri)
                .cloned()
                .ok_or_else(|| ModelError::CategoryNotFound(iri.into_string()))
        };
        let relations = definition
            .relations
            .iter()
            .map(|r| {
                Ok(Relation::new(
                    prefixes.expand(&r.iri)?,
                    r.label.clone(),
                    lookup(&r.domain)?,
                    lookup(&r.range)?,
                ))
            })
            .collect::<Result<Vec<_>, ModelError>>()?;

        Ok(Self::new(categories.into_values(), relations))
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn relations(&self) -> &Relations {
        &self.relations
    }

    pub fn category(&self, iri: &NamedNode) -> Result<&Category, ModelError> {
        self.categories
            .get(iri)
            .ok_or_else(|| ModelError::CategoryNotFound(iri.as_str().to_owned()))
    }

    pub fn relation(&self, iri: &NamedNode) -> Result<&Relation, ModelError> {
        self.relations
            .get(iri)
            .ok_or_else(|| ModelError::RelationNotFound(iri.as_str().to_owned()))
    }

    /// Relations whose domain and range match the given categories. `None` matches everything.
    pub fn relations_for(
        &self,
        domain: Option<&Category>,
        range: Option<&Category>,
    ) -> Relations {
        self.relations
            .iter()
            .filter(|(_, r)| domain.map_or(true, |d| r.has_domain.iri == d.iri))
            .filter(|(_, r)| range.map_or(true, |c| r.has_range.iri == c.iri))
            .map(|(iri, r)| (iri.clone(), r.clone()))
            .collect()
    }

    /// Categories that are the domain of at least one relation.
    pub fn domains(&self) -> Categories {
        self.collect_categories(|r| &r.has_domain)
    }

    /// Categories that are the range of at least one relation.
    pub fn ranges(&self) -> Categories {
        self.collect_categories(|r| &r.has_range)
    }

    fn collect_categories(&self, end: impl Fn(&Relation) -> &Category) -> Categories {
        self.relations
            .values()
            .map(|r| {
                let category = end(r);
                let category = self.categories.get(&category.iri).unwrap_or(category);
                (category.iri.clone(), category.clone())
            })
            .collect()
    }
}

/// JSON definition of a search profile.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileDefinition {
    #[serde(default)]
    pub categories: Vec<CategoryDefinition>,
    #[serde(default)]
    pub relations: Vec<RelationDefinition>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CategoryDefinition {
    pub iri: String,
    pub label: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RelationDefinition {
    pub iri: String,
    pub label: String,
    pub domain: String,
    pub range: String,
}
