use crate::{FacetValue, FacetValueKind, ValueTemplates};
use semsearch_model::{Category, FacetAst, Relation, Tuple};

/// A facet dimension with the bindings the categories query returned for it. Categories without
/// results have empty bindings.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetCategory {
    pub category: Category,
    pub bindings: Tuple,
}

/// A relation available for the current results, with its bindings from the relations query.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetRelation {
    pub relation: Relation,
    pub bindings: Tuple,
}

impl FacetRelation {
    pub fn domain(&self) -> &Category {
        &self.relation.has_domain
    }

    pub fn range(&self) -> &Category {
        &self.relation.has_range
    }
}

/// Which category and relation are open and the values loaded for the relation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FacetViewState {
    pub category: Option<Category>,
    pub relation: Option<Relation>,
    pub values: Vec<FacetValue>,
    pub relation_type: FacetValueKind,
    pub value_templates: ValueTemplates,
}

/// One snapshot of everything the facet panel shows.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetData {
    pub categories: Vec<FacetCategory>,
    pub relations: Vec<FacetRelation>,
    pub view_state: FacetViewState,
    /// The constraints the snapshot was computed for.
    pub ast: FacetAst,
}
