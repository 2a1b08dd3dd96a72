use crate::{
    BoundingBox, Category, DateDeviation, DateRange, Distance, LiteralValue, ModelError,
    NumericRange, Relation, Resource, SavedSearch, Year, YearDeviation, YearRange,
};
use std::fmt;
use std::str::FromStr;
use time::Date;

/// Position of a conjunct in its search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConjunctIndex(pub usize);

/// Position of a disjunct: the index of its conjunct and its own index within that conjunct.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisjunctIndex {
    pub conjunct: usize,
    pub disjunct: usize,
}

impl DisjunctIndex {
    pub fn new(conjunct: usize, disjunct: usize) -> Self {
        Self { conjunct, disjunct }
    }
}

/// The kind tag of a disjunct. The string form is part of the persisted search state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisjunctKind {
    Resource,
    Set,
    Search,
    SavedSearch,
    Date,
    DateRange,
    DateDeviation,
    Year,
    YearRange,
    YearDeviation,
    Text,
    Distance,
    BoundingBox,
    Literal,
    NumericRange,
}

impl DisjunctKind {
    pub const ALL: [DisjunctKind; 15] = [
        DisjunctKind::Resource,
        DisjunctKind::Set,
        DisjunctKind::Search,
        DisjunctKind::SavedSearch,
        DisjunctKind::Date,
        DisjunctKind::DateRange,
        DisjunctKind::DateDeviation,
        DisjunctKind::Year,
        DisjunctKind::YearRange,
        DisjunctKind::YearDeviation,
        DisjunctKind::Text,
        DisjunctKind::Distance,
        DisjunctKind::BoundingBox,
        DisjunctKind::Literal,
        DisjunctKind::NumericRange,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DisjunctKind::Resource => "Resource",
            DisjunctKind::Set => "Set",
            DisjunctKind::Search => "Search",
            DisjunctKind::SavedSearch => "SavedSearch",
            DisjunctKind::Date => "Date",
            DisjunctKind::DateRange => "DateRange",
            DisjunctKind::DateDeviation => "DateDeviation",
            DisjunctKind::Year => "Year",
            DisjunctKind::YearRange => "YearRange",
            DisjunctKind::YearDeviation => "YearDeviation",
            DisjunctKind::Text => "Text",
            DisjunctKind::Distance => "Distance",
            DisjunctKind::BoundingBox => "BoundingBox",
            DisjunctKind::Literal => "Literal",
            DisjunctKind::NumericRange => "NumericRange",
        }
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            DisjunctKind::Date
                | DisjunctKind::DateRange
                | DisjunctKind::DateDeviation
                | DisjunctKind::Year
                | DisjunctKind::YearRange
                | DisjunctKind::YearDeviation
        )
    }

    pub fn is_spatial(self) -> bool {
        matches!(self, DisjunctKind::Distance | DisjunctKind::BoundingBox)
    }
}

impl fmt::Display for DisjunctKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisjunctKind {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        DisjunctKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ModelError::UnknownDisjunctKind(value.to_owned()))
    }
}

/// The value of one alternative within a conjunct.
#[derive(Clone, Debug, PartialEq)]
pub enum DisjunctValue {
    Resource(Resource),
    /// A set of resources, addressed by the IRI of the set container.
    Set(Resource),
    Search(Box<Search>),
    SavedSearch(SavedSearch),
    Date(Date),
    DateRange(DateRange),
    DateDeviation(DateDeviation),
    Year(Year),
    YearRange(YearRange),
    YearDeviation(YearDeviation),
    Text(String),
    Distance(Distance),
    BoundingBox(BoundingBox),
    Literal(LiteralValue),
    NumericRange(NumericRange),
}

impl DisjunctValue {
    pub fn kind(&self) -> DisjunctKind {
        match self {
            DisjunctValue::Resource(_) => DisjunctKind::Resource,
            DisjunctValue::Set(_) => DisjunctKind::Set,
            DisjunctValue::Search(_) => DisjunctKind::Search,
            DisjunctValue::SavedSearch(_) => DisjunctKind::SavedSearch,
            DisjunctValue::Date(_) => DisjunctKind::Date,
            DisjunctValue::DateRange(_) => DisjunctKind::DateRange,
            DisjunctValue::DateDeviation(_) => DisjunctKind::DateDeviation,
            DisjunctValue::Year(_) => DisjunctKind::Year,
            DisjunctValue::YearRange(_) => DisjunctKind::YearRange,
            DisjunctValue::YearDeviation(_) => DisjunctKind::YearDeviation,
            DisjunctValue::Text(_) => DisjunctKind::Text,
            DisjunctValue::Distance(_) => DisjunctKind::Distance,
            DisjunctValue::BoundingBox(_) => DisjunctKind::BoundingBox,
            DisjunctValue::Literal(_) => DisjunctKind::Literal,
            DisjunctValue::NumericRange(_) => DisjunctKind::NumericRange,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Disjunct {
    pub index: DisjunctIndex,
    pub value: DisjunctValue,
}

impl Disjunct {
    pub fn kind(&self) -> DisjunctKind {
        self.value.kind()
    }
}

/// A free-text alternative of a text conjunct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextDisjunct {
    pub index: DisjunctIndex,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationConjunct {
    pub unique_id: Option<u64>,
    pub relation: Relation,
    pub range: Category,
    pub index: ConjunctIndex,
    pub disjuncts: Vec<Disjunct>,
}

impl RelationConjunct {
    /// A conjunct on `relation` ranging over the relation's range category.
    pub fn new(relation: Relation, values: impl IntoIterator<Item = DisjunctValue>) -> Self {
        let mut conjunct = Self {
            unique_id: None,
            range: relation.has_range.clone(),
            relation,
            index: ConjunctIndex::default(),
            disjuncts: values
                .into_iter()
                .map(|value| Disjunct {
                    index: DisjunctIndex::default(),
                    value,
                })
                .collect(),
        };
        conjunct.set_index(ConjunctIndex(0));
        conjunct
    }

    /// Moves the conjunct to `index`, renumbering its disjuncts.
    pub fn set_index(&mut self, index: ConjunctIndex) {
        self.index = index;
        for (i, disjunct) in self.disjuncts.iter_mut().enumerate() {
            disjunct.index = DisjunctIndex::new(index.0, i);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextConjunct {
    pub unique_id: Option<u64>,
    pub range: Category,
    pub index: ConjunctIndex,
    pub disjuncts: Vec<TextDisjunct>,
}

impl TextConjunct {
    pub fn new(range: Category, texts: impl IntoIterator<Item = String>) -> Self {
        let mut conjunct = Self {
            unique_id: None,
            range,
            index: ConjunctIndex::default(),
            disjuncts: texts
                .into_iter()
                .map(|value| TextDisjunct {
                    index: DisjunctIndex::default(),
                    value,
                })
                .collect(),
        };
        conjunct.set_index(ConjunctIndex(0));
        conjunct
    }

    pub fn set_index(&mut self, index: ConjunctIndex) {
        self.index = index;
        for (i, disjunct) in self.disjuncts.iter_mut().enumerate() {
            disjunct.index = DisjunctIndex::new(index.0, i);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Conjunct {
    Relation(RelationConjunct),
    Text(TextConjunct),
}

impl Conjunct {
    pub fn range(&self) -> &Category {
        match self {
            Conjunct::Relation(c) => &c.range,
            Conjunct::Text(c) => &c.range,
        }
    }

    pub fn index(&self) -> ConjunctIndex {
        match self {
            Conjunct::Relation(c) => c.index,
            Conjunct::Text(c) => c.index,
        }
    }

    pub fn unique_id(&self) -> Option<u64> {
        match self {
            Conjunct::Relation(c) => c.unique_id,
            Conjunct::Text(c) => c.unique_id,
        }
    }

    pub fn set_index(&mut self, index: ConjunctIndex) {
        match self {
            Conjunct::Relation(c) => c.set_index(index),
            Conjunct::Text(c) => c.set_index(index),
        }
    }
}

impl From<RelationConjunct> for Conjunct {
    fn from(conjunct: RelationConjunct) -> Self {
        Conjunct::Relation(conjunct)
    }
}

impl From<TextConjunct> for Conjunct {
    fn from(conjunct: TextConjunct) -> Self {
        Conjunct::Text(conjunct)
    }
}

/// The top-level structure of a search: what is searched for and the constraints on it.
#[derive(Clone, Debug, PartialEq)]
pub struct Search {
    pub domain: Category,
    pub conjuncts: Vec<Conjunct>,
}

impl Search {
    pub fn new(domain: Category, conjuncts: impl IntoIterator<Item = Conjunct>) -> Self {
        let mut search = Self {
            domain,
            conjuncts: conjuncts.into_iter().collect(),
        };
        search.reindex();
        search
    }

    /// Renumbers conjuncts and disjuncts after the conjunct list changed.
    pub fn reindex(&mut self) {
        for (i, conjunct) in self.conjuncts.iter_mut().enumerate() {
            conjunct.set_index(ConjunctIndex(i));
        }
    }
}

/// The constraints selected through facets. Facets only produce relation conjuncts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FacetAst {
    pub conjuncts: Vec<RelationConjunct>,
}

impl FacetAst {
    pub fn new(conjuncts: impl IntoIterator<Item = RelationConjunct>) -> Self {
        let mut ast = Self {
            conjuncts: conjuncts.into_iter().collect(),
        };
        ast.reindex();
        ast
    }

    pub fn reindex(&mut self) {
        for (i, conjunct) in self.conjuncts.iter_mut().enumerate() {
            conjunct.set_index(ConjunctIndex(i));
        }
    }

    pub fn conjunct_for(&self, relation: &Relation) -> Option<&RelationConjunct> {
        self.conjuncts
            .iter()
            .find(|c| c.relation.iri == relation.iri)
    }

    pub fn conjunct_for_mut(&mut self, relation: &Relation) -> Option<&mut RelationConjunct> {
        self.conjuncts
            .iter_mut()
            .find(|c| c.relation.iri == relation.iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::NamedNode;

    fn category(name: &str) -> Category {
        Category::new(NamedNode::new_unchecked(format!("http://example.com/{name}")), name)
    }

    fn resource(name: &str) -> DisjunctValue {
        DisjunctValue::Resource(Resource::new(
            NamedNode::new_unchecked(format!("http://example.com/{name}")),
            name,
        ))
    }

    #[test]
    fn kind_tags_round_trip() -> Result<(), ModelError> {
        for kind in DisjunctKind::ALL {
            assert_eq!(kind.as_str().parse::<DisjunctKind>()?, kind);
        }
        assert!("Hierarchy".parse::<DisjunctKind>().is_err());
        Ok(())
    }

    #[test]
    fn search_indexes_follow_positions() {
        let relation = Relation::new(
            NamedNode::new_unchecked("http://example.com/creator"),
            "creator",
            category("Painting"),
            category("Person"),
        );
        let mut search = Search::new(
            category("Painting"),
            [
                TextConjunct::new(category("Painting"), ["mona".to_owned()]).into(),
                RelationConjunct::new(relation, [resource("a"), resource("b")]).into(),
            ],
        );
        assert_eq!(search.conjuncts[1].index(), ConjunctIndex(1));
        let Conjunct::Relation(conjunct) = &search.conjuncts[1] else {
            panic!("expected a relation conjunct");
        };
        assert_eq!(conjunct.disjuncts[1].index, DisjunctIndex::new(1, 1));

        search.conjuncts.remove(0);
        search.reindex();
        assert_eq!(search.conjuncts[0].index(), ConjunctIndex(0));
        let Conjunct::Relation(conjunct) = &search.conjuncts[0] else {
            panic!("expected a relation conjunct");
        };
        assert_eq!(conjunct.disjuncts[1].index, DisjunctIndex::new(0, 1));
    }
}
