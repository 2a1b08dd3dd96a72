//! Well-known IRIs and the variable names that query templates use to talk to the compiler.

pub mod ldp {
    use oxrdf::NamedNodeRef;

    pub const CONTAINS: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.w3.org/ns/ldp#contains");
}

pub mod platform {
    use oxrdf::NamedNodeRef;

    pub const SET_ITEM: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.metaphacts.com/ontologies/platform#setItem");
}

/// Blazegraph query hints.
pub mod hint {
    use oxrdf::NamedNodeRef;

    pub const QUERY: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.bigdata.com/queryHints#Query");
    pub const PRIOR: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.bigdata.com/queryHints#Prior");
    pub const OPTIMIZER: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.bigdata.com/queryHints#optimizer");
    pub const RUN_FIRST: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.bigdata.com/queryHints#runFirst");
}

/// Vocabulary of the JSON to RDF codec.
pub mod json {
    use oxrdf::NamedNodeRef;

    pub const KEY_BASE: &str = "http://www.metaphacts.com/ontology/json/key";
    pub const NULL: NamedNodeRef<'_> =
        NamedNodeRef::new_unchecked("http://www.metaphacts.com/ontology/json/null");
}

/// Variables bound by the search query compiler.
pub mod search {
    pub const SUBJECT: &str = "subject";
    pub const DOMAIN: &str = "__domain__";
    pub const RANGE: &str = "__range__";
    pub const RELATION: &str = "__relation__";
    pub const VALUE: &str = "__value__";
    pub const SET: &str = "__set__";
    pub const LITERAL: &str = "__literal__";
    pub const DATE_BEGIN: &str = "__dateBeginValue__";
    pub const DATE_END: &str = "__dateEndValue__";
    pub const NUMERIC_RANGE_BEGIN: &str = "__numericRangeBeginValue__";
    pub const NUMERIC_RANGE_END: &str = "__numericRangeEndValue__";
    pub const MAP_CENTER: &str = "__mapCenter__";
    pub const MAP_DISTANCE: &str = "__mapDistance__";
    pub const MAP_SOUTH_WEST: &str = "__mapSouthWest__";
    pub const MAP_NORTH_EAST: &str = "__mapNorthEast__";
}

/// Variables used by facet value queries.
pub mod facet {
    pub const RELATION_PATTERN: &str = "__relationPattern__";
    pub const VALUE: &str = "value";
    pub const LABEL: &str = "label";
    pub const DATE_BEGIN: &str = "dateBegin";
    pub const DATE_END: &str = "dateEnd";
    pub const LITERAL: &str = "literal";
    pub const NUMERIC_RANGE_BEGIN: &str = "numericRangeBegin";
    pub const NUMERIC_RANGE_END: &str = "numericRangeEnd";
    pub const DESCRIPTION: &str = "description";
    pub const COUNT: &str = "count";
}
