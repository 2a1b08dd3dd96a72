use crate::{
    default_literal_relation_pattern, default_resource_relation_pattern, FacetConfig, FacetError,
    FacetValueKind, FacetValuePattern,
};
use semsearch_model::vocab::{facet, search};
use semsearch_model::{
    Category, FacetAst, Query, Relation, RelationConjunct, Relations,
    SearchProfileStore, Term, Variable,
};
use semsearch_query::pattern::{
    append, blazegraph_run_first_pattern, join, join_all, map_select, map_where, parse_pattern,
    parse_select, prepend, projection_variable, replace_placeholder_filter, select_pattern,
    values_pattern,
};
use semsearch_query::rewrite::{
    bind_variables, rename_variable, rewrite_projection_variable, Parameters,
};
use semsearch_query::{
    try_get_relation_patterns, ConjunctRef, Optimizer, PatternConfig, PatternKind, SearchCompiler,
    SearchConfig,
};
use spargebra::algebra::GraphPattern;
use std::sync::Arc;
use tracing::warn;

/// A values query together with the kind of values it returns.
#[derive(Clone, Debug)]
pub struct ValuesQuery {
    pub kind: FacetValueKind,
    pub query: Query,
}

/// Builds the queries of a facet panel around one base query.
///
/// Every query embeds the base query as a sub-select, followed by the facet conjuncts, so that
/// counts and values always refer to the currently filtered results.
#[derive(Clone, Debug)]
pub struct FacetQueries {
    domain: Category,
    base_query: Query,
    base: GraphPattern,
    projection: Variable,
    categories: Query,
    relations: Query,
    config: FacetConfig,
    search_config: SearchConfig,
    profile: Arc<SearchProfileStore>,
}

impl FacetQueries {
    pub fn new(
        domain: Category,
        base_query: Query,
        config: FacetConfig,
        search_config: SearchConfig,
        profile: Arc<SearchProfileStore>,
    ) -> Result<Self, FacetError> {
        let projection = projection_variable(&base_query)?;
        let base = select_pattern(base_query.clone())?;
        let prefixes = &search_config.prefixes;
        let categories = map_select(
            parse_select(config.categories_query(), prefixes)?,
            |root| rewrite_projection_variable(root, &projection),
        )?;
        let relations = map_select(
            parse_select(config.relations_query(), prefixes)?,
            |root| rewrite_projection_variable(root, &projection),
        )?;
        Ok(Self {
            domain,
            base_query,
            base,
            projection,
            categories,
            relations,
            config,
            search_config,
            profile,
        })
    }

    pub fn domain(&self) -> &Category {
        &self.domain
    }

    pub fn projection(&self) -> &Variable {
        &self.projection
    }

    pub fn profile(&self) -> &SearchProfileStore {
        &self.profile
    }

    pub fn config(&self) -> &FacetConfig {
        &self.config
    }

    /// The base query filtered by all facet conjuncts.
    pub fn faceted_query(&self, ast: &FacetAst) -> Result<Query, FacetError> {
        let patterns = self.conjunct_patterns(ast.conjuncts.iter())?;
        Ok(map_select(self.base_query.clone(), |root| {
            map_where(root, |inner| append(inner, join_all(patterns)))
        })?)
    }

    /// Counts per range category. The categories are passed in as `VALUES ?__range__`.
    pub fn categories_query(&self, ast: &FacetAst) -> Result<Query, FacetError> {
        let mut prefix = self.base_patterns();
        prefix.extend(self.conjunct_patterns(ast.conjuncts.iter())?);
        let ranges = values_pattern(
            Variable::new_unchecked(search::RANGE),
            self.profile.ranges().into_keys(),
        );
        Ok(map_select(self.categories.clone(), |root| {
            map_where(root, |inner| prepend(inner, join(ranges, join_all(prefix))))
        })?)
    }

    /// Counts per relation of the domain, restricted to relations into `range` if given. Returns
    /// the relations passed in as `VALUES ?__relation__` alongside the query.
    pub fn relations_query(
        &self,
        ast: &FacetAst,
        range: Option<&Category>,
    ) -> Result<(Query, Relations), FacetError> {
        let relations = self.profile.relations_for(Some(&self.domain), range);
        let conjuncts = self.conjunct_patterns(ast.conjuncts.iter())?;
        let values = values_pattern(
            Variable::new_unchecked(search::RELATION),
            relations.keys().cloned(),
        );
        let prefix = join(values, join_all(self.base_patterns()));
        let query = map_select(self.relations.clone(), |root| {
            map_where(root, |inner| append(prepend(inner, prefix), join_all(conjuncts)))
        })?;
        Ok((query, relations))
    }

    /// The values of `relation` among the results filtered by every other facet conjunct.
    pub fn values_query(
        &self,
        ast: &FacetAst,
        relation: &Relation,
    ) -> Result<ValuesQuery, FacetError> {
        let ValuesQuery { kind, query } = self.value_pattern(relation)?;
        let others = self.conjunct_patterns(
            ast.conjuncts
                .iter()
                .filter(|c| c.relation.iri != relation.iri),
        )?;
        let prefix = join_all(self.base_patterns());
        let parameters = Parameters::from([(
            search::RELATION.to_owned(),
            Term::NamedNode(relation.iri.clone()),
        )]);
        let query = map_select(query, |root| {
            let root = rewrite_projection_variable(root, &self.projection);
            let root = map_where(root, |inner| append(prepend(inner, prefix), join_all(others)));
            bind_variables(root, &parameters)
        })?;
        Ok(ValuesQuery { kind, query })
    }

    /// The kind of values `relation` offers, without building its values query.
    pub fn value_kind(&self, relation: &Relation) -> FacetValueKind {
        match self.configured_value_pattern(relation) {
            Some(pattern) => pattern.kind,
            None => generated_value_kind(self.relation_value_pattern(relation)),
        }
    }

    /// The values query of `relation`: the one configured for the relation, else the one
    /// configured for its range, else a query generated from the relation's search patterns.
    pub fn value_pattern(&self, relation: &Relation) -> Result<ValuesQuery, FacetError> {
        let prefixes = &self.search_config.prefixes;
        if let Some(pattern) = self.configured_value_pattern(relation) {
            return Ok(ValuesQuery {
                kind: pattern.kind,
                query: parse_select(&pattern.values_query, prefixes)?,
            });
        }

        let pattern = self.relation_value_pattern(relation);
        let kind = generated_value_kind(pattern);
        let (template, placeholder, variable, values_query) = match kind {
            FacetValueKind::Literal => (
                default_literal_relation_pattern(),
                search::LITERAL,
                facet::LITERAL,
                self.config.literal_values_query(),
            ),
            _ => (
                default_resource_relation_pattern(),
                search::VALUE,
                facet::VALUE,
                self.config.resource_values_query(),
            ),
        };
        let template = pattern
            .and_then(PatternConfig::query_pattern)
            .map_or(template, str::to_owned);
        let relation_pattern = rename_variable(
            parse_pattern(&template, prefixes)?,
            placeholder,
            &Variable::new_unchecked(variable),
        );
        let query = map_select(parse_select(values_query, prefixes)?, |root| {
            match replace_placeholder_filter(
                root.clone(),
                facet::RELATION_PATTERN,
                relation_pattern.clone(),
            ) {
                Some(root) => root,
                None => {
                    warn!(
                        relation = %relation.iri,
                        "Values query has no ?{} filter, prepending the relation pattern",
                        facet::RELATION_PATTERN
                    );
                    map_where(root, |inner| prepend(inner, relation_pattern))
                }
            }
        })?;
        Ok(ValuesQuery { kind, query })
    }

    fn configured_value_pattern(&self, relation: &Relation) -> Option<&FacetValuePattern> {
        let prefixes = &self.search_config.prefixes;
        self.config
            .value_relation(prefixes, relation.iri.as_ref())
            .or_else(|| {
                self.config
                    .value_category(prefixes, relation.has_range.iri.as_ref())
            })
    }

    /// The resource or literal search pattern of `relation`. Several candidates are ordered by
    /// kind name, then by configuration order.
    fn relation_value_pattern(&self, relation: &Relation) -> Option<&PatternConfig> {
        let mut candidates =
            try_get_relation_patterns(&self.search_config, relation, &relation.has_range)
                .iter()
                .filter(|p| matches!(p.kind(), PatternKind::Resource | PatternKind::Literal))
                .collect::<Vec<_>>();
        if candidates.len() > 1 {
            candidates.sort_by_key(|p| p.kind().as_str());
            warn!(
                relation = %relation.iri,
                candidates = candidates.len(),
                chosen = candidates[0].kind().as_str(),
                "Relation has several value patterns"
            );
        }
        candidates.first().copied()
    }

    /// The base query, followed by a run-first hint for Blazegraph.
    fn base_patterns(&self) -> Vec<GraphPattern> {
        let mut patterns = vec![self.base.clone()];
        if self.search_config.optimizer == Optimizer::Blazegraph {
            patterns.push(blazegraph_run_first_pattern());
        }
        patterns
    }

    fn conjunct_patterns<'c>(
        &self,
        conjuncts: impl IntoIterator<Item = &'c RelationConjunct>,
    ) -> Result<Vec<GraphPattern>, FacetError> {
        let compiler = SearchCompiler::new(&self.search_config, &self.projection, &self.domain);
        Ok(compiler.conjuncts_to_query_patterns(conjuncts.into_iter().map(ConjunctRef::from))?)
    }
}

fn generated_value_kind(pattern: Option<&PatternConfig>) -> FacetValueKind {
    match pattern.map(PatternConfig::kind) {
        Some(PatternKind::Literal) => FacetValueKind::Literal,
        _ => FacetValueKind::Resource,
    }
}

