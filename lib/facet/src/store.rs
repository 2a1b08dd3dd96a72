use crate::{
    facet_values, FacetCategory, FacetConfig, FacetData, FacetError, FacetQueries, FacetRelation,
    FacetValue, FacetValueKind, FacetViewState, TripleStore,
};
use semsearch_model::vocab::search;
use semsearch_model::{
    Category, Disjunct, DisjunctIndex, DisjunctValue, FacetAst, Query, Relation,
    RelationConjunct, SearchProfileStore, Term, Tuple,
};
use semsearch_query::SearchConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// A pending recomputation of the facet data.
pub type Recomputation = JoinHandle<Result<(), FacetError>>;

/// Everything a [`FacetStore`] is created from.
#[derive(Clone, Debug)]
pub struct FacetStoreConfig {
    pub domain: Category,
    /// Selects the results the facets narrow down. Its first projected variable is the subject.
    pub base_query: Query,
    pub initial_ast: Option<FacetAst>,
    pub config: FacetConfig,
    pub base_config: SearchConfig,
    pub profile: Arc<SearchProfileStore>,
}

/// Which parts of the facet data a recomputation may take from the previous snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reuse {
    Nothing,
    Categories,
    CategoriesAndRelations,
}

/// The facet state machine of one search session.
///
/// Actions mutate the facet AST and the view state synchronously and then spawn a recomputation
/// on the current tokio runtime. Each recomputation publishes a new [`FacetData`] snapshot when it
/// completes. Superseded recomputations are not cancelled, the one that finishes last wins.
/// A failed recomputation publishes nothing and reports its error through the returned handle.
pub struct FacetStore {
    context: Arc<FacetContext>,
    ast: FacetAst,
    view: FacetViewState,
    data: Arc<watch::Sender<Option<Arc<FacetData>>>>,
    faceted_query: watch::Sender<Arc<Query>>,
}

impl FacetStore {
    pub fn new(config: FacetStoreConfig, store: Arc<dyn TripleStore>) -> Result<Self, FacetError> {
        let view = FacetViewState {
            value_templates: config.config.default_value_template.clone(),
            ..FacetViewState::default()
        };
        let queries = FacetQueries::new(
            config.domain,
            config.base_query,
            config.config,
            config.base_config,
            config.profile,
        )?;
        let mut ast = config.initial_ast.unwrap_or_default();
        ast.reindex();
        let faceted_query = watch::Sender::new(Arc::new(queries.faceted_query(&ast)?));
        Ok(Self {
            context: Arc::new(FacetContext { queries, store }),
            ast,
            view,
            data: Arc::new(watch::Sender::new(None)),
            faceted_query,
        })
    }

    pub fn ast(&self) -> &FacetAst {
        &self.ast
    }

    pub fn view_state(&self) -> &FacetViewState {
        &self.view
    }

    pub fn queries(&self) -> &FacetQueries {
        &self.context.queries
    }

    /// The latest facet data. `None` until the first recomputation completed.
    pub fn facet_data(&self) -> watch::Receiver<Option<Arc<FacetData>>> {
        self.data.subscribe()
    }

    /// The base query filtered by the current facet AST. Updated synchronously by every action
    /// that changes the AST.
    pub fn faceted_query(&self) -> watch::Receiver<Arc<Query>> {
        self.faceted_query.subscribe()
    }

    /// Recomputes categories, relations and values from scratch.
    pub fn refresh(&self) -> Recomputation {
        self.recompute(Reuse::Nothing)
    }

    /// Opens `category`, or closes it if it is already open, and recomputes the relations.
    pub fn toggle_category(&mut self, category: &Category) -> Recomputation {
        self.view.category = match self.view.category.take() {
            Some(open) if open.iri == category.iri => None,
            _ => Some(category.clone()),
        };
        self.recompute(Reuse::Categories)
    }

    /// Opens `relation`, or closes it if it is already open, and loads its values.
    pub fn toggle_relation(&mut self, relation: &Relation) -> Recomputation {
        self.view.relation = match self.view.relation.take() {
            Some(open) if open.iri == relation.iri => None,
            _ => Some(relation.clone()),
        };
        self.view.values.clear();
        if let Some(relation) = &self.view.relation {
            self.view.relation_type = self.context.queries.value_kind(relation);
        }
        self.recompute(Reuse::CategoriesAndRelations)
    }

    /// Selects or deselects `value` of `relation`.
    ///
    /// Resources and literals accumulate as alternatives and a second selection of the same
    /// value removes it again. Ranges replace whatever the relation had selected before.
    pub fn set_facet_value(
        &mut self,
        relation: &Relation,
        value: FacetValue,
    ) -> Result<Recomputation, FacetError> {
        let expected = self.context.queries.value_kind(relation);
        if value.kind() != expected {
            return Err(FacetError::ValueKindMismatch {
                expected,
                actual: value.kind(),
            });
        }
        match value {
            FacetValue::Resource(_) | FacetValue::Literal(_) => {
                self.toggle_disjunct(relation, value.into_disjunct_value());
            }
            FacetValue::DateRange(_) | FacetValue::NumericRange(_) => {
                self.replace_disjuncts(relation, value.into_disjunct_value());
            }
        }
        self.ast.reindex();
        self.recalculate_facets()
    }

    /// Drops the conjunct of the relation of `conjunct`.
    pub fn remove_conjunct(
        &mut self,
        conjunct: &RelationConjunct,
    ) -> Result<Recomputation, FacetError> {
        self.ast
            .conjuncts
            .retain(|c| c.relation.iri != conjunct.relation.iri);
        self.ast.reindex();
        self.recalculate_facets()
    }

    fn toggle_disjunct(&mut self, relation: &Relation, value: DisjunctValue) {
        let Some(conjunct) = self.ast.conjunct_for_mut(relation) else {
            self.ast
                .conjuncts
                .push(RelationConjunct::new(relation.clone(), [value]));
            return;
        };
        let before = conjunct.disjuncts.len();
        conjunct.disjuncts.retain(|d| !same_value(&d.value, &value));
        if conjunct.disjuncts.len() == before {
            conjunct.disjuncts.push(Disjunct {
                index: DisjunctIndex::default(),
                value,
            });
        }
    }

    fn replace_disjuncts(&mut self, relation: &Relation, value: DisjunctValue) {
        match self.ast.conjunct_for_mut(relation) {
            Some(conjunct) => {
                conjunct.disjuncts = vec![Disjunct {
                    index: DisjunctIndex::default(),
                    value,
                }];
            }
            None => self
                .ast
                .conjuncts
                .push(RelationConjunct::new(relation.clone(), [value])),
        }
    }

    fn recalculate_facets(&mut self) -> Result<Recomputation, FacetError> {
        let query = self.context.queries.faceted_query(&self.ast)?;
        debug!(%query, "Faceted query changed");
        self.faceted_query.send_replace(Arc::new(query));
        Ok(self.recompute(Reuse::Nothing))
    }

    fn recompute(&self, reuse: Reuse) -> Recomputation {
        let context = Arc::clone(&self.context);
        let sender = Arc::clone(&self.data);
        let previous = match reuse {
            Reuse::Nothing => None,
            _ => self.data.borrow().clone(),
        };
        let ast = self.ast.clone();
        let view = self.view.clone();
        tokio::spawn(async move {
            let data = context
                .facet_data(ast, view, previous.as_deref(), reuse)
                .await?;
            sender.send_replace(Some(Arc::new(data)));
            Ok(())
        })
    }
}

fn same_value(left: &DisjunctValue, right: &DisjunctValue) -> bool {
    match (left, right) {
        (DisjunctValue::Resource(left), DisjunctValue::Resource(right)) => left.iri == right.iri,
        (DisjunctValue::Literal(left), DisjunctValue::Literal(right)) => {
            left.literal == right.literal
        }
        _ => false,
    }
}

/// The immutable part of a facet store that recomputations run against.
struct FacetContext {
    queries: FacetQueries,
    store: Arc<dyn TripleStore>,
}

impl FacetContext {
    async fn facet_data(
        &self,
        ast: FacetAst,
        mut view: FacetViewState,
        previous: Option<&FacetData>,
        reuse: Reuse,
    ) -> Result<FacetData, FacetError> {
        let (categories, relations, values) = futures::try_join!(
            self.categories(&ast, previous.filter(|_| reuse != Reuse::Nothing)),
            self.relations(
                &ast,
                view.category.as_ref(),
                previous.filter(|_| reuse == Reuse::CategoriesAndRelations),
            ),
            self.values(&ast, view.relation.as_ref()),
        )?;
        if let Some((kind, values)) = values {
            view.relation_type = kind;
            view.values = values;
        }
        Ok(FacetData {
            categories,
            relations,
            view_state: view,
            ast,
        })
    }

    async fn categories(
        &self,
        ast: &FacetAst,
        cached: Option<&FacetData>,
    ) -> Result<Vec<FacetCategory>, FacetError> {
        if let Some(cached) = cached {
            return Ok(cached.categories.clone());
        }
        let tuples = self.select(&self.queries.categories_query(ast)?).await?;
        Ok(self
            .queries
            .profile()
            .ranges()
            .into_values()
            .map(|category| {
                let bindings = tuples
                    .iter()
                    .find(|tuple| binds_iri(tuple, search::RANGE, &category))
                    .cloned()
                    .unwrap_or_default();
                FacetCategory { category, bindings }
            })
            .collect())
    }

    async fn relations(
        &self,
        ast: &FacetAst,
        category: Option<&Category>,
        cached: Option<&FacetData>,
    ) -> Result<Vec<FacetRelation>, FacetError> {
        if let Some(cached) = cached {
            return Ok(cached.relations.clone());
        }
        let (query, relations) = self.queries.relations_query(ast, category)?;
        let tuples = self.select(&query).await?;
        Ok(tuples
            .into_iter()
            .filter_map(|bindings| {
                let Term::NamedNode(iri) = bindings.get(search::RELATION)? else {
                    return None;
                };
                let relation = relations.get(iri)?.clone();
                Some(FacetRelation { relation, bindings })
            })
            .collect())
    }

    async fn values(
        &self,
        ast: &FacetAst,
        relation: Option<&Relation>,
    ) -> Result<Option<(FacetValueKind, Vec<FacetValue>)>, FacetError> {
        let Some(relation) = relation else {
            return Ok(None);
        };
        let values = self.queries.values_query(ast, relation)?;
        let tuples = self.select(&values.query).await?;
        Ok(Some((values.kind, facet_values(values.kind, tuples))))
    }

    async fn select(&self, query: &Query) -> Result<Vec<Tuple>, FacetError> {
        debug!(%query, "Evaluating facet query");
        self.store.select(query).await.map_err(FacetError::Store)
    }
}

fn binds_iri(tuple: &Tuple, variable: &str, category: &Category) -> bool {
    matches!(tuple.get(variable), Some(Term::NamedNode(iri)) if *iri == category.iri)
}
