use crate::history::History;
use futures::future::BoxFuture;
use semsearch_model::{Category, FacetAst, Prefixes, Query, Search, SearchProfileStore};
use semsearch_state::{state_from_token, state_to_token, RawState, ResultState};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// A message for the user of the search.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notification {
    Warning(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultOperationKind {
    /// Counts the results; its output becomes [`ResultsStatus::count`].
    Count,
    /// Any other work a result component does before it is ready.
    Load,
}

/// Work a result component does for the current result query.
///
/// Failures have to be mapped to `None` by the component.
pub struct ResultOperation {
    pub kind: ResultOperationKind,
    pub task: BoxFuture<'static, Option<u64>>,
}

impl ResultOperation {
    pub fn count(task: impl std::future::Future<Output = Option<u64>> + Send + 'static) -> Self {
        Self {
            kind: ResultOperationKind::Count,
            task: Box::pin(task),
        }
    }

    pub fn load(task: impl std::future::Future<Output = ()> + Send + 'static) -> Self {
        Self {
            kind: ResultOperationKind::Load,
            task: Box::pin(async move {
                task.await;
                None
            }),
        }
    }
}

/// Progress of the result operations for the current result query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultsStatus {
    /// Incremented whenever the result query changes.
    pub generation: u64,
    pub active: usize,
    pub count: Option<u64>,
    pub loaded: bool,
}

/// The top-level state of one semantic search.
///
/// The session owns the search structure, the facet structure and the per-component result
/// state, persists them into a [`History`] as a state token, and tracks the operations that
/// result components run for the current result query. Dropping the session cancels all of its
/// pending work.
///
/// Must be used from within a Tokio runtime.
pub struct SearchSession {
    profile: Arc<SearchProfileStore>,
    prefixes: Prefixes,
    history: Arc<dyn History>,
    notifications: mpsc::UnboundedSender<Notification>,
    cancellation: CancellationToken,
    saving: CancellationToken,
    loading: CancellationToken,
    serialized: Option<String>,
    results: Arc<watch::Sender<ResultsStatus>>,
    domain: Option<Category>,
    base_query: Option<Query>,
    base_query_structure: Option<Search>,
    facet_structure: Option<FacetAst>,
    result_query: Option<Query>,
    has_facet: bool,
    result_state: ResultState,
}

impl SearchSession {
    pub fn new(
        profile: Arc<SearchProfileStore>,
        prefixes: Prefixes,
        history: Arc<dyn History>,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (notifications, receiver) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        let session = Self {
            profile,
            prefixes,
            history,
            notifications,
            saving: cancellation.child_token(),
            loading: cancellation.child_token(),
            cancellation,
            serialized: None,
            results: Arc::new(watch::Sender::new(ResultsStatus::default())),
            domain: None,
            base_query: None,
            base_query_structure: None,
            facet_structure: None,
            result_query: None,
            has_facet: false,
            result_state: ResultState::new(),
        };
        (session, receiver)
    }

    /// Loads the state stored in the history. Returns whether a state was restored.
    ///
    /// A token that cannot be restored is reported as a warning notification and leaves the
    /// session empty.
    pub fn restore(&mut self) -> bool {
        let Some(state) = self.state_from_history(true) else {
            return false;
        };
        self.base_query_structure = state.search;
        self.facet_structure = state.facet;
        self.result_state = state.result;
        true
    }

    pub fn domain(&self) -> Option<&Category> {
        self.domain.as_ref()
    }

    pub fn base_query(&self) -> Option<&Query> {
        self.base_query.as_ref()
    }

    pub fn base_query_structure(&self) -> Option<&Search> {
        self.base_query_structure.as_ref()
    }

    pub fn facet_structure(&self) -> Option<&FacetAst> {
        self.facet_structure.as_ref()
    }

    /// The query result components display: the faceted query once facets are in use, the base
    /// query before.
    pub fn result_query(&self) -> Option<&Query> {
        self.result_query.as_ref()
    }

    pub fn has_facet(&self) -> bool {
        self.has_facet
    }

    pub fn result_state(&self) -> &ResultState {
        &self.result_state
    }

    /// The token of the last saved state.
    pub fn token(&self) -> Option<&str> {
        self.serialized.as_deref()
    }

    pub fn results_status(&self) -> watch::Receiver<ResultsStatus> {
        self.results.subscribe()
    }

    pub fn set_domain(&mut self, domain: Category) {
        self.domain = Some(domain);
    }

    /// Replaces the base query. Clearing it also clears the facets.
    pub fn set_base_query(&mut self, query: Option<Query>) {
        self.listen_for_results_loading();
        if query.is_none() {
            self.facet_structure = None;
            self.has_facet = false;
        }
        self.result_query.clone_from(&query);
        self.base_query = query;
    }

    /// Replaces the search structure and resets the result state.
    pub fn set_base_query_structure(&mut self, structure: Option<Search>) {
        if structure == self.base_query_structure {
            return;
        }
        match structure {
            Some(search) => {
                self.base_query_structure = Some(search.clone());
                self.result_state.clear();
                self.save_state(RawState {
                    search: Some(search),
                    facet: self.facet_structure.clone(),
                    result: ResultState::new(),
                });
            }
            None => {
                self.base_query_structure = None;
                self.clear_history();
            }
        }
    }

    pub fn set_facet_structure(&mut self, facet: FacetAst) {
        self.facet_structure = Some(facet.clone());
        self.save_state(RawState {
            search: self.base_query_structure.clone(),
            facet: Some(facet),
            result: self.result_state.clone(),
        });
    }

    pub fn set_faceted_query(&mut self, query: Query) {
        self.listen_for_results_loading();
        self.result_query = Some(query);
        self.has_facet = true;
    }

    /// Merges `change` into the state of the result component `component_id`.
    pub fn update_result_state(&mut self, component_id: &str, change: Map<String, Value>) {
        let state = self
            .result_state
            .entry(component_id.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        match state {
            Value::Object(state) => state.extend(change),
            state => *state = Value::Object(change),
        }
        self.save_state(RawState {
            search: self.base_query_structure.clone(),
            facet: self.facet_structure.clone(),
            result: self.result_state.clone(),
        });
    }

    /// Tracks `operation` until it completes or the result query changes.
    pub fn notify_result_loading(&self, operation: ResultOperation) {
        let mut generation = 0;
        self.results.send_modify(|status| {
            status.active += 1;
            generation = status.generation;
        });
        let loading = self.loading.clone();
        let results = Arc::clone(&self.results);
        let ResultOperation { kind, task } = operation;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = loading.cancelled() => {}
                output = task => {
                    results.send_if_modified(|status| {
                        if status.generation != generation {
                            return false;
                        }
                        status.active = status.active.saturating_sub(1);
                        if let (ResultOperationKind::Count, Some(count)) = (kind, output) {
                            status.count = Some(count);
                        }
                        if status.active == 0 {
                            status.loaded = true;
                        }
                        true
                    });
                }
            }
        });
    }

    /// Cancels everything the session has in flight.
    pub fn close(&self) {
        self.cancellation.cancel();
    }

    fn listen_for_results_loading(&mut self) {
        self.loading.cancel();
        self.loading = self.cancellation.child_token();
        self.results.send_modify(|status| {
            status.generation += 1;
            status.active = 0;
            status.count = None;
            status.loaded = false;
        });
    }

    fn state_from_history(&self, reload: bool) -> Option<RawState> {
        let token = match &self.serialized {
            Some(token) if !reload => token.clone(),
            _ => self.history.current()?,
        };
        match state_from_token(&self.profile, &self.prefixes, &token) {
            Ok(state) => Some(state),
            Err(error) => {
                if reload
                    && self
                        .notifications
                        .send(Notification::Warning(
                            "Error restoring search state".to_owned(),
                        ))
                        .is_err()
                {
                    tracing::debug!("Notification receiver is gone");
                }
                tracing::warn!("Error restoring search state: {error}");
                None
            }
        }
    }

    /// Stores `state`, filling a missing search or facet structure from the stored state.
    fn save_state(&mut self, state: RawState) {
        let previous = self.state_from_history(false);
        let (previous_search, previous_facet) = previous
            .map(|previous| (previous.search, previous.facet))
            .unwrap_or_default();
        let state = RawState {
            search: state.search.or(previous_search),
            facet: state.facet.or(previous_facet),
            result: state.result,
        };
        let token = match state_to_token(&self.prefixes, &state) {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!("Cannot save search state: {error}");
                return;
            }
        };
        if self.serialized.as_ref() == Some(&token) {
            return;
        }
        self.serialized = Some(token.clone());
        self.write_history(Some(token));
    }

    fn clear_history(&mut self) {
        if self.history.current().is_some() {
            self.write_history(None);
        } else {
            self.saving.cancel();
        }
    }

    fn write_history(&mut self, token: Option<String>) {
        self.saving.cancel();
        self.saving = self.cancellation.child_token();
        let saving = self.saving.clone();
        let history = Arc::clone(&self.history);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = saving.cancelled() => {}
                result = history.replace(token) => {
                    if let Err(error) = result {
                        tracing::warn!("{error}");
                    }
                }
            }
        });
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
