use semsearch_state::StateError;

/// An error raised by a [`SearchSession`](crate::session::SearchSession) or its collaborators.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    /// The session state could not be serialized or restored.
    #[error(transparent)]
    State(#[from] StateError),
    /// The history backend failed to store a token.
    #[error("Cannot update search history: {0}")]
    History(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}
