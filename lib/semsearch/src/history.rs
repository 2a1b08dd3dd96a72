use crate::error::SessionError;
use async_trait::async_trait;
use tokio::sync::watch;

/// Where a session keeps the token of its current state, e.g. a query parameter of the page
/// address.
#[async_trait]
pub trait History: Send + Sync {
    /// The token stored right now.
    fn current(&self) -> Option<String>;

    /// Replaces the stored token. `None` removes it.
    async fn replace(&self, token: Option<String>) -> Result<(), SessionError>;
}

/// A [`History`] kept in memory that records every write.
#[derive(Debug)]
pub struct MemoryHistory {
    writes: watch::Sender<Vec<Option<String>>>,
    current: std::sync::RwLock<Option<String>>,
}

impl MemoryHistory {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            writes: watch::Sender::new(Vec::new()),
            current: std::sync::RwLock::new(initial),
        }
    }

    /// Observes the list of writes so far.
    pub fn writes(&self) -> watch::Receiver<Vec<Option<String>>> {
        self.writes.subscribe()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl History for MemoryHistory {
    fn current(&self) -> Option<String> {
        self.current
            .read()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |token| token.clone())
    }

    async fn replace(&self, token: Option<String>) -> Result<(), SessionError> {
        match self.current.write() {
            Ok(mut current) => current.clone_from(&token),
            Err(poisoned) => poisoned.into_inner().clone_from(&token),
        }
        self.writes.send_modify(|writes| writes.push(token));
        Ok(())
    }
}
