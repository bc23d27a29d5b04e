//! Initialize-once slot shared by the model and dataset views.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{OnceCell, Semaphore};

use crate::error::{PredictorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

/// Holds the outcome of a single load for the rest of the process.
///
/// The first caller starts the load as a detached task, so it runs to the
/// end even if that caller goes away. Every caller, early or late, waits
/// for the same stored outcome. Success and failure are both terminal.
pub struct LoadOnce<T> {
    name: &'static str,
    started: AtomicBool,
    cell: Arc<OnceCell<Result<Arc<T>>>>,
    // never has permits; closed once `cell` holds the outcome
    ready: Arc<Semaphore>,
}

impl<T: Send + Sync + 'static> LoadOnce<T> {
    pub fn new(name: &'static str) -> Self {
        LoadOnce {
            name,
            started: AtomicBool::new(false),
            cell: Arc::new(OnceCell::new()),
            ready: Arc::new(Semaphore::new(0)),
        }
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(outcome) = self.cell.get() {
            return outcome.clone();
        }
        if !self.started.swap(true, Ordering::SeqCst) {
            self.spawn_load(load);
        }

        // acquire only returns once the semaphore is closed
        let _ = self.ready.acquire().await;
        match self.cell.get() {
            Some(outcome) => outcome.clone(),
            None => Err(PredictorError::LoadAborted(self.name.to_string())),
        }
    }

    fn spawn_load<F, Fut>(&self, load: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let name = self.name;
        let cell = Arc::clone(&self.cell);
        let ready = Arc::clone(&self.ready);
        log::debug!("loading {}", name);
        tokio::spawn(async move {
            let outcome = match tokio::spawn(async move { load().await }).await {
                Ok(loaded) => loaded.map(Arc::new),
                Err(e) => {
                    log::error!("{} loader panicked: {}", name, e);
                    Err(PredictorError::LoadAborted(name.to_string()))
                }
            };
            if let Err(e) = &outcome {
                log::error!("{} failed to load: {}", name, e);
            }
            let _ = cell.set(outcome);
            ready.close();
        });
    }

    pub fn state(&self) -> LoadState {
        match self.cell.get() {
            Some(Ok(_)) => LoadState::Loaded,
            Some(Err(_)) => LoadState::Failed,
            None if self.started.load(Ordering::SeqCst) => LoadState::Loading,
            None => LoadState::Unloaded,
        }
    }
}
