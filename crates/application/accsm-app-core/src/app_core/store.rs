use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::AppState;
use crate::review::ValidationReview;

use super::{events::DomainEvent, reducer::reduce};

#[derive(Clone)]
pub struct AppStore {
    inner: Arc<Mutex<AppState>>,
}

impl AppStore {
    pub fn new(state: AppState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    pub fn apply(&self, ev: DomainEvent) {
        let mut guard = self.lock();
        let next = reduce(guard.clone(), ev);
        *guard = next;
    }

    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let mut guard = self.lock();
        f(&mut guard)
    }

    /// Read access to the open review without cloning the whole state.
    pub fn with_review<R>(&self, f: impl FnOnce(&ValidationReview) -> R) -> Option<R> {
        let guard = self.lock();
        guard.import.review().map(f)
    }
}
