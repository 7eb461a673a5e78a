//! Process-local store backed by a read/write lock.

use std::io;
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::query;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{CatalogState, ListingRow, ProductQuery, Window};
use crate::infrastructure::traits::CatalogStore;

/// Catalog held in memory. Writers are serialized by the lock; readers see
/// the last committed state.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: CatalogState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

fn poisoned<T>(_: PoisonError<T>) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: "catalog lock poisoned".into(),
        source: Box::new(io::Error::new(
            io::ErrorKind::Other,
            "a writer panicked while holding the lock",
        )),
    }
}

impl CatalogStore for MemoryStore {
    fn snapshot(&self) -> ApplicationResult<CatalogState> {
        Ok(self.state.read().map_err(poisoned)?.clone())
    }

    fn transact(
        &self,
        work: &mut dyn FnMut(&mut CatalogState) -> ApplicationResult<()>,
    ) -> ApplicationResult<()> {
        let mut committed = self.state.write().map_err(poisoned)?;
        let mut draft = committed.clone();
        work(&mut draft)?;
        *committed = draft;
        debug!("memory store: transaction committed");
        Ok(())
    }

    fn search(
        &self,
        query: &ProductQuery,
        window: Option<Window>,
    ) -> ApplicationResult<Vec<ListingRow>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(query::execute(&state, query, window)?)
    }

    fn count(&self, query: &ProductQuery) -> ApplicationResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(query::execute(&state, query, None)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::traits::CatalogStoreExt;

    #[test]
    fn given_failing_work_when_transacting_then_state_is_unchanged() {
        let store = MemoryStore::new();
        store
            .write(|s| {
                s.next_node_id();
                Ok(())
            })
            .unwrap();

        let result: ApplicationResult<()> = store.write(|s| {
            s.next_node_id();
            Err(DomainError::NodeNotFound(42).into())
        });

        assert!(result.is_err());
        assert_eq!(store.snapshot().unwrap().ids.node, 2);
    }
}
