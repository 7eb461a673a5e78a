//! I/O boundary traits for testability
//!
//! These traits abstract the storage collaborator and the filesystem, allowing
//! services to be tested against in-memory implementations.

use std::io::{self, Write};
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{CatalogState, ListingRow, ProductQuery, Window};
use crate::infrastructure::store::query;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content so readers see either the old or the new content.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Transactional storage of the catalog tables.
///
/// The store is the only shared mutable resource. Services hold no tree in
/// memory between calls and re-read what they need through this trait.
pub trait CatalogStore: Send + Sync {
    /// A consistent copy of the committed state.
    fn snapshot(&self) -> ApplicationResult<CatalogState>;

    /// Run `work` against a private copy of the state while holding the
    /// store's write lock. The copy is committed only if `work` returns `Ok`;
    /// on error nothing changes.
    fn transact(
        &self,
        work: &mut dyn FnMut(&mut CatalogState) -> ApplicationResult<()>,
    ) -> ApplicationResult<()>;

    /// Ordered rows of `query`, optionally restricted to a window. Scope
    /// bounds come from the same state the rows are read from.
    fn search(
        &self,
        query: &ProductQuery,
        window: Option<Window>,
    ) -> ApplicationResult<Vec<ListingRow>> {
        let state = self.snapshot()?;
        Ok(query::execute(&state, query, window)?)
    }

    /// Number of rows `query` yields.
    fn count(&self, query: &ProductQuery) -> ApplicationResult<usize> {
        let state = self.snapshot()?;
        Ok(query::execute(&state, query, None)?.len())
    }
}

/// Convenience layer over [`CatalogStore`] for closures that produce a value.
pub trait CatalogStoreExt {
    /// Like [`CatalogStore::transact`], returning what `work` produced.
    fn write<T>(
        &self,
        work: impl FnMut(&mut CatalogState) -> ApplicationResult<T>,
    ) -> ApplicationResult<T>;

    /// Run `read` against a snapshot.
    fn read<T>(&self, read: impl FnOnce(&CatalogState) -> ApplicationResult<T>)
        -> ApplicationResult<T>;
}

impl<S: CatalogStore + ?Sized> CatalogStoreExt for S {
    fn write<T>(
        &self,
        mut work: impl FnMut(&mut CatalogState) -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        let mut out = None;
        self.transact(&mut |state| {
            out = Some(work(state)?);
            Ok(())
        })?;
        out.ok_or_else(|| ApplicationError::OperationFailed {
            context: "transaction committed without running".into(),
            source: Box::new(io::Error::new(io::ErrorKind::Other, "no result")),
        })
    }

    fn read<T>(
        &self,
        read: impl FnOnce(&CatalogState) -> ApplicationResult<T>,
    ) -> ApplicationResult<T> {
        let state = self.snapshot()?;
        read(&state)
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}
