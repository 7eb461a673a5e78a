//! Catalog persisted as a TOML document.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::CatalogState;
use crate::infrastructure::traits::{CatalogStore, FileSystem};

/// Store that keeps the whole catalog in one TOML file.
///
/// Every transaction re-reads the file, applies the work to the loaded copy
/// and writes the result back atomically. An in-process mutex serializes
/// writers; a missing file reads as an empty catalog.
pub struct FileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ApplicationResult<CatalogState> {
        if !self.fs.exists(&self.path) {
            debug!("file store: {} missing, starting empty", self.path.display());
            return Ok(CatalogState::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read catalog", &self.path)?;
        toml::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
            context: format!("parse catalog: {}", self.path.display()),
            source: Box::new(e),
        })
    }

    fn save(&self, state: &CatalogState) -> ApplicationResult<()> {
        let content =
            toml::to_string_pretty(state).map_err(|e| ApplicationError::OperationFailed {
                context: format!("serialize catalog: {}", self.path.display()),
                source: Box::new(e),
            })?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                self.fs
                    .create_dir_all(dir)
                    .with_path_context("create catalog directory", dir)?;
            }
        }
        self.fs
            .write_atomic(&self.path, &content)
            .with_path_context("write catalog", &self.path)
    }
}

impl CatalogStore for FileStore {
    fn snapshot(&self) -> ApplicationResult<CatalogState> {
        self.load()
    }

    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    fn transact(
        &self,
        work: &mut dyn FnMut(&mut CatalogState) -> ApplicationResult<()>,
    ) -> ApplicationResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut draft = self.load()?;
        work(&mut draft)?;
        self.save(&draft)?;
        debug!("file store: transaction committed");
        Ok(())
    }
}
