//! Breadcrumb resolution

use std::sync::Arc;

use tracing::instrument;

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{ancestry, NodeAddress, NodeId};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

/// One entry of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// `None` for the synthetic home entry
    pub address: Option<NodeAddress>,
    pub label: String,
    pub url: String,
}

#[derive(Clone)]
pub struct BreadcrumbService {
    store: Arc<dyn CatalogStore>,
    settings: Arc<Settings>,
}

impl BreadcrumbService {
    pub fn new(store: Arc<dyn CatalogStore>, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    /// Root-to-leaf trail ending at `node`, optionally led by a home entry.
    ///
    /// The parent walk is bounded, so a corrupt table fails with
    /// `CorruptHierarchy` instead of looping.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, node: NodeId, include_home: bool) -> ApplicationResult<Vec<Crumb>> {
        let catalog = &self.settings.catalog;
        self.store.read(|state| {
            let path = ancestry(&state.nodes, node, catalog.max_tree_depth)?;
            let mut crumbs = Vec::with_capacity(path.len() + 1);
            if include_home {
                crumbs.push(Crumb {
                    address: None,
                    label: catalog.home_label.clone(),
                    url: catalog.home_url.clone(),
                });
            }
            crumbs.extend(path.into_iter().map(|n| {
                let address = n.address(1);
                Crumb {
                    url: address.to_path(&catalog.url_prefix),
                    address: Some(address),
                    label: n.name.clone(),
                }
            }));
            Ok(crumbs)
        })
    }
}
