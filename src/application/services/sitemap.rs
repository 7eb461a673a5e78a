//! Sitemap projection over active nodes
//!
//! Only a node's own `active` flag counts: an active child of an inactive
//! parent is still listed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::application::pagination::{page_count, page_window};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{CatalogState, Node, NodeAddress};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

/// What a sitemap index document needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SitemapIndex {
    pub total_nodes: usize,
    pub page_size: u32,
    pub pages: usize,
}

/// One node of a sitemap page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub address: NodeAddress,
    pub url: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: String,
}

#[derive(Clone)]
pub struct SitemapService {
    store: Arc<dyn CatalogStore>,
    settings: Arc<Settings>,
}

impl SitemapService {
    pub fn new(store: Arc<dyn CatalogStore>, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    pub fn index(&self) -> ApplicationResult<SitemapIndex> {
        let page_size = self.settings.sitemap.page_size;
        let total_nodes = self.store.read(|state| Ok(active_nodes(state).len()))?;
        Ok(SitemapIndex {
            total_nodes,
            page_size,
            pages: page_count(total_nodes, page_size),
        })
    }

    /// Entries of the 1-indexed sitemap page `page`, in tree order.
    #[instrument(level = "debug", skip(self))]
    pub fn page(&self, page: u32) -> ApplicationResult<Vec<SitemapEntry>> {
        let window = page_window(page, self.settings.sitemap.page_size)?;
        let prefix = &self.settings.catalog.url_prefix;
        let changefreq = &self.settings.sitemap.changefreq;
        self.store.read(|state| {
            Ok(active_nodes(state)
                .into_iter()
                .skip(window.offset)
                .take(window.limit)
                .map(|n| {
                    let address = n.address(1);
                    SitemapEntry {
                        url: address.to_path(prefix),
                        address,
                        lastmod: n.updated_at,
                        changefreq: changefreq.clone(),
                    }
                })
                .collect())
        })
    }
}

fn active_nodes(state: &CatalogState) -> Vec<&Node> {
    let mut nodes: Vec<&Node> = state.nodes.values().filter(|n| n.active).collect();
    nodes.sort_by_key(|n| n.left);
    nodes
}
