//! Node hierarchy service
//!
//! Every structural write runs inside one store transaction in two phases:
//! validate with [`HierarchyGuard`], then renumber with [`TreeIndex`]. A
//! rejected write leaves every interval untouched.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    contains, full_name, node_slug, slugify, verify, DomainError, DomainResult,
    HierarchyGuard, NewNode, Node, NodeId, NodeUpdate, TreeIndex,
};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

/// Service for creating, editing, moving and deleting tree nodes.
#[derive(Clone)]
pub struct HierarchyService {
    store: Arc<dyn CatalogStore>,
    settings: Arc<Settings>,
}

impl HierarchyService {
    pub fn new(store: Arc<dyn CatalogStore>, settings: Arc<Settings>) -> Self {
        Self { store, settings }
    }

    /// Create a node and attach it as the last child of its parent (or as
    /// the last root). Without an explicit slug, the slug is derived from the
    /// node's full name.
    #[instrument(level = "debug", skip(self, draft), fields(name = %draft.name))]
    pub fn create_node(&self, draft: NewNode) -> ApplicationResult<Node> {
        validate_name(&draft.name)?;
        let per_page = match draft.products_per_page {
            Some(n) => validate_per_page(n)?,
            None => self.settings.catalog.default_products_per_page,
        };
        let max_depth = self.settings.catalog.max_tree_depth;

        let node = self.store.write(|state| {
            let id = state.next_node_id();
            let node = Node {
                id,
                name: draft.name.trim().to_string(),
                slug: String::new(),
                parent: draft.parent,
                left: 0,
                right: 0,
                sequence: draft.sequence,
                display_mode: draft.display_mode,
                products_per_page: per_page,
                active: draft.active,
                kind: draft.kind,
                updated_at: Utc::now(),
            };
            HierarchyGuard::new(&state.nodes).validate_new(&node, draft.parent)?;
            TreeIndex::new(&mut state.nodes).attach(node, draft.parent)?;

            let slug = match draft.slug.as_deref().map(slugify) {
                Some(s) if !s.is_empty() => s,
                _ => slugify(&full_name(&state.nodes, id, max_depth)?),
            };
            let node = state.node_mut(id)?;
            node.slug = node_slug(slug, id);
            Ok(node.clone())
        })?;

        info!(node = node.id, parent = ?node.parent, "created node");
        Ok(node)
    }

    pub fn get_node(&self, id: NodeId) -> ApplicationResult<Node> {
        self.store.read(|state| Ok(state.node(id)?.clone()))
    }

    /// Direct children of `parent` (`None` = roots), by `(sequence, id)`.
    pub fn children(&self, parent: Option<NodeId>) -> ApplicationResult<Vec<Node>> {
        self.store.read(|state| {
            if let Some(p) = parent {
                state.node(p)?;
            }
            Ok(state.children(parent).into_iter().cloned().collect())
        })
    }

    /// The node and all of its descendants in nested-set order.
    pub fn subtree(&self, id: NodeId) -> ApplicationResult<Vec<Node>> {
        self.store.read(|state| {
            let root = state.node(id)?;
            let mut nodes: Vec<Node> = state
                .nodes
                .values()
                .filter(|n| contains(root, n))
                .cloned()
                .collect();
            nodes.sort_by_key(|n| n.left);
            Ok(nodes)
        })
    }

    /// Every node in nested-set order (a pre-order walk of the forest).
    pub fn all_nodes(&self) -> ApplicationResult<Vec<Node>> {
        self.store.read(|state| {
            let mut nodes: Vec<Node> = state.nodes.values().cloned().collect();
            nodes.sort_by_key(|n| n.left);
            Ok(nodes)
        })
    }

    /// `true` if `ancestor` is `descendant` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> ApplicationResult<bool> {
        self.store
            .read(|state| Ok(contains(state.node(ancestor)?, state.node(descendant)?)))
    }

    /// `"Root / Child / Node"`.
    pub fn full_name(&self, id: NodeId) -> ApplicationResult<String> {
        let max_depth = self.settings.catalog.max_tree_depth;
        self.store
            .read(|state| Ok(full_name(&state.nodes, id, max_depth)?))
    }

    /// Edit plain attributes. An explicitly empty slug is regenerated from
    /// the full name.
    #[instrument(level = "debug", skip(self))]
    pub fn update_node(&self, id: NodeId, update: NodeUpdate) -> ApplicationResult<Node> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(n) = update.products_per_page {
            validate_per_page(n)?;
        }
        let max_depth = self.settings.catalog.max_tree_depth;

        self.store.write(|state| {
            let node = state.node_mut(id)?;
            if let Some(name) = &update.name {
                node.name = name.trim().to_string();
            }
            if let Some(sequence) = update.sequence {
                node.sequence = sequence;
            }
            if let Some(mode) = update.display_mode {
                node.display_mode = mode;
            }
            if let Some(n) = update.products_per_page {
                node.products_per_page = n;
            }
            if let Some(active) = update.active {
                node.active = active;
            }
            node.updated_at = Utc::now();

            if let Some(slug) = &update.slug {
                let slug = match slugify(slug) {
                    s if s.is_empty() => slugify(&full_name(&state.nodes, id, max_depth)?),
                    s => s,
                };
                state.node_mut(id)?.slug = node_slug(slug, id);
            }
            debug!(node = id, "updated node");
            Ok(state.node(id)?.clone())
        })
    }

    /// Reparent `id` (with its whole subtree) under `new_parent`, or make it
    /// a root when `new_parent` is `None`.
    ///
    /// Fails with `Cycle` when `new_parent` is the node itself or one of its
    /// descendants, and with `InvalidParent` when a website still uses the
    /// node as a root and `new_parent` would nest it; nothing changes in
    /// either case.
    #[instrument(level = "debug", skip(self))]
    pub fn move_node(&self, id: NodeId, new_parent: Option<NodeId>) -> ApplicationResult<Node> {
        let node = self.store.write(|state| {
            HierarchyGuard::new(&state.nodes).validate_reparent(id, new_parent)?;
            if let Some(parent) = new_parent {
                if let Some(site) = state.websites.values().find(|w| w.root_nodes.contains(&id)) {
                    return Err(DomainError::InvalidParent {
                        parent,
                        reason: format!("node {id} is a root of website {}", site.id),
                    }
                    .into());
                }
            }
            TreeIndex::new(&mut state.nodes).move_subtree(id, new_parent)?;
            let node = state.node_mut(id)?;
            node.updated_at = Utc::now();
            Ok(node.clone())
        })?;
        info!(node = id, parent = ?new_parent, "moved node");
        Ok(node)
    }

    /// Delete a leaf node together with its product links and website
    /// references. Nodes with children are refused (`HasChildren`).
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&self, id: NodeId) -> ApplicationResult<()> {
        self.store.write(|state| {
            state.node(id)?;
            if !state.children(Some(id)).is_empty() {
                return Err(DomainError::HasChildren(id).into());
            }
            let removed = TreeIndex::new(&mut state.nodes).detach(id)?;
            let ids: Vec<NodeId> = removed.iter().map(|n| n.id).collect();
            state.cascade_removed_nodes(&ids);
            Ok(())
        })?;
        info!(node = id, "deleted node");
        Ok(())
    }

    /// Recompute all intervals from parent pointers. Returns the node count.
    #[instrument(level = "debug", skip(self))]
    pub fn reindex(&self) -> ApplicationResult<usize> {
        let count = self.store.write(|state| {
            TreeIndex::new(&mut state.nodes).rebuild()?;
            Ok(state.nodes.len())
        })?;
        info!(nodes = count, "reindexed tree");
        Ok(count)
    }

    /// Verify the nested-set invariants of the committed tree.
    pub fn check(&self) -> ApplicationResult<()> {
        self.store.read(|state| Ok(verify(&state.nodes)?))
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidField {
            field: "name",
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

fn validate_per_page(per_page: u32) -> DomainResult<u32> {
    if per_page == 0 {
        return Err(DomainError::InvalidPageSize(0));
    }
    Ok(per_page)
}
