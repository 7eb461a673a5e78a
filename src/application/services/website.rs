//! Websites: root nodes and showcase slots

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::pagination::Paginator;
use crate::application::services::listing::{ListingRequest, ListingService};
use crate::application::ApplicationResult;
use crate::domain::{DomainError, NodeId, NodeKind, ShowcaseSlot, Website, WebsiteId};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

#[derive(Clone)]
pub struct WebsiteService {
    store: Arc<dyn CatalogStore>,
    listings: ListingService,
}

impl WebsiteService {
    pub fn new(store: Arc<dyn CatalogStore>, listings: ListingService) -> Self {
        Self { store, listings }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn create(&self, name: &str) -> ApplicationResult<Website> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidField {
                field: "name",
                message: "must not be empty".into(),
            }
            .into());
        }
        self.store.write(|state| {
            let id = state.next_website_id();
            let site = Website {
                id,
                name: name.to_string(),
                root_nodes: Vec::new(),
                featured: None,
                latest: None,
                upcoming: None,
            };
            state.websites.insert(id, site.clone());
            Ok(site)
        })
    }

    pub fn get(&self, id: WebsiteId) -> ApplicationResult<Website> {
        self.store.read(|state| Ok(state.website(id)?.clone()))
    }

    /// Register `node` as a root of the website's navigation. The node must
    /// be a root of the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn add_root(&self, id: WebsiteId, node: NodeId) -> ApplicationResult<Website> {
        self.store.write(|state| {
            let n = state.node(node)?;
            if !n.is_root() {
                return Err(DomainError::InvalidParent {
                    parent: node,
                    reason: "website roots must be top-level nodes".into(),
                }
                .into());
            }
            let site = state.website_mut(id)?;
            if !site.root_nodes.contains(&node) {
                site.root_nodes.push(node);
            }
            Ok(site.clone())
        })
    }

    pub fn remove_root(&self, id: WebsiteId, node: NodeId) -> ApplicationResult<Website> {
        self.store.write(|state| {
            let site = state.website_mut(id)?;
            site.root_nodes.retain(|&n| n != node);
            Ok(site.clone())
        })
    }

    /// Point `slot` at a catalog node, or clear it with `None`.
    #[instrument(level = "debug", skip(self))]
    pub fn set_slot(
        &self,
        id: WebsiteId,
        slot: ShowcaseSlot,
        node: Option<NodeId>,
    ) -> ApplicationResult<Website> {
        self.store.write(|state| {
            if let Some(node) = node {
                let n = state.node(node)?;
                if n.kind != NodeKind::Catalog {
                    return Err(DomainError::NotCatalog { node, kind: n.kind }.into());
                }
            }
            let site = state.website_mut(id)?;
            *site.slot_mut(slot) = node;
            debug!(website = id, %slot, ?node, "set showcase slot");
            Ok(site.clone())
        })
    }

    /// Listing of the node in `slot`, or `None` if the slot is empty.
    pub fn slot_products(
        &self,
        id: WebsiteId,
        slot: ShowcaseSlot,
        request: &ListingRequest,
    ) -> ApplicationResult<Option<Paginator>> {
        let node = self.store.read(|state| Ok(state.website(id)?.slot(slot)))?;
        node.map(|n| self.listings.products(n, request)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::HierarchyService;
    use crate::config::Settings;
    use crate::domain::NewNode;
    use crate::infrastructure::store::MemoryStore;

    fn services() -> (WebsiteService, HierarchyService) {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        let settings = Arc::new(Settings::default());
        let listings = ListingService::new(Arc::clone(&store));
        (
            WebsiteService::new(Arc::clone(&store), listings),
            HierarchyService::new(store, settings),
        )
    }

    #[test]
    fn given_child_node_when_adding_as_root_then_invalid_parent() {
        let (sites, tree) = services();
        let root = tree.create_node(NewNode::named("Root")).unwrap();
        let child = tree.create_node(NewNode::named("Child").under(root.id)).unwrap();
        let site = sites.create("shop").unwrap();

        assert!(sites.add_root(site.id, child.id).is_err());
        assert_eq!(sites.add_root(site.id, root.id).unwrap().root_nodes, vec![root.id]);
    }

    #[test]
    fn given_slot_node_deleted_when_reading_website_then_slot_is_cleared() {
        let (sites, tree) = services();
        let node = tree.create_node(NewNode::named("Featured")).unwrap();
        let site = sites.create("shop").unwrap();
        sites
            .set_slot(site.id, ShowcaseSlot::Featured, Some(node.id))
            .unwrap();

        tree.delete_node(node.id).unwrap();

        let site = sites.get(site.id).unwrap();
        assert_eq!(site.featured, None);
        assert!(sites
            .slot_products(site.id, ShowcaseSlot::Featured, &ListingRequest::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn given_registered_root_when_nesting_it_then_invalid_parent_and_tree_unchanged() {
        let (sites, tree) = services();
        let shop = tree.create_node(NewNode::named("Shop")).unwrap();
        let other = tree.create_node(NewNode::named("Other")).unwrap();
        let site = sites.create("shop").unwrap();
        sites.add_root(site.id, shop.id).unwrap();

        let err = tree.move_node(shop.id, Some(other.id)).unwrap_err();

        assert!(matches!(
            err.domain(),
            Some(DomainError::InvalidParent { parent, .. }) if *parent == other.id
        ));
        assert_eq!(tree.get_node(shop.id).unwrap(), shop);
        tree.check().unwrap();
    }

    #[test]
    fn given_root_removed_from_website_when_nesting_it_then_move_succeeds() {
        let (sites, tree) = services();
        let shop = tree.create_node(NewNode::named("Shop")).unwrap();
        let other = tree.create_node(NewNode::named("Other")).unwrap();
        let site = sites.create("shop").unwrap();
        sites.add_root(site.id, shop.id).unwrap();
        sites.add_root(site.id, other.id).unwrap();

        let site = sites.remove_root(site.id, shop.id).unwrap();
        assert_eq!(site.root_nodes, vec![other.id]);

        let moved = tree.move_node(shop.id, Some(other.id)).unwrap();
        assert_eq!(moved.parent, Some(other.id));
        sites.add_root(site.id, shop.id).unwrap_err();
        tree.move_node(shop.id, None).unwrap();
        sites.add_root(site.id, shop.id).unwrap();
    }
}
