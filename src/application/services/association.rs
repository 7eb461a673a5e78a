//! Product association service (node ↔ product links)

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{DomainError, NodeId, ProductId, ProductLink};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

/// Sequence given to links created without one.
pub const DEFAULT_SEQUENCE: i32 = 10;

/// CRUD over product links, one link per `(node, product)` pair.
#[derive(Clone)]
pub struct AssociationService {
    store: Arc<dyn CatalogStore>,
}

impl AssociationService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Link `product` to `node`. A second link for the same pair is refused
    /// with `DuplicateLink`.
    #[instrument(level = "debug", skip(self))]
    pub fn link(
        &self,
        node: NodeId,
        product: ProductId,
        sequence: Option<i32>,
    ) -> ApplicationResult<ProductLink> {
        self.store.write(|state| {
            state.node(node)?;
            state.product(product)?;
            if state.links.contains_key(&(node, product)) {
                return Err(DomainError::DuplicateLink { node, product }.into());
            }
            let link = ProductLink {
                product,
                node,
                sequence: sequence.unwrap_or(DEFAULT_SEQUENCE),
            };
            state.links.insert((node, product), link);
            debug!(node, product, sequence = link.sequence, "linked product");
            Ok(link)
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn unlink(&self, node: NodeId, product: ProductId) -> ApplicationResult<()> {
        self.store.write(|state| {
            state
                .links
                .remove(&(node, product))
                .map(|_| ())
                .ok_or_else(|| DomainError::LinkNotFound { node, product }.into())
        })
    }

    /// Change the listing position of an existing link.
    pub fn set_sequence(
        &self,
        node: NodeId,
        product: ProductId,
        sequence: i32,
    ) -> ApplicationResult<ProductLink> {
        self.store.write(|state| {
            let link = state
                .links
                .get_mut(&(node, product))
                .ok_or(DomainError::LinkNotFound { node, product })?;
            link.sequence = sequence;
            Ok(*link)
        })
    }

    /// Links of `node`, ordered by `(sequence, product)`.
    pub fn list_for_node(&self, node: NodeId) -> ApplicationResult<Vec<ProductLink>> {
        self.store.read(|state| {
            state.node(node)?;
            let mut links: Vec<ProductLink> = state
                .links
                .range((node, ProductId::MIN)..=(node, ProductId::MAX))
                .map(|(_, link)| *link)
                .collect();
            links.sort_by_key(|l| (l.sequence, l.product));
            Ok(links)
        })
    }

    /// Nodes a product is linked to, in id order.
    pub fn nodes_for_product(&self, product: ProductId) -> ApplicationResult<Vec<NodeId>> {
        self.store.read(|state| {
            state.product(product)?;
            Ok(state
                .links
                .values()
                .filter(|l| l.product == product)
                .map(|l| l.node)
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{HierarchyService, ProductService};
    use crate::config::Settings;
    use crate::domain::NewNode;
    use crate::infrastructure::store::MemoryStore;

    /// One root node and two displayed variants of one template.
    fn seeded() -> (AssociationService, Arc<dyn CatalogStore>) {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        let hierarchy = HierarchyService::new(Arc::clone(&store), Arc::new(Settings::default()));
        let products = ProductService::new(Arc::clone(&store));

        hierarchy.create_node(NewNode::named("Root")).unwrap();
        let shirt = products.add_template("Shirt", true).unwrap();
        products.add_variant(shirt.id, "S", true).unwrap();
        products.add_variant(shirt.id, "M", true).unwrap();

        (AssociationService::new(Arc::clone(&store)), store)
    }

    #[test]
    fn given_existing_link_when_linking_again_then_duplicate_link() {
        let (svc, _) = seeded();
        svc.link(1, 1, None).unwrap();

        let err = svc.link(1, 1, Some(5)).unwrap_err();
        assert_eq!(
            err.domain(),
            Some(&DomainError::DuplicateLink { node: 1, product: 1 })
        );
    }

    #[test]
    fn given_no_sequence_when_linking_then_uses_default() {
        let (svc, _) = seeded();
        assert_eq!(svc.link(1, 2, None).unwrap().sequence, DEFAULT_SEQUENCE);
    }

    #[test]
    fn given_equal_sequences_when_listing_then_ties_break_by_product_id() {
        let (svc, _) = seeded();
        svc.link(1, 2, Some(5)).unwrap();
        svc.link(1, 1, Some(5)).unwrap();

        let order: Vec<_> = svc
            .list_for_node(1)
            .unwrap()
            .iter()
            .map(|l| l.product)
            .collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn given_missing_link_when_unlinking_then_link_not_found() {
        let (svc, store) = seeded();
        let before = store.snapshot().unwrap();

        let err = svc.unlink(1, 2).unwrap_err();
        assert!(err.domain().is_some_and(DomainError::is_not_found));
        assert_eq!(store.snapshot().unwrap(), before);
    }

    #[test]
    fn given_unknown_product_when_linking_then_product_not_found() {
        let (svc, _) = seeded();
        let err = svc.link(1, 99, None).unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::ProductNotFound(99)));
    }

    #[test]
    fn given_link_when_changing_sequence_then_listing_order_follows() {
        let (svc, _) = seeded();
        svc.link(1, 1, Some(1)).unwrap();
        svc.link(1, 2, Some(2)).unwrap();

        let link = svc.set_sequence(1, 1, 3).unwrap();

        assert_eq!(link.sequence, 3);
        let order: Vec<_> = svc.list_for_node(1).unwrap().iter().map(|l| l.product).collect();
        assert_eq!(order, vec![2, 1]);
        assert_eq!(
            svc.set_sequence(1, 99, 0).unwrap_err().domain(),
            Some(&DomainError::LinkNotFound { node: 1, product: 99 })
        );
    }

    #[test]
    fn given_product_on_two_nodes_when_asking_nodes_then_lists_both() {
        let (svc, store) = seeded();
        let hierarchy = HierarchyService::new(store, Arc::new(Settings::default()));
        let second = hierarchy.create_node(NewNode::named("Second")).unwrap();
        svc.link(second.id, 1, None).unwrap();
        svc.link(1, 1, None).unwrap();

        assert_eq!(svc.nodes_for_product(1).unwrap(), vec![1, second.id]);
        assert!(svc.nodes_for_product(2).unwrap().is_empty());
        assert_eq!(
            svc.nodes_for_product(99).unwrap_err().domain(),
            Some(&DomainError::ProductNotFound(99))
        );
    }
}
