//! Subtree product listings
//!
//! Builds the one query shape used for every listing: the baseline visibility
//! filters, the interval scope of the node's subtree and any caller filters,
//! projected in either display mode.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::pagination::{checked_page_size, Paginator};
use crate::application::ApplicationResult;
use crate::domain::{
    Clause, DisplayMode, DomainError, Field, NodeId, NodeKind, Op, ProductQuery,
};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

/// Parameters of a listing request; everything unset falls back to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    /// 1-indexed page
    pub page: u32,
    /// Page size; `None` uses the node's `products_per_page`
    pub per_page: Option<i64>,
    /// Projection; `None` uses the node's display mode
    pub mode: Option<DisplayMode>,
    /// Extra clauses, ANDed with the baseline filters
    pub filters: Vec<Clause>,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: None,
            mode: None,
            filters: Vec::new(),
        }
    }
}

impl ListingRequest {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_per_page(mut self, per_page: i64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_filter(mut self, clause: Clause) -> Self {
        self.filters.push(clause);
        self
    }
}

/// Products visible under `node`'s subtree.
///
/// Scope is the single interval scan `left >= node.left AND right <= node.right`
/// over the linked nodes, with the bounds read each time the query runs;
/// displayed products of active templates only.
pub fn subtree_query(node: NodeId, mode: DisplayMode, filters: &[Clause]) -> ProductQuery {
    ProductQuery::new(mode)
        .within(node)
        .filter(Clause::new(Field::ProductDisplayed, Op::Eq, true))
        .filter(Clause::new(Field::TemplateActive, Op::Eq, true))
        .filters(filters.iter().copied())
}

#[derive(Clone)]
pub struct ListingService {
    store: Arc<dyn CatalogStore>,
}

impl ListingService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Paginated products of `node` and all of its descendants.
    ///
    /// A `per_page` below 1 fails with `InvalidPageSize`; a page past the
    /// end yields an empty slice.
    #[instrument(level = "debug", skip(self, request), fields(page = request.page))]
    pub fn products(&self, node: NodeId, request: &ListingRequest) -> ApplicationResult<Paginator> {
        let node = self.store.read(|state| Ok(state.node(node)?.clone()))?;
        if node.kind != NodeKind::Catalog {
            return Err(DomainError::NotCatalog {
                node: node.id,
                kind: node.kind,
            }
            .into());
        }

        let per_page = match request.per_page {
            Some(n) => checked_page_size(n)?,
            None => node.products_per_page,
        };
        let mode = request.mode.unwrap_or(node.display_mode);
        let query = subtree_query(node.id, mode, &request.filters);
        debug!(node = node.id, %mode, per_page, "built subtree query");

        Ok(Paginator::new(
            Arc::clone(&self.store),
            query,
            request.page,
            per_page,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::{AssociationService, HierarchyService, ProductService};
    use crate::config::Settings;
    use crate::domain::{ListingItem, NewNode};
    use crate::infrastructure::store::MemoryStore;

    struct Fixture {
        hierarchy: HierarchyService,
        products: ProductService,
        links: AssociationService,
        listings: ListingService,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
        Fixture {
            hierarchy: HierarchyService::new(Arc::clone(&store), Arc::new(Settings::default())),
            products: ProductService::new(Arc::clone(&store)),
            links: AssociationService::new(Arc::clone(&store)),
            listings: ListingService::new(store),
        }
    }

    #[test]
    fn given_node_when_building_query_then_scopes_by_node_id() {
        let f = fixture();
        let node = f.hierarchy.create_node(NewNode::named("N")).unwrap();

        let q = subtree_query(node.id, DisplayMode::Template, &[]);

        assert_eq!(q.mode, DisplayMode::Template);
        assert_eq!(q.scope, Some(node.id));
        assert!(q
            .clauses
            .contains(&Clause::new(Field::ProductDisplayed, Op::Eq, true)));
    }

    #[test]
    fn given_hidden_variant_when_listing_then_excluded() {
        let f = fixture();
        let node = f.hierarchy.create_node(NewNode::named("N")).unwrap();
        let t = f.products.add_template("T", true).unwrap();
        let shown = f.products.add_variant(t.id, "A", true).unwrap();
        let hidden = f.products.add_variant(t.id, "B", false).unwrap();
        f.links.link(node.id, shown.id, None).unwrap();
        f.links.link(node.id, hidden.id, None).unwrap();

        let pager = f.listings.products(node.id, &ListingRequest::default()).unwrap();

        let items: Vec<_> = pager.all_items().unwrap().iter().map(|r| r.item).collect();
        assert_eq!(items, vec![ListingItem::Variant(shown.id)]);
    }

    #[test]
    fn given_no_page_size_when_listing_then_uses_node_setting() {
        let f = fixture();
        let node = f
            .hierarchy
            .create_node(NewNode::named("N").with_products_per_page(3))
            .unwrap();

        let pager = f.listings.products(node.id, &ListingRequest::default()).unwrap();
        assert_eq!(pager.per_page(), 3);
    }

    #[test]
    fn given_zero_page_size_when_listing_then_invalid_page_size() {
        let f = fixture();
        let node = f.hierarchy.create_node(NewNode::named("N")).unwrap();

        let err = f
            .listings
            .products(node.id, &ListingRequest::page(1).with_per_page(0))
            .unwrap_err();
        assert_eq!(err.domain(), Some(&DomainError::InvalidPageSize(0)));
    }
}
