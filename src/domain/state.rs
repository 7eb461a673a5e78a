//! The catalog aggregate: every row the store persists.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entities::{
    Node, NodeId, Product, ProductId, ProductLink, Template, TemplateId, Website, WebsiteId,
};
use super::error::{DomainError, DomainResult};

/// Next free identifier per table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdSequences {
    pub node: u64,
    pub template: u64,
    pub product: u64,
    pub website: u64,
}

impl Default for IdSequences {
    fn default() -> Self {
        Self {
            node: 1,
            template: 1,
            product: 1,
            website: 1,
        }
    }
}

/// In-memory image of the catalog tables.
///
/// Stores hand out copies of this for reads and run structural writes
/// against a private copy that is committed as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CatalogDocument", into = "CatalogDocument")]
pub struct CatalogState {
    pub ids: IdSequences,
    pub nodes: BTreeMap<NodeId, Node>,
    pub templates: BTreeMap<TemplateId, Template>,
    pub products: BTreeMap<ProductId, Product>,
    pub links: BTreeMap<(NodeId, ProductId), ProductLink>,
    pub websites: BTreeMap<WebsiteId, Website>,
}

impl CatalogState {
    pub fn node(&self, id: NodeId) -> DomainResult<&Node> {
        self.nodes.get(&id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(DomainError::NodeNotFound(id))
    }

    pub fn product(&self, id: ProductId) -> DomainResult<&Product> {
        self.products.get(&id).ok_or(DomainError::ProductNotFound(id))
    }

    pub fn template(&self, id: TemplateId) -> DomainResult<&Template> {
        self.templates
            .get(&id)
            .ok_or(DomainError::TemplateNotFound(id))
    }

    pub fn website(&self, id: WebsiteId) -> DomainResult<&Website> {
        self.websites.get(&id).ok_or(DomainError::WebsiteNotFound(id))
    }

    pub fn website_mut(&mut self, id: WebsiteId) -> DomainResult<&mut Website> {
        self.websites
            .get_mut(&id)
            .ok_or(DomainError::WebsiteNotFound(id))
    }

    /// Direct children of `parent` ordered by `(sequence, id)`.
    pub fn children(&self, parent: Option<NodeId>) -> Vec<&Node> {
        let mut kids: Vec<&Node> = self
            .nodes
            .values()
            .filter(|n| n.parent == parent)
            .collect();
        kids.sort_by_key(|n| (n.sequence, n.id));
        kids
    }

    pub fn next_node_id(&mut self) -> NodeId {
        take(&mut self.ids.node)
    }

    pub fn next_template_id(&mut self) -> TemplateId {
        take(&mut self.ids.template)
    }

    pub fn next_product_id(&mut self) -> ProductId {
        take(&mut self.ids.product)
    }

    pub fn next_website_id(&mut self) -> WebsiteId {
        take(&mut self.ids.website)
    }

    /// Drop links and website references to nodes that no longer exist.
    pub fn cascade_removed_nodes(&mut self, removed: &[NodeId]) {
        self.links.retain(|(node, _), _| !removed.contains(node));
        for site in self.websites.values_mut() {
            for id in removed {
                site.forget_node(*id);
            }
        }
    }

    /// Drop links to products that no longer exist.
    pub fn cascade_removed_products(&mut self) {
        let products = &self.products;
        self.links.retain(|(_, product), _| products.contains_key(product));
    }
}

fn take(counter: &mut u64) -> u64 {
    let id = *counter;
    *counter += 1;
    id
}

/// On-disk shape of [`CatalogState`]: tables as arrays, since document
/// formats like TOML only allow string keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct CatalogDocument {
    ids: IdSequences,
    nodes: Vec<Node>,
    templates: Vec<Template>,
    products: Vec<Product>,
    links: Vec<ProductLink>,
    websites: Vec<Website>,
}

impl From<CatalogDocument> for CatalogState {
    fn from(doc: CatalogDocument) -> Self {
        Self {
            ids: doc.ids,
            nodes: doc.nodes.into_iter().map(|n| (n.id, n)).collect(),
            templates: doc.templates.into_iter().map(|t| (t.id, t)).collect(),
            products: doc.products.into_iter().map(|p| (p.id, p)).collect(),
            links: doc
                .links
                .into_iter()
                .map(|l| ((l.node, l.product), l))
                .collect(),
            websites: doc.websites.into_iter().map(|w| (w.id, w)).collect(),
        }
    }
}

impl From<CatalogState> for CatalogDocument {
    fn from(state: CatalogState) -> Self {
        Self {
            ids: state.ids,
            nodes: state.nodes.into_values().collect(),
            templates: state.templates.into_values().collect(),
            products: state.products.into_values().collect(),
            links: state.links.into_values().collect(),
            websites: state.websites.into_values().collect(),
        }
    }
}
