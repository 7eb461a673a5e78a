//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a tree node.
pub type NodeId = u64;
/// Identifier of a product variant.
pub type ProductId = u64;
/// Identifier of a product template (the parent of variants).
pub type TemplateId = u64;
/// Identifier of a website.
pub type WebsiteId = u64;

/// Granularity of a node's product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// One row per linked product variant
    #[default]
    Variant,
    /// One row per distinct parent template
    Template,
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Variant => write!(f, "variant"),
            DisplayMode::Template => write!(f, "template"),
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variant" => Ok(DisplayMode::Variant),
            "template" => Ok(DisplayMode::Template),
            other => Err(format!("unknown display mode: {other}")),
        }
    }
}

/// Type of a tree node. Parent and child must share the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum NodeKind {
    #[default]
    Catalog,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Catalog => write!(f, "catalog"),
        }
    }
}

/// A browsable grouping of products.
///
/// `left`/`right` are the nested-set bounds maintained by
/// [`TreeIndex`](crate::domain::TreeIndex); they are never edited directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    pub left: i64,
    pub right: i64,
    #[serde(default)]
    pub sequence: i32,
    #[serde(default)]
    pub display_mode: DisplayMode,
    pub products_per_page: u32,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub kind: NodeKind,
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Width of the node's interval; `2 * (descendants + 1)` on a consistent tree.
    pub fn width(&self) -> i64 {
        self.right - self.left + 1
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Canonical address of the given listing page of this node.
    pub fn address(&self, page: u32) -> NodeAddress {
        NodeAddress {
            node: self.id,
            slug: self.slug.clone(),
            page,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Values for creating a node. Unset fields fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNode {
    pub name: String,
    pub slug: Option<String>,
    pub parent: Option<NodeId>,
    pub sequence: i32,
    pub display_mode: DisplayMode,
    pub products_per_page: Option<u32>,
    pub active: bool,
    pub kind: NodeKind,
}

impl NewNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            ..Self::default()
        }
    }

    pub fn under(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_products_per_page(mut self, per_page: u32) -> Self {
        self.products_per_page = Some(per_page);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Partial update of a node's plain attributes. Reparenting goes through
/// [`HierarchyService::move_node`](crate::application::services::HierarchyService::move_node).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub sequence: Option<i32>,
    pub display_mode: Option<DisplayMode>,
    pub products_per_page: Option<u32>,
    pub active: Option<bool>,
}

/// Parent of product variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub active: bool,
}

/// A sellable product variant; opaque to the tree except for its visibility flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub template: TemplateId,
    pub code: String,
    pub displayed: bool,
}

/// Association of one product with one node, ordered by `sequence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLink {
    pub product: ProductId,
    pub node: NodeId,
    #[serde(default)]
    pub sequence: i32,
}

/// Showcase slots a website can point at a catalog node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowcaseSlot {
    Featured,
    Latest,
    Upcoming,
}

impl FromStr for ShowcaseSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "featured" => Ok(ShowcaseSlot::Featured),
            "latest" => Ok(ShowcaseSlot::Latest),
            "upcoming" => Ok(ShowcaseSlot::Upcoming),
            other => Err(format!("unknown showcase slot: {other}")),
        }
    }
}

impl fmt::Display for ShowcaseSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShowcaseSlot::Featured => write!(f, "featured"),
            ShowcaseSlot::Latest => write!(f, "latest"),
            ShowcaseSlot::Upcoming => write!(f, "upcoming"),
        }
    }
}

/// A storefront with its own root nodes and showcase slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Website {
    pub id: WebsiteId,
    pub name: String,
    #[serde(default)]
    pub root_nodes: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<NodeId>,
}

impl Website {
    pub fn slot(&self, slot: ShowcaseSlot) -> Option<NodeId> {
        match slot {
            ShowcaseSlot::Featured => self.featured,
            ShowcaseSlot::Latest => self.latest,
            ShowcaseSlot::Upcoming => self.upcoming,
        }
    }

    pub fn slot_mut(&mut self, slot: ShowcaseSlot) -> &mut Option<NodeId> {
        match slot {
            ShowcaseSlot::Featured => &mut self.featured,
            ShowcaseSlot::Latest => &mut self.latest,
            ShowcaseSlot::Upcoming => &mut self.upcoming,
        }
    }

    /// Drop every reference to `node`.
    pub fn forget_node(&mut self, node: NodeId) {
        self.root_nodes.retain(|&n| n != node);
        for slot in [
            &mut self.featured,
            &mut self.latest,
            &mut self.upcoming,
        ] {
            if *slot == Some(node) {
                *slot = None;
            }
        }
    }
}

/// Stable identifiers the web layer builds a node URL from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub node: NodeId,
    pub slug: String,
    pub page: u32,
}

impl NodeAddress {
    /// Render as `<prefix>/<id>/<slug>/<page>`.
    pub fn to_path(&self, prefix: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            prefix.trim_end_matches('/'),
            self.node,
            self.slug,
            self.page
        )
    }
}
