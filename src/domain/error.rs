//! Domain-level errors (no external dependencies)

use thiserror::Error;

use super::entities::{NodeId, NodeKind, ProductId, TemplateId, WebsiteId};

/// Domain errors represent violations of the catalog tree's rules.
/// These are independent of storage concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cycle detected: node {node} cannot be placed under {parent}")]
    Cycle { node: NodeId, parent: NodeId },

    #[error("invalid parent {parent}: {reason}")]
    InvalidParent { parent: NodeId, reason: String },

    #[error("product {product} is already linked to node {node}")]
    DuplicateLink { node: NodeId, product: ProductId },

    #[error("product {product} is not linked to node {node}")]
    LinkNotFound { node: NodeId, product: ProductId },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("template not found: {0}")]
    TemplateNotFound(TemplateId),

    #[error("website not found: {0}")]
    WebsiteNotFound(WebsiteId),

    #[error("node {0} still has children")]
    HasChildren(NodeId),

    #[error("node {node} is a {kind} node, products are listed on catalog nodes only")]
    NotCatalog { node: NodeId, kind: NodeKind },

    #[error("invalid page size: {0} (must be at least 1)")]
    InvalidPageSize(i64),

    #[error("invalid page: {0} (pages start at 1)")]
    InvalidPage(u32),

    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("corrupt hierarchy at node {node}: {message}")]
    CorruptHierarchy { node: NodeId, message: String },
}

impl DomainError {
    /// True for errors that mean "the referenced thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::LinkNotFound { .. }
                | DomainError::NodeNotFound(_)
                | DomainError::ProductNotFound(_)
                | DomainError::TemplateNotFound(_)
                | DomainError::WebsiteNotFound(_)
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
