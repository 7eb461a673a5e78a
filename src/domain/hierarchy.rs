//! Tree-shape validation and parent-pointer walks.

use std::collections::{BTreeMap, HashSet};

use tracing::{error, instrument};

use super::entities::{Node, NodeId};
use super::error::{DomainError, DomainResult};
use super::tree_index::contains;

/// Separator used when joining ancestor names into a full name.
pub const NAME_SEPARATOR: &str = " / ";

/// Validates structural edits before the interval index is touched.
pub struct HierarchyGuard<'a> {
    nodes: &'a BTreeMap<NodeId, Node>,
}

impl<'a> HierarchyGuard<'a> {
    pub fn new(nodes: &'a BTreeMap<NodeId, Node>) -> Self {
        Self { nodes }
    }

    /// Check that `node` may be placed under `candidate` (`None` = top level).
    ///
    /// Rejects self-parenting and placing a node under one of its own
    /// descendants (`Cycle`), unknown parents and kind mismatches
    /// (`InvalidParent`).
    #[instrument(level = "debug", skip(self))]
    pub fn validate_reparent(&self, node: NodeId, candidate: Option<NodeId>) -> DomainResult<()> {
        let moving = self
            .nodes
            .get(&node)
            .ok_or(DomainError::NodeNotFound(node))?;
        let Some(candidate) = candidate else {
            return Ok(());
        };
        if candidate == node {
            return Err(DomainError::Cycle {
                node,
                parent: candidate,
            });
        }
        let parent = self.require_parent(candidate)?;
        if contains(moving, parent) {
            return Err(DomainError::Cycle {
                node,
                parent: candidate,
            });
        }
        self.check_kind(moving, parent)
    }

    /// Check that a new node of the given shape may be attached under `candidate`.
    pub fn validate_new(&self, child: &Node, candidate: Option<NodeId>) -> DomainResult<()> {
        match candidate {
            Some(p) => {
                let parent = self.require_parent(p)?;
                self.check_kind(child, parent)
            }
            None => Ok(()),
        }
    }

    fn require_parent(&self, id: NodeId) -> DomainResult<&'a Node> {
        self.nodes.get(&id).ok_or_else(|| DomainError::InvalidParent {
            parent: id,
            reason: "node does not exist".into(),
        })
    }

    fn check_kind(&self, child: &Node, parent: &Node) -> DomainResult<()> {
        if child.kind != parent.kind {
            return Err(DomainError::InvalidParent {
                parent: parent.id,
                reason: format!("kind {} does not match child kind {}", parent.kind, child.kind),
            });
        }
        Ok(())
    }
}

/// Walk parent pointers from `start` to its root, returning nodes in
/// root-to-leaf order.
///
/// The walk is bounded by `max_depth` and a visited set so that a corrupt
/// table (cycle, dangling parent) yields `CorruptHierarchy` instead of
/// looping.
pub fn ancestry(
    nodes: &BTreeMap<NodeId, Node>,
    start: NodeId,
    max_depth: usize,
) -> DomainResult<Vec<&Node>> {
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(
        nodes
            .get(&start)
            .ok_or(DomainError::NodeNotFound(start))?,
    );

    while let Some(node) = current {
        if !visited.insert(node.id) {
            return Err(corrupt(start, format!("parent cycle through node {}", node.id)));
        }
        if path.len() >= max_depth {
            return Err(corrupt(start, format!("deeper than {max_depth} levels")));
        }
        path.push(node);
        current = match node.parent {
            Some(p) => Some(
                nodes
                    .get(&p)
                    .ok_or_else(|| corrupt(start, format!("dangling parent {p}")))?,
            ),
            None => None,
        };
    }
    path.reverse();
    Ok(path)
}

/// `"Root / Child / Node"` for the given node.
pub fn full_name(
    nodes: &BTreeMap<NodeId, Node>,
    node: NodeId,
    max_depth: usize,
) -> DomainResult<String> {
    let path = ancestry(nodes, node, max_depth)?;
    Ok(path
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(NAME_SEPARATOR))
}

fn corrupt(node: NodeId, message: String) -> DomainError {
    error!(node, %message, "corrupt hierarchy");
    DomainError::CorruptHierarchy { node, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DisplayMode, NodeKind};
    use crate::domain::tree_index::TreeIndex;
    use chrono::Utc;

    fn node(id: NodeId, name: &str) -> Node {
        Node {
            id,
            name: name.into(),
            slug: name.to_lowercase(),
            parent: None,
            left: 0,
            right: 0,
            sequence: 0,
            display_mode: DisplayMode::Variant,
            products_per_page: 10,
            active: true,
            kind: NodeKind::Catalog,
            updated_at: Utc::now(),
        }
    }

    fn chain() -> BTreeMap<NodeId, Node> {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1, "A"), None).unwrap();
        index.attach(node(2, "B"), Some(1)).unwrap();
        index.attach(node(3, "C"), Some(2)).unwrap();
        index.attach(node(4, "D"), None).unwrap();
        nodes
    }

    #[test]
    fn given_node_when_reparenting_to_itself_then_cycle() {
        let nodes = chain();
        let err = HierarchyGuard::new(&nodes)
            .validate_reparent(2, Some(2))
            .unwrap_err();
        assert_eq!(err, DomainError::Cycle { node: 2, parent: 2 });
    }

    #[test]
    fn given_node_when_reparenting_under_descendant_then_cycle() {
        let nodes = chain();
        let err = HierarchyGuard::new(&nodes)
            .validate_reparent(1, Some(3))
            .unwrap_err();
        assert_eq!(err, DomainError::Cycle { node: 1, parent: 3 });
    }

    #[test]
    fn given_unrelated_target_when_reparenting_then_ok() {
        let nodes = chain();
        let guard = HierarchyGuard::new(&nodes);
        assert!(guard.validate_reparent(2, Some(4)).is_ok());
        assert!(guard.validate_reparent(3, None).is_ok());
        assert!(guard.validate_reparent(3, Some(1)).is_ok());
    }

    #[test]
    fn given_unknown_target_when_reparenting_then_invalid_parent() {
        let nodes = chain();
        let err = HierarchyGuard::new(&nodes)
            .validate_reparent(3, Some(99))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { parent: 99, .. }));
    }

    #[test]
    fn given_chain_when_walking_ancestry_then_returns_root_first() {
        let nodes = chain();
        let names: Vec<_> = ancestry(&nodes, 3, 16)
            .unwrap()
            .iter()
            .map(|n| n.name.clone())
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(full_name(&nodes, 3, 16).unwrap(), "A / B / C");
    }

    #[test]
    fn given_parent_cycle_when_walking_ancestry_then_corrupt_hierarchy() {
        let mut nodes = chain();
        nodes.get_mut(&1).unwrap().parent = Some(3);
        let err = ancestry(&nodes, 3, 16).unwrap_err();
        assert!(matches!(err, DomainError::CorruptHierarchy { node: 3, .. }));
    }

    #[test]
    fn given_depth_bound_when_walking_deeper_chain_then_corrupt_hierarchy() {
        let nodes = chain();
        assert!(ancestry(&nodes, 3, 3).is_ok());
        assert!(matches!(
            ancestry(&nodes, 3, 2),
            Err(DomainError::CorruptHierarchy { .. })
        ));
    }
}
