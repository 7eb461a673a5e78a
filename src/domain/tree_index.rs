//! Nested-set interval index over catalog nodes.
//!
//! Every node carries `[left, right]` bounds such that a node `a` is an
//! ancestor of (or equal to) `b` iff `a.left <= b.left && b.right <= a.right`.
//! Roots are laid out one after another starting at 1.
//!
//! All mutating operations work on a caller-owned map. Callers run them on a
//! private copy inside a store transaction so that a half-renumbered tree is
//! never observable.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use tracing::{instrument, trace};

use super::entities::{Node, NodeId};
use super::error::{DomainError, DomainResult};

/// `true` if `ancestor` is `descendant` or one of its ancestors.
pub fn contains(ancestor: &Node, descendant: &Node) -> bool {
    ancestor.left <= descendant.left && descendant.right <= ancestor.right
}

/// Mutable view of the node table that keeps the interval bounds consistent.
pub struct TreeIndex<'a> {
    nodes: &'a mut BTreeMap<NodeId, Node>,
}

impl<'a> TreeIndex<'a> {
    pub fn new(nodes: &'a mut BTreeMap<NodeId, Node>) -> Self {
        Self { nodes }
    }

    /// Insert `node` as the last child of `parent`, or as the last root.
    ///
    /// The node's `left`/`right`/`parent` are assigned here; any values it
    /// carries are ignored.
    #[instrument(level = "debug", skip(self, node), fields(node = node.id))]
    pub fn attach(&mut self, mut node: Node, parent: Option<NodeId>) -> DomainResult<()> {
        let at = self.insertion_point(parent, &HashSet::new())?;
        self.shift(at, 2, &HashSet::new());
        node.left = at;
        node.right = at + 1;
        node.parent = parent;
        trace!(left = node.left, right = node.right, "attached");
        self.nodes.insert(node.id, node);
        Ok(())
    }

    /// Move the subtree rooted at `node` under `new_parent` (or to the top
    /// level), keeping the internal shape of the subtree.
    ///
    /// Does not check for cycles; run
    /// [`HierarchyGuard::validate_reparent`](super::HierarchyGuard::validate_reparent) first.
    #[instrument(level = "debug", skip(self))]
    pub fn move_subtree(&mut self, node: NodeId, new_parent: Option<NodeId>) -> DomainResult<()> {
        let moving = self.get(node)?.clone();
        let subtree: HashSet<NodeId> = self.subtree_ids(&moving);
        let width = moving.width();

        // close the gap left behind
        self.shift(moving.right + 1, -width, &subtree);

        let at = self.insertion_point(new_parent, &subtree)?;
        self.shift(at, width, &subtree);

        let offset = at - moving.left;
        for id in &subtree {
            if let Some(n) = self.nodes.get_mut(id) {
                n.left += offset;
                n.right += offset;
            }
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = new_parent;
        }
        trace!(offset, width, "moved subtree");
        Ok(())
    }

    /// Remove the subtree rooted at `node` and close the gap.
    ///
    /// Returns the removed nodes in nested-set order.
    #[instrument(level = "debug", skip(self))]
    pub fn detach(&mut self, node: NodeId) -> DomainResult<Vec<Node>> {
        let removing = self.get(node)?.clone();
        let subtree = self.subtree_ids(&removing);
        let mut removed: Vec<Node> = subtree
            .iter()
            .filter_map(|id| self.nodes.remove(id))
            .collect();
        removed.sort_by_key(|n| n.left);
        self.shift(removing.right + 1, -removing.width(), &HashSet::new());
        Ok(removed)
    }

    /// Recompute every interval from parent pointers.
    ///
    /// Siblings are laid out by `(sequence, id)`. Fails with
    /// `CorruptHierarchy` if parent pointers form a cycle or reference a
    /// missing node.
    #[instrument(level = "debug", skip(self))]
    pub fn rebuild(&mut self) -> DomainResult<()> {
        let mut children: BTreeMap<Option<NodeId>, Vec<(i32, NodeId)>> = BTreeMap::new();
        for n in self.nodes.values() {
            if let Some(p) = n.parent {
                if !self.nodes.contains_key(&p) {
                    return Err(DomainError::CorruptHierarchy {
                        node: n.id,
                        message: format!("parent {p} does not exist"),
                    });
                }
            }
            children.entry(n.parent).or_default().push((n.sequence, n.id));
        }
        for list in children.values_mut() {
            list.sort_unstable();
        }

        // iterative DFS; (id, entering)
        let mut counter = 0_i64;
        let mut visited = HashSet::new();
        let mut stack: Vec<(NodeId, bool)> = children
            .get(&None)
            .map(|roots| roots.iter().rev().map(|&(_, id)| (id, true)).collect())
            .unwrap_or_default();

        while let Some((id, entering)) = stack.pop() {
            counter += 1;
            if entering {
                visited.insert(id);
                if let Some(n) = self.nodes.get_mut(&id) {
                    n.left = counter;
                }
                stack.push((id, false));
                if let Some(kids) = children.get(&Some(id)) {
                    stack.extend(kids.iter().rev().map(|&(_, c)| (c, true)));
                }
            } else if let Some(n) = self.nodes.get_mut(&id) {
                n.right = counter;
            }
        }

        if visited.len() != self.nodes.len() {
            let stray = self
                .nodes
                .keys()
                .find(|id| !visited.contains(id))
                .copied()
                .unwrap_or_default();
            return Err(DomainError::CorruptHierarchy {
                node: stray,
                message: "node is not reachable from any root (parent cycle)".into(),
            });
        }
        Ok(())
    }

    fn get(&self, id: NodeId) -> DomainResult<&Node> {
        self.nodes.get(&id).ok_or(DomainError::NodeNotFound(id))
    }

    fn subtree_ids(&self, root: &Node) -> HashSet<NodeId> {
        self.nodes
            .values()
            .filter(|n| contains(root, n))
            .map(|n| n.id)
            .collect()
    }

    /// Left bound the next inserted interval receives.
    fn insertion_point(&self, parent: Option<NodeId>, skip: &HashSet<NodeId>) -> DomainResult<i64> {
        match parent {
            Some(p) => {
                let parent = self.nodes.get(&p).ok_or_else(|| DomainError::InvalidParent {
                    parent: p,
                    reason: "node does not exist".into(),
                })?;
                Ok(parent.right)
            }
            None => Ok(self
                .nodes
                .values()
                .filter(|n| !skip.contains(&n.id))
                .map(|n| n.right)
                .max()
                .unwrap_or(0)
                + 1),
        }
    }

    /// Add `delta` to every bound `>= from`, ignoring nodes in `skip`.
    fn shift(&mut self, from: i64, delta: i64, skip: &HashSet<NodeId>) {
        for n in self.nodes.values_mut().filter(|n| !skip.contains(&n.id)) {
            if n.left >= from {
                n.left += delta;
            }
            if n.right >= from {
                n.right += delta;
            }
        }
    }
}

/// Check the nested-set invariants on a node table.
///
/// Verifies `left < right`, that children are strictly inside their parent,
/// that sibling intervals are disjoint, and that bounds are unique.
pub fn verify(nodes: &BTreeMap<NodeId, Node>) -> DomainResult<()> {
    let mut seen = HashSet::new();
    for n in nodes.values() {
        if n.left >= n.right {
            return Err(corrupt(n.id, format!("left {} >= right {}", n.left, n.right)));
        }
        if !seen.insert(n.left) || !seen.insert(n.right) {
            return Err(corrupt(n.id, "bound shared with another node".into()));
        }
        if n.width() % 2 != 0 {
            return Err(corrupt(n.id, format!("odd interval width {}", n.width())));
        }
        if let Some(p) = n.parent {
            let parent = nodes
                .get(&p)
                .ok_or_else(|| corrupt(n.id, format!("parent {p} does not exist")))?;
            if !(parent.left < n.left && n.right < parent.right) {
                return Err(corrupt(n.id, format!("not contained in parent {p}")));
            }
        }
    }

    let groups = nodes.values().into_group_map_by(|n| n.parent);
    for siblings in groups.values() {
        let sorted: Vec<&&Node> = siblings.iter().sorted_by_key(|n| n.left).collect();
        for (a, b) in sorted.iter().tuple_windows() {
            if a.right >= b.left {
                return Err(corrupt(b.id, format!("overlaps sibling {}", a.id)));
            }
        }
    }

    // width must account for exactly the nodes inside
    for n in nodes.values() {
        let inside = nodes.values().filter(|m| contains(n, m)).count() as i64;
        if n.width() != 2 * inside {
            return Err(corrupt(
                n.id,
                format!("interval width {} does not match {inside} nodes", n.width()),
            ));
        }
    }
    Ok(())
}

fn corrupt(node: NodeId, message: String) -> DomainError {
    DomainError::CorruptHierarchy { node, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DisplayMode, NodeKind};
    use chrono::Utc;

    fn node(id: NodeId) -> Node {
        Node {
            id,
            name: format!("n{id}"),
            slug: format!("n{id}"),
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

    fn bounds(nodes: &BTreeMap<NodeId, Node>, id: NodeId) -> (i64, i64) {
        let n = &nodes[&id];
        (n.left, n.right)
    }

    #[test]
    fn given_empty_table_when_attaching_roots_then_lays_them_out_in_order() {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1), None).unwrap();
        index.attach(node(2), None).unwrap();

        assert_eq!(bounds(&nodes, 1), (1, 2));
        assert_eq!(bounds(&nodes, 2), (3, 4));
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_root_when_attaching_children_then_parent_interval_grows() {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1), None).unwrap();
        index.attach(node(2), None).unwrap();
        index.attach(node(3), Some(1)).unwrap();
        index.attach(node(4), Some(1)).unwrap();

        assert_eq!(bounds(&nodes, 1), (1, 6));
        assert_eq!(bounds(&nodes, 3), (2, 3));
        assert_eq!(bounds(&nodes, 4), (4, 5));
        assert_eq!(bounds(&nodes, 2), (7, 8));
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_missing_parent_when_attaching_then_invalid_parent() {
        let mut nodes = BTreeMap::new();
        let err = TreeIndex::new(&mut nodes).attach(node(1), Some(9)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidParent { parent: 9, .. }));
        assert!(nodes.is_empty());
    }

    #[test]
    fn given_subtree_when_moving_under_other_root_then_shape_is_preserved() {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1), None).unwrap();
        index.attach(node(2), Some(1)).unwrap();
        index.attach(node(3), Some(2)).unwrap();
        index.attach(node(4), None).unwrap();

        index.move_subtree(2, Some(4)).unwrap();

        assert_eq!(bounds(&nodes, 1), (1, 2));
        assert_eq!(bounds(&nodes, 4), (3, 8));
        assert_eq!(bounds(&nodes, 2), (4, 7));
        assert_eq!(bounds(&nodes, 3), (5, 6));
        assert_eq!(nodes[&2].parent, Some(4));
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_nested_node_when_moving_to_top_level_then_becomes_last_root() {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1), None).unwrap();
        index.attach(node(2), Some(1)).unwrap();
        index.attach(node(3), None).unwrap();

        index.move_subtree(2, None).unwrap();

        assert_eq!(bounds(&nodes, 1), (1, 2));
        assert_eq!(bounds(&nodes, 3), (3, 4));
        assert_eq!(bounds(&nodes, 2), (5, 6));
        assert_eq!(nodes[&2].parent, None);
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_node_when_moving_to_earlier_sibling_then_intervals_stay_consistent() {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1), None).unwrap();
        index.attach(node(2), Some(1)).unwrap();
        index.attach(node(3), Some(1)).unwrap();
        index.attach(node(4), Some(3)).unwrap();

        index.move_subtree(3, Some(2)).unwrap();

        assert_eq!(bounds(&nodes, 1), (1, 8));
        assert_eq!(bounds(&nodes, 2), (2, 7));
        assert_eq!(bounds(&nodes, 3), (3, 6));
        assert_eq!(bounds(&nodes, 4), (4, 5));
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_subtree_when_detaching_then_gap_is_closed() {
        let mut nodes = BTreeMap::new();
        let mut index = TreeIndex::new(&mut nodes);
        index.attach(node(1), None).unwrap();
        index.attach(node(2), Some(1)).unwrap();
        index.attach(node(3), Some(2)).unwrap();
        index.attach(node(4), Some(1)).unwrap();

        let removed = index.detach(2).unwrap();

        assert_eq!(removed.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(bounds(&nodes, 1), (1, 4));
        assert_eq!(bounds(&nodes, 4), (2, 3));
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_scrambled_bounds_when_rebuilding_then_orders_siblings_by_sequence() {
        let mut nodes = BTreeMap::new();
        for (id, parent, seq) in [(1, None, 0), (2, Some(1), 20), (3, Some(1), 10)] {
            let mut n = node(id);
            n.parent = parent;
            n.sequence = seq;
            nodes.insert(id, n);
        }

        TreeIndex::new(&mut nodes).rebuild().unwrap();

        assert_eq!(bounds(&nodes, 1), (1, 6));
        assert_eq!(bounds(&nodes, 3), (2, 3));
        assert_eq!(bounds(&nodes, 2), (4, 5));
        verify(&nodes).unwrap();
    }

    #[test]
    fn given_parent_cycle_when_rebuilding_then_corrupt_hierarchy() {
        let mut nodes = BTreeMap::new();
        let mut a = node(1);
        a.parent = Some(2);
        let mut b = node(2);
        b.parent = Some(1);
        nodes.insert(1, a);
        nodes.insert(2, b);

        let err = TreeIndex::new(&mut nodes).rebuild().unwrap_err();
        assert!(matches!(err, DomainError::CorruptHierarchy { .. }));
    }

    #[test]
    fn given_overlapping_siblings_when_verifying_then_reports_corruption() {
        let mut nodes = BTreeMap::new();
        let mut a = node(1);
        a.left = 1;
        a.right = 4;
        let mut b = node(2);
        b.left = 2;
        b.right = 3;
        nodes.insert(1, a);
        nodes.insert(2, b);

        assert!(matches!(
            verify(&nodes),
            Err(DomainError::CorruptHierarchy { .. })
        ));
    }
}
