//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;
use termtree::Tree;

use crate::domain::Node;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// One-line summary of a node: name, id and interval.
pub fn node_label(node: &Node) -> String {
    let mut label = format!(
        "{} {} {}",
        node.name,
        format!("#{}", node.id).dimmed(),
        format!("[{}, {}]", node.left, node.right).dimmed()
    );
    if !node.active {
        label.push_str(&format!(" {}", "(inactive)".yellow()));
    }
    label
}

/// Arrange nodes (in nested-set order) into display trees, one per root.
///
/// Nesting is read off the intervals: a node closes every open node whose
/// `right` lies before its own `left`.
pub fn forest(nodes: &[Node]) -> Vec<Tree<String>> {
    let mut roots = Vec::new();
    let mut open: Vec<(i64, Tree<String>)> = Vec::new();

    for node in nodes {
        while open.last().is_some_and(|(right, _)| node.left > *right) {
            if let Some((_, done)) = open.pop() {
                close(&mut open, &mut roots, done);
            }
        }
        open.push((node.right, Tree::new(node_label(node))));
    }
    while let Some((_, done)) = open.pop() {
        close(&mut open, &mut roots, done);
    }
    roots
}

fn close(open: &mut [(i64, Tree<String>)], roots: &mut Vec<Tree<String>>, done: Tree<String>) {
    match open.last_mut() {
        Some((_, parent)) => {
            parent.push(done);
        }
        None => roots.push(done),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayMode, NodeKind};
    use chrono::Utc;

    fn node(id: u64, left: i64, right: i64) -> Node {
        Node {
            id,
            name: format!("n{id}"),
            slug: format!("n{id}"),
            parent: None,
            left,
            right,
            sequence: 0,
            display_mode: DisplayMode::Variant,
            products_per_page: 10,
            active: true,
            kind: NodeKind::Catalog,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn given_nested_intervals_when_building_forest_then_nests_by_containment() {
        colored::control::set_override(false);
        // n1 [1,6] { n2 [2,5] { n3 [3,4] } }, n4 [7,8]
        let nodes = vec![node(1, 1, 6), node(2, 2, 5), node(3, 3, 4), node(4, 7, 8)];

        let trees = forest(&nodes);

        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].leaves.len(), 1);
        assert_eq!(trees[0].leaves[0].leaves.len(), 1);
        assert!(trees[1].leaves.is_empty());
        assert!(trees[0].to_string().contains("n3 #3 [3, 4]"));
    }
}
