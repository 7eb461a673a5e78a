//! Evaluation of [`ProductQuery`] against a state snapshot.
//!
//! Joins every link with its node, product and template, keeps the rows
//! matching all clauses, then projects them to the query's display mode.

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::{
    CatalogState, Clause, DisplayMode, DomainResult, Field, ListingItem, ListingRow, Node, Op,
    Product, ProductLink, ProductQuery, Template, Value, Window,
};

struct JoinedRow<'a> {
    node: &'a Node,
    link: &'a ProductLink,
    product: &'a Product,
    template: &'a Template,
}

impl JoinedRow<'_> {
    fn column(&self, field: Field) -> Value {
        match field {
            Field::NodeId => self.node.id.into(),
            Field::NodeLeft => self.node.left.into(),
            Field::NodeRight => self.node.right.into(),
            Field::NodeActive => self.node.active.into(),
            Field::LinkSequence => self.link.sequence.into(),
            Field::ProductId => self.product.id.into(),
            Field::ProductDisplayed => self.product.displayed.into(),
            Field::TemplateId => self.template.id.into(),
            Field::TemplateActive => self.template.active.into(),
        }
    }
}

fn joined_rows(state: &CatalogState) -> impl Iterator<Item = JoinedRow<'_>> {
    state.links.values().filter_map(move |link| {
        let node = state.nodes.get(&link.node)?;
        let product = state.products.get(&link.product)?;
        let template = state.templates.get(&product.template)?;
        Some(JoinedRow {
            node,
            link,
            product,
            template,
        })
    })
}

/// Interval clauses of the scope node as it is in `state`.
fn scope_clauses(state: &CatalogState, query: &ProductQuery) -> DomainResult<Vec<Clause>> {
    let Some(id) = query.scope else {
        return Ok(Vec::new());
    };
    let node = state.node(id)?;
    Ok(vec![
        Clause::new(Field::NodeLeft, Op::Ge, node.left),
        Clause::new(Field::NodeRight, Op::Le, node.right),
    ])
}

/// Ordered, projected rows of `query`; `window` slices the ordered result.
///
/// Fails with `NodeNotFound` when the scope node is gone.
pub fn execute(
    state: &CatalogState,
    query: &ProductQuery,
    window: Option<Window>,
) -> DomainResult<Vec<ListingRow>> {
    let scope = scope_clauses(state, query)?;
    // smallest link sequence per projected item
    let mut best: BTreeMap<ListingItem, i32> = BTreeMap::new();
    for row in joined_rows(state) {
        let keep = scope
            .iter()
            .chain(&query.clauses)
            .all(|c| c.matches(row.column(c.field)));
        if !keep {
            continue;
        }
        let item = match query.mode {
            DisplayMode::Variant => ListingItem::Variant(row.product.id),
            DisplayMode::Template => ListingItem::Template(row.template.id),
        };
        best.entry(item)
            .and_modify(|s| *s = (*s).min(row.link.sequence))
            .or_insert(row.link.sequence);
    }

    let mut rows: Vec<ListingRow> = best
        .into_iter()
        .map(|(item, sequence)| ListingRow { item, sequence })
        .collect();
    rows.sort_by_key(|r| (r.sequence, r.item.id()));
    trace!(mode = %query.mode, rows = rows.len(), "query evaluated");

    Ok(match window {
        Some(w) => rows.into_iter().skip(w.offset).take(w.limit).collect(),
        None => rows,
    })
}
