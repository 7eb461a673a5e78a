//! Product query model: a conjunction of `(field, op, value)` clauses over the
//! node → link → product → template join, plus the display-mode projection.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::entities::{DisplayMode, NodeId, ProductId, TemplateId};

/// Columns of the joined row a clause can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    NodeId,
    NodeLeft,
    NodeRight,
    NodeActive,
    LinkSequence,
    ProductId,
    ProductDisplayed,
    TemplateId,
    TemplateActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clause {
    pub field: Field,
    pub op: Op,
    pub value: Value,
}

impl Clause {
    pub fn new(field: Field, op: Op, value: impl Into<Value>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// Evaluate against a column value. Mismatched value types never match.
    pub fn matches(&self, actual: Value) -> bool {
        match (actual, self.value) {
            (Value::Int(_), Value::Int(_)) | (Value::Bool(_), Value::Bool(_)) => {
                let ord = actual.cmp(&self.value);
                match self.op {
                    Op::Eq => ord.is_eq(),
                    Op::Ne => ord.is_ne(),
                    Op::Lt => ord.is_lt(),
                    Op::Le => ord.is_le(),
                    Op::Gt => ord.is_gt(),
                    Op::Ge => ord.is_ge(),
                }
            }
            _ => false,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        };
        let value = match self.value {
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
        };
        write!(f, "{:?} {op} {value}", self.field)
    }
}

/// A filtered product query in one display mode.
///
/// Rows are ordered by `(sequence, id)` where `sequence` is the smallest link
/// sequence of the row (per product in variant mode, per template in template
/// mode).
///
/// `scope` names a node whose subtree bounds the linked nodes. The bounds are
/// read from the state the query runs against, never stored in the query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    pub clauses: Vec<Clause>,
    pub mode: DisplayMode,
    pub scope: Option<NodeId>,
}

impl ProductQuery {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            clauses: Vec::new(),
            mode,
            scope: None,
        }
    }

    /// Restrict to links on `node` and its descendants.
    pub fn within(mut self, node: NodeId) -> Self {
        self.scope = Some(node);
        self
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn filters(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.clauses.extend(clauses);
        self
    }
}

/// What a listing row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListingItem {
    Variant(ProductId),
    Template(TemplateId),
}

impl ListingItem {
    pub fn id(&self) -> u64 {
        match self {
            ListingItem::Variant(id) | ListingItem::Template(id) => *id,
        }
    }
}

impl fmt::Display for ListingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingItem::Variant(id) => write!(f, "variant {id}"),
            ListingItem::Template(id) => write!(f, "template {id}"),
        }
    }
}

/// One row of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingRow {
    pub item: ListingItem,
    pub sequence: i32,
}

/// Offset/limit slice of an ordered result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Op::Ge, 5, 5, true)]
    #[case(Op::Ge, 4, 5, false)]
    #[case(Op::Le, 4, 5, true)]
    #[case(Op::Lt, 5, 5, false)]
    #[case(Op::Gt, 6, 5, true)]
    #[case(Op::Ne, 6, 5, true)]
    #[case(Op::Eq, 5, 5, true)]
    fn given_int_clause_when_matching_then_compares_actual_to_value(
        #[case] op: Op,
        #[case] actual: i64,
        #[case] expected: i64,
        #[case] result: bool,
    ) {
        let clause = Clause::new(Field::NodeLeft, op, expected);
        assert_eq!(clause.matches(Value::Int(actual)), result);
    }

    #[test]
    fn given_bool_clause_when_matching_int_then_never_matches() {
        let clause = Clause::new(Field::ProductDisplayed, Op::Eq, true);
        assert!(clause.matches(Value::Bool(true)));
        assert!(!clause.matches(Value::Int(1)));
    }
}
