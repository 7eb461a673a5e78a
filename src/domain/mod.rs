//! Domain layer: entities and tree algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod query;
pub mod slug;
pub mod state;
pub mod tree_index;

pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use hierarchy::{ancestry, full_name, HierarchyGuard, NAME_SEPARATOR};
pub use query::{Clause, Field, ListingItem, ListingRow, Op, ProductQuery, Value, Window};
pub use slug::{node_slug, slugify};
pub use state::{CatalogState, IdSequences};
pub use tree_index::{contains, verify, TreeIndex};
