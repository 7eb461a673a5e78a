//! Storage adapters for the catalog tables.

mod file;
mod memory;
pub mod query;

pub use file::FileStore;
pub use memory::MemoryStore;
