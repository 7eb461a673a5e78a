//! Nested-set catalog hierarchy
//!
//! Nodes carry `left`/`right` interval bounds so that "everything under this
//! node" is a single range comparison. Structural writes validate first and
//! renumber second, inside one store transaction.
//!
//! Layers, leaves first: [`domain`] (entities and tree algorithms),
//! [`application`] (services over a [`CatalogStore`](infrastructure::traits::CatalogStore)),
//! [`infrastructure`] (stores and service wiring) and [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
