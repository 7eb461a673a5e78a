//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the `CatalogStore` boundary trait but are themselves
//! concrete structs, not traits.

mod association;
mod breadcrumb;
mod hierarchy;
pub mod listing;
mod product;
mod sitemap;
mod website;

pub use association::{AssociationService, DEFAULT_SEQUENCE};
pub use breadcrumb::{BreadcrumbService, Crumb};
pub use hierarchy::HierarchyService;
pub use listing::{subtree_query, ListingRequest, ListingService};
pub use product::ProductService;
pub use sitemap::{SitemapEntry, SitemapIndex, SitemapService};
pub use website::WebsiteService;
