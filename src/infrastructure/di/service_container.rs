//! Service container for dependency injection
//!
//! Wires up all services with their dependencies. Built once at startup and
//! passed by reference; nothing looks services up through globals.

use std::sync::Arc;

use crate::application::services::{
    AssociationService, BreadcrumbService, HierarchyService, ListingService, ProductService,
    SitemapService, WebsiteService,
};
use crate::config::Settings;
use crate::infrastructure::store::{FileStore, MemoryStore};
use crate::infrastructure::traits::{CatalogStore, FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Storage collaborator
    pub store: Arc<dyn CatalogStore>,

    pub hierarchy: HierarchyService,
    pub associations: AssociationService,
    pub products: ProductService,
    pub listings: ListingService,
    pub breadcrumbs: BreadcrumbService,
    pub sitemap: SitemapService,
    pub websites: WebsiteService,
}

impl ServiceContainer {
    /// Create a container backed by the catalog file under `settings.base_dir`.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(FileStore::new(settings.store_path(), fs));
        Self::with_store(settings, store)
    }

    /// Create a container over a fresh in-memory store.
    pub fn in_memory(settings: Settings) -> Self {
        Self::with_store(settings, Arc::new(MemoryStore::new()))
    }

    /// Create a service container with a custom store (for testing).
    pub fn with_store(settings: Settings, store: Arc<dyn CatalogStore>) -> Self {
        let settings = Arc::new(settings);

        let hierarchy = HierarchyService::new(Arc::clone(&store), Arc::clone(&settings));
        let associations = AssociationService::new(Arc::clone(&store));
        let products = ProductService::new(Arc::clone(&store));
        let listings = ListingService::new(Arc::clone(&store));
        let breadcrumbs = BreadcrumbService::new(Arc::clone(&store), Arc::clone(&settings));
        let sitemap = SitemapService::new(Arc::clone(&store), Arc::clone(&settings));
        let websites = WebsiteService::new(Arc::clone(&store), listings.clone());

        Self {
            settings,
            store,
            hierarchy,
            associations,
            products,
            listings,
            breadcrumbs,
            sitemap,
            websites,
        }
    }
}
