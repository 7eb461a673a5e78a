//! Product and template registration
//!
//! Products live in an external system; this service keeps the local rows
//! the listing query joins against (identity plus visibility flags).

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{DomainError, Product, ProductId, Template, TemplateId};
use crate::infrastructure::traits::{CatalogStore, CatalogStoreExt};

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn CatalogStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_template(&self, name: &str, active: bool) -> ApplicationResult<Template> {
        let name = required("name", name)?;
        self.store.write(|state| {
            let id = state.next_template_id();
            let template = Template {
                id,
                name: name.clone(),
                active,
            };
            state.templates.insert(id, template.clone());
            Ok(template)
        })
    }

    /// Register a variant of `template`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_variant(
        &self,
        template: TemplateId,
        code: &str,
        displayed: bool,
    ) -> ApplicationResult<Product> {
        let code = required("code", code)?;
        self.store.write(|state| {
            state.template(template)?;
            let id = state.next_product_id();
            let product = Product {
                id,
                template,
                code: code.clone(),
                displayed,
            };
            state.products.insert(id, product.clone());
            debug!(product = id, template, "registered variant");
            Ok(product)
        })
    }

    pub fn set_displayed(&self, product: ProductId, displayed: bool) -> ApplicationResult<Product> {
        self.store.write(|state| {
            let p = state
                .products
                .get_mut(&product)
                .ok_or(DomainError::ProductNotFound(product))?;
            p.displayed = displayed;
            Ok(p.clone())
        })
    }

    pub fn set_template_active(
        &self,
        template: TemplateId,
        active: bool,
    ) -> ApplicationResult<Template> {
        self.store.write(|state| {
            let t = state
                .templates
                .get_mut(&template)
                .ok_or(DomainError::TemplateNotFound(template))?;
            t.active = active;
            Ok(t.clone())
        })
    }

    /// Remove a variant and every link pointing at it.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_product(&self, product: ProductId) -> ApplicationResult<()> {
        self.store.write(|state| {
            state
                .products
                .remove(&product)
                .ok_or(DomainError::ProductNotFound(product))?;
            state.cascade_removed_products();
            Ok(())
        })
    }

    /// Remove a template with all of its variants and their links.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_template(&self, template: TemplateId) -> ApplicationResult<()> {
        self.store.write(|state| {
            state
                .templates
                .remove(&template)
                .ok_or(DomainError::TemplateNotFound(template))?;
            state.products.retain(|_, p| p.template != template);
            state.cascade_removed_products();
            Ok(())
        })
    }

    pub fn product(&self, id: ProductId) -> ApplicationResult<Product> {
        self.store.read(|state| Ok(state.product(id)?.clone()))
    }

    pub fn template(&self, id: TemplateId) -> ApplicationResult<Template> {
        self.store.read(|state| Ok(state.template(id)?.clone()))
    }

    /// Variants of `template` in id order.
    pub fn variants(&self, template: TemplateId) -> ApplicationResult<Vec<Product>> {
        self.store.read(|state| {
            state.template(template)?;
            Ok(state
                .products
                .values()
                .filter(|p| p.template == template)
                .cloned()
                .collect())
        })
    }
}

fn required(field: &'static str, value: &str) -> ApplicationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::InvalidField {
            field,
            message: "must not be empty".into(),
        }
        .into());
    }
    Ok(value.to_string())
}
