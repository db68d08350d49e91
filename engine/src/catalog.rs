//! Minimal product surface.
//!
//! Just enough catalog to stand up checkout end to end. Stock changes
//! do not happen here; only the ledger moves stock once a product
//! exists.

use crate::store::{Store, UnitOfWork};
use chrono::Utc;
use rust_decimal::Decimal;
use storefront_core::{Error, Product, ProductId, Result, totals};
use tracing::info;

/// Product creation and lookup.
#[derive(Debug, Clone)]
pub struct CatalogService<S> {
    store: S,
}

impl<S: Store> CatalogService<S> {
    /// Create the service over a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Register a product with its opening stock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a non-positive price or a
    /// negative stock count, or [`Error::Store`] on storage failure.
    pub async fn create_product(
        &self,
        name: String,
        description: Option<String>,
        price: Decimal,
        stock: i32,
    ) -> Result<Product> {
        totals::validate_unit_price(price)?;
        if name.trim().is_empty() {
            return Err(Error::validation("product name must not be empty"));
        }
        if stock < 0 {
            return Err(Error::validation(format!(
                "opening stock must not be negative, got {stock}"
            )));
        }

        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            name,
            description,
            price,
            stock,
            created_at: now,
            updated_at: now,
        };

        let mut uow = self.store.begin().await?;
        uow.insert_product(&product).await?;
        uow.commit().await?;

        info!(product_id = %product.id, stock, "product created");
        Ok(product)
    }

    /// Fetch a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the product does not exist.
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product> {
        let mut uow = self.store.begin().await?;
        uow.product(product_id)
            .await?
            .ok_or_else(|| Error::not_found("product", product_id))
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] on storage failure.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let mut uow = self.store.begin().await?;
        uow.products().await
    }

    /// Delete a product that nothing references.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the product does not exist, or
    /// [`Error::Validation`] while cart or order lines still point at it.
    pub async fn delete_product(&self, product_id: ProductId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        if uow.product(product_id).await?.is_none() {
            return Err(Error::not_found("product", product_id));
        }
        if uow.product_is_referenced(product_id).await? {
            return Err(Error::validation(format!(
                "product {product_id} is referenced by cart or order lines"
            )));
        }

        uow.delete_product(product_id).await?;
        uow.commit().await?;

        info!(%product_id, "product deleted");
        Ok(())
    }
}
