//! Product catalog port (driven/secondary port)

use crate::domain::{CatalogProduct, Patch};

/// Port trait for product reads and writes on the commerce backend
#[async_trait::async_trait]
pub trait IProductCatalog: Send + Sync {
    /// Finds the product whose variant carries `sku`
    async fn find_by_sku(&self, sku: &str) -> anyhow::Result<Option<CatalogProduct>>;

    /// Applies a patch to the product with id `product_id`
    ///
    /// Relational directives carry names (category name, collection title,
    /// tag values); the adapter resolves them to backend ids.
    async fn apply_patch(&self, product_id: &str, patch: &Patch) -> anyhow::Result<()>;
}
