//! Object storage port (driven/secondary port)

/// Maximum number of keys accepted by one `delete_many` call
pub const DELETE_BATCH_LIMIT: usize = 1000;

/// Port trait for the object storage holding product images
#[async_trait::async_trait]
pub trait IObjectStore: Send + Sync {
    /// Stores `bytes` under `key`, overwriting any existing object
    ///
    /// # Returns
    /// The public URL of the stored object
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<String>;

    /// Lists every key under `prefix`, following pagination
    async fn list(&self, prefix: &str) -> anyhow::Result<Vec<String>>;

    /// Deletes up to [`DELETE_BATCH_LIMIT`] keys in one request
    ///
    /// # Returns
    /// The number of keys the store reported as deleted
    async fn delete_many(&self, keys: &[String]) -> anyhow::Result<usize>;
}
