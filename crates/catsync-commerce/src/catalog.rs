//! [`IProductCatalog`] implementation over the admin products API
//!
//! A product is found through its variant SKU, then loaded with its variants,
//! images, categories, collection and tags. Patches are written as at most two
//! requests: one for product fields and one for the default variant.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use catsync_core::domain::{
    CatalogProduct, CatalogVariant, Dimensions, FieldUpdate, Patch, ProductCodes, VariantChanges,
};
use catsync_core::ports::IProductCatalog;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::client::CommerceClient;
use crate::CommerceError;

const PRODUCT_FIELDS: &str =
    "id,handle,title,subtitle,description,thumbnail,metadata,*images,*categories,*collection,*tags,*variants,*variants.prices";

/// Metadata key holding the source URLs of the last image sync
const IMAGE_SOURCES_KEY: &str = "image_sources";

// ============================================================================
// Admin API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct VariantList {
    #[serde(default)]
    variants: Vec<VariantRef>,
}

#[derive(Debug, Deserialize)]
struct VariantRef {
    sku: Option<String>,
    product_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    product: ApiProduct,
}

#[derive(Debug, Deserialize)]
struct ApiProduct {
    id: String,
    handle: Option<String>,
    title: Option<String>,
    subtitle: Option<String>,
    description: Option<String>,
    thumbnail: Option<String>,
    #[serde(default)]
    images: Vec<ApiImage>,
    metadata: Option<Value>,
    #[serde(default)]
    categories: Vec<ApiCategory>,
    collection: Option<ApiCollection>,
    #[serde(default)]
    tags: Vec<ApiTag>,
    #[serde(default)]
    variants: Vec<ApiVariant>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCollection {
    id: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiTag {
    id: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiVariant {
    id: String,
    sku: Option<String>,
    #[serde(default)]
    prices: Vec<ApiPrice>,
    height: Option<f64>,
    width: Option<f64>,
    length: Option<f64>,
    weight: Option<f64>,
    hs_code: Option<String>,
    mid_code: Option<String>,
    origin_country: Option<String>,
    ean: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiPrice {
    amount: f64,
    currency_code: String,
}

#[derive(Debug, Deserialize)]
struct CategoryList {
    #[serde(default)]
    product_categories: Vec<ApiCategory>,
}

#[derive(Debug, Deserialize)]
struct CollectionList {
    #[serde(default)]
    collections: Vec<ApiCollection>,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    product_tags: Vec<ApiTag>,
}

#[derive(Debug, Deserialize)]
struct TagEnvelope {
    product_tag: ApiTag,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ApiVariant {
    fn into_domain(self, currency_code: &str) -> CatalogVariant {
        let price = self
            .prices
            .iter()
            .find(|p| p.currency_code.eq_ignore_ascii_case(currency_code))
            .map(|p| p.amount.round() as i64);
        CatalogVariant {
            id: self.id,
            sku: self.sku,
            price,
            dimensions: Dimensions {
                height_mm: self.height,
                width_mm: self.width,
                length_mm: self.length,
            },
            weight_g: self.weight,
            codes: ProductCodes {
                hs_code: non_empty(self.hs_code),
                mid_code: non_empty(self.mid_code),
                origin_country: non_empty(self.origin_country),
            },
            ean: non_empty(self.ean),
        }
    }
}

impl ApiProduct {
    fn into_domain(self, sku: &str, currency_code: &str) -> CatalogProduct {
        let image_sources = self
            .metadata
            .as_ref()
            .and_then(|m| m.get(IMAGE_SOURCES_KEY))
            .and_then(Value::as_array)
            .map(|sources| {
                sources
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut variants = self.variants;
        let index = variants
            .iter()
            .position(|v| v.sku.as_deref() == Some(sku))
            .unwrap_or(0);
        let variant = (index < variants.len())
            .then(|| variants.swap_remove(index).into_domain(currency_code));

        CatalogProduct {
            id: self.id,
            handle: self.handle.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            subtitle: non_empty(self.subtitle),
            description: non_empty(self.description),
            thumbnail: non_empty(self.thumbnail),
            images: self.images.into_iter().map(|i| i.url).collect(),
            image_sources,
            category: self.categories.into_iter().next().map(|c| c.name),
            collection: self.collection.map(|c| c.title),
            tags: self.tags.into_iter().map(|t| t.value).collect(),
            variant,
        }
    }
}

// ============================================================================
// Request bodies
// ============================================================================

/// Serializes a clearable text field: a value, or `null` to remove it
fn clearable(update: &FieldUpdate<String>) -> Value {
    match update {
        FieldUpdate::Set(value) => json!(value),
        FieldUpdate::Clear => Value::Null,
    }
}

fn variant_body(changes: &VariantChanges, currency_code: &str) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(price) = changes.price {
        body.insert(
            "prices".into(),
            json!([{ "amount": price, "currency_code": currency_code }]),
        );
    }
    for (field, value) in [
        ("height", changes.height_mm),
        ("width", changes.width_mm),
        ("length", changes.length_mm),
        ("weight", changes.weight_g),
    ] {
        if let Some(value) = value {
            body.insert(field.into(), json!(value));
        }
    }
    if let Some(hs_code) = &changes.hs_code {
        body.insert("hs_code".into(), json!(hs_code));
    }
    if let Some(origin) = &changes.origin_country {
        body.insert("origin_country".into(), json!(origin.to_lowercase()));
    }
    if let Some(mid_code) = &changes.mid_code {
        body.insert("mid_code".into(), clearable(mid_code));
    }
    if let Some(ean) = &changes.ean {
        body.insert("ean".into(), clearable(ean));
    }
    body
}

// ============================================================================
// CommerceCatalog
// ============================================================================

/// Product catalog backed by the admin API
pub struct CommerceCatalog {
    client: CommerceClient,
    currency_code: String,
    /// `kind:name` to id, for categories, collections and tags
    references: Mutex<HashMap<String, String>>,
}

impl CommerceCatalog {
    pub fn new(client: CommerceClient, currency_code: impl Into<String>) -> Self {
        Self {
            client,
            currency_code: currency_code.into().to_lowercase(),
            references: Mutex::new(HashMap::new()),
        }
    }

    fn cached_reference(&self, kind: &str, name: &str) -> Option<String> {
        self.references
            .lock()
            .ok()
            .and_then(|refs| refs.get(&format!("{kind}:{}", name.to_lowercase())).cloned())
    }

    fn remember_reference(&self, kind: &str, name: &str, id: &str) {
        if let Ok(mut refs) = self.references.lock() {
            refs.insert(format!("{kind}:{}", name.to_lowercase()), id.to_string());
        }
    }

    async fn category_id(&self, name: &str) -> Result<String, CommerceError> {
        if let Some(id) = self.cached_reference("category", name) {
            return Ok(id);
        }
        let list: CategoryList = self
            .client
            .get("/admin/product-categories", &[("q", name), ("limit", "50")])
            .await?;
        let category = list
            .product_categories
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CommerceError::UnknownReference {
                kind: "category",
                name: name.to_string(),
            })?;
        self.remember_reference("category", name, &category.id);
        Ok(category.id)
    }

    async fn collection_id(&self, title: &str) -> Result<String, CommerceError> {
        if let Some(id) = self.cached_reference("collection", title) {
            return Ok(id);
        }
        let list: CollectionList = self
            .client
            .get("/admin/collections", &[("q", title), ("limit", "50")])
            .await?;
        let collection = list
            .collections
            .into_iter()
            .find(|c| c.title.eq_ignore_ascii_case(title))
            .ok_or_else(|| CommerceError::UnknownReference {
                kind: "collection",
                name: title.to_string(),
            })?;
        self.remember_reference("collection", title, &collection.id);
        Ok(collection.id)
    }

    /// Finds a tag by value, creating it when it does not exist yet
    async fn tag_id(&self, value: &str) -> Result<String, CommerceError> {
        if let Some(id) = self.cached_reference("tag", value) {
            return Ok(id);
        }
        let list: TagList = self
            .client
            .get("/admin/product-tags", &[("value", value)])
            .await?;
        let id = match list.product_tags.into_iter().find(|t| t.value == value) {
            Some(tag) => tag.id,
            None => {
                debug!(tag = value, "Creating product tag");
                let created: TagEnvelope = self
                    .client
                    .post("/admin/product-tags", &json!({ "value": value }))
                    .await?;
                created.product_tag.id
            }
        };
        self.remember_reference("tag", value, &id);
        Ok(id)
    }

    async fn product_body(&self, patch: &Patch) -> Result<Map<String, Value>, CommerceError> {
        let changes = &patch.product;
        let mut body = Map::new();

        for (field, value) in [
            ("title", &changes.title),
            ("subtitle", &changes.subtitle),
            ("description", &changes.description),
            ("handle", &changes.handle),
        ] {
            if let Some(value) = value {
                body.insert(field.into(), json!(value));
            }
        }

        if !patch.keep_existing_images {
            if let Some(thumbnail) = &changes.thumbnail {
                body.insert("thumbnail".into(), json!(thumbnail));
            }
            if let Some(images) = &changes.images {
                let images: Vec<Value> = images.iter().map(|url| json!({ "url": url })).collect();
                body.insert("images".into(), Value::Array(images));
            }
            if let Some(sources) = &changes.image_sources {
                body.insert("metadata".into(), json!({ IMAGE_SOURCES_KEY: sources }));
            }
        }

        match &patch.category {
            Some(FieldUpdate::Set(name)) => {
                if let Some(id) = skip_unknown(self.category_id(name).await)? {
                    body.insert("categories".into(), json!([{ "id": id }]));
                }
            }
            Some(FieldUpdate::Clear) => {
                body.insert("categories".into(), json!([]));
            }
            None => {}
        }

        match &patch.collection {
            Some(FieldUpdate::Set(title)) => {
                if let Some(id) = skip_unknown(self.collection_id(title).await)? {
                    body.insert("collection_id".into(), json!(id));
                }
            }
            Some(FieldUpdate::Clear) => {
                body.insert("collection_id".into(), Value::Null);
            }
            None => {}
        }

        match &patch.tags {
            Some(FieldUpdate::Set(values)) => {
                let mut tags = Vec::with_capacity(values.len());
                for value in values {
                    tags.push(json!({ "id": self.tag_id(value).await? }));
                }
                body.insert("tags".into(), Value::Array(tags));
            }
            Some(FieldUpdate::Clear) => {
                body.insert("tags".into(), json!([]));
            }
            None => {}
        }

        Ok(body)
    }
}

/// Turns an unresolved category or collection into a skipped assignment
///
/// The rest of the patch is still applied; any other error propagates.
fn skip_unknown(resolved: Result<String, CommerceError>) -> Result<Option<String>, CommerceError> {
    match resolved {
        Ok(id) => Ok(Some(id)),
        Err(CommerceError::UnknownReference { kind, name }) => {
            warn!(kind, name = %name, "Unknown reference, leaving assignment unchanged");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[async_trait::async_trait]
impl IProductCatalog for CommerceCatalog {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<CatalogProduct>> {
        let variants: VariantList = self
            .client
            .get(
                "/admin/product-variants",
                &[("sku", sku), ("fields", "id,sku,product_id")],
            )
            .await
            .with_context(|| format!("Failed to look up variant {sku}"))?;

        let Some(product_id) = variants
            .variants
            .into_iter()
            .find(|v| v.sku.as_deref() == Some(sku))
            .and_then(|v| v.product_id)
        else {
            return Ok(None);
        };

        let envelope: ProductEnvelope = self
            .client
            .get(
                &format!("/admin/products/{product_id}"),
                &[("fields", PRODUCT_FIELDS)],
            )
            .await
            .with_context(|| format!("Failed to load product {product_id}"))?;

        Ok(Some(envelope.product.into_domain(sku, &self.currency_code)))
    }

    async fn apply_patch(&self, product_id: &str, patch: &Patch) -> Result<()> {
        let body = self
            .product_body(patch)
            .await
            .with_context(|| format!("Failed to prepare update of product {product_id}"))?;
        if !body.is_empty() {
            let _: Value = self
                .client
                .post(&format!("/admin/products/{product_id}"), &body)
                .await
                .with_context(|| format!("Failed to update product {product_id}"))?;
        }

        if let Some(variant) = &patch.variant {
            let body = variant_body(variant, &self.currency_code);
            let _: Value = self
                .client
                .post(
                    &format!("/admin/products/{product_id}/variants/{}", variant.variant_id),
                    &body,
                )
                .await
                .with_context(|| format!("Failed to update variant {}", variant.variant_id))?;
        }

        info!(
            product_id,
            product_fields = body.len(),
            variant = patch.variant.is_some(),
            "Applied catalog patch"
        );
        Ok(())
    }
}
