//! Patch - the minimal diff to apply to an existing catalog record
//!
//! A `Patch` is computed by the change detector and consumed by the
//! `IProductCatalog` adapter within a single row's processing. Every field is
//! optional: `None` means "leave as is". Optional fields use [`FieldUpdate`]
//! so an explicit clear is distinguishable from no change.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// An explicit write to a field that may be cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate<T> {
    /// Replace the current value
    Set(T),
    /// Remove the current value
    Clear,
}

/// Fields that are warned about but never cleared when the sheet is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryField {
    Subtitle,
    Description,
    Price,
    Height,
    Width,
    Length,
    Weight,
    HsCode,
    OriginCountry,
}

impl Display for MandatoryField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subtitle => "subtitle",
            Self::Description => "description",
            Self::Price => "price",
            Self::Height => "height",
            Self::Width => "width",
            Self::Length => "length",
            Self::Weight => "weight",
            Self::HsCode => "hs_code",
            Self::OriginCountry => "origin_country",
        };
        f.write_str(name)
    }
}

/// Product-level field changes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductChanges {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub handle: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<String>>,
    /// Source references to remember for the next run's image comparison
    pub image_sources: Option<Vec<String>>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subtitle.is_none()
            && self.description.is_none()
            && self.handle.is_none()
            && self.thumbnail.is_none()
            && self.images.is_none()
            && self.image_sources.is_none()
    }
}

/// Changes to the product's default variant, keyed by its id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantChanges {
    pub variant_id: String,
    /// Price in whole currency units
    pub price: Option<i64>,
    pub height_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub length_mm: Option<f64>,
    pub weight_g: Option<f64>,
    pub hs_code: Option<String>,
    pub origin_country: Option<String>,
    pub mid_code: Option<FieldUpdate<String>>,
    pub ean: Option<FieldUpdate<String>>,
}

impl VariantChanges {
    /// Creates an update object carrying only the identifying key
    pub fn for_variant(variant_id: impl Into<String>) -> Self {
        Self {
            variant_id: variant_id.into(),
            ..Self::default()
        }
    }

    /// Returns true when the object carries more than its identifying key
    pub fn has_changes(&self) -> bool {
        self.price.is_some()
            || self.height_mm.is_some()
            || self.width_mm.is_some()
            || self.length_mm.is_some()
            || self.weight_g.is_some()
            || self.hs_code.is_some()
            || self.origin_country.is_some()
            || self.mid_code.is_some()
            || self.ean.is_some()
    }
}

/// The computed diff for one catalog product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub product: ProductChanges,
    /// Image set unchanged since the last sync; image fields must not be touched
    pub keep_existing_images: bool,
    /// Present only when it carries more than the variant id
    pub variant: Option<VariantChanges>,
    /// Category, by name
    pub category: Option<FieldUpdate<String>>,
    /// Collection, by title
    pub collection: Option<FieldUpdate<String>>,
    /// Tags, by value
    pub tags: Option<FieldUpdate<Vec<String>>>,
}

impl Patch {
    /// Returns true when applying this patch would write nothing
    pub fn is_empty(&self) -> bool {
        self.product.is_empty()
            && self.variant.is_none()
            && self.category.is_none()
            && self.collection.is_none()
            && self.tags.is_none()
    }
}
