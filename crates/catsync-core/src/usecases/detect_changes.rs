//! Change detection use case
//!
//! Compares a sheet row with the existing catalog record and produces the
//! minimal [`Patch`]. Field policy:
//!
//! | Field class | Sheet value present | Sheet value empty |
//! |---|---|---|
//! | Mandatory (title, subtitle, description, price, dimensions, weight, HS code, origin) | set when different | reported, existing kept |
//! | Images | set when the upload produced new URLs | keep flag, image fields untouched |
//! | Category, collection, tags | set when different | clear when the record has a value |
//! | MID code, EAN | set when different | clear when the record has a value |
//!
//! The detector performs no I/O. Callers log the returned gaps and clears.

use serde::Serialize;

use crate::domain::{
    CatalogProduct, CatalogVariant, FieldUpdate, MandatoryField, Patch, ProductChanges,
    SheetProduct, UploadResult, VariantChanges,
};

/// Measurements closer than this are considered equal
const MEASURE_EPSILON: f64 = 1e-6;

/// An optional value that the patch removes from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearedValue {
    pub field: &'static str,
    pub previous: String,
}

/// Result of comparing one row with its catalog record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub patch: Patch,
    /// Mandatory fields empty in the sheet; their catalog values are kept
    pub missing_mandatory: Vec<MandatoryField>,
    /// Optional values the patch clears
    pub cleared: Vec<ClearedValue>,
}

/// Computes catalog patches
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(
        &self,
        product: &SheetProduct,
        upload: &UploadResult,
        existing: &CatalogProduct,
    ) -> Detection {
        let mut detection = Detection::default();

        detection.patch.product = product_changes(product, existing, &mut detection.missing_mandatory);
        detect_images(upload, existing, &mut detection.patch);

        let variant = existing.variant.clone().unwrap_or_default();
        let changes = variant_changes(product, &variant, &mut detection);
        if existing.variant.is_some() && changes.has_changes() {
            detection.patch.variant = Some(changes);
        }

        detection.patch.category = optional_text(
            "category",
            product.category.as_deref(),
            existing.category.as_deref(),
            &mut detection.cleared,
        );
        detection.patch.collection = optional_text(
            "collection",
            product.collection.as_deref(),
            existing.collection.as_deref(),
            &mut detection.cleared,
        );
        detection.patch.tags = tag_update(&product.tags, &existing.tags, &mut detection.cleared);

        detection
    }
}

fn product_changes(
    product: &SheetProduct,
    existing: &CatalogProduct,
    missing: &mut Vec<MandatoryField>,
) -> ProductChanges {
    ProductChanges {
        title: (product.title != existing.title).then(|| product.title.clone()),
        subtitle: mandatory_text(
            MandatoryField::Subtitle,
            product.subtitle.as_deref(),
            existing.subtitle.as_deref(),
            missing,
        ),
        description: mandatory_text(
            MandatoryField::Description,
            product.description.as_deref(),
            existing.description.as_deref(),
            missing,
        ),
        handle: (!product.handle.is_empty() && product.handle != existing.handle)
            .then(|| product.handle.clone()),
        ..ProductChanges::default()
    }
}

fn detect_images(upload: &UploadResult, existing: &CatalogProduct, patch: &mut Patch) {
    if upload.keep_existing || !upload.has_images() {
        patch.keep_existing_images = true;
        return;
    }

    let changes = &mut patch.product;
    if let Some(thumbnail) = &upload.thumbnail_url {
        if existing.thumbnail.as_deref() != Some(thumbnail.as_str()) {
            changes.thumbnail = Some(thumbnail.clone());
        }
    }

    let mut images: Vec<String> = upload
        .thumbnail_url
        .iter()
        .chain(upload.image_urls.iter())
        .cloned()
        .collect();

    // A failed slot keeps whatever the catalog already serves under its key.
    let uploaded = images.len();
    images.extend(
        existing
            .images
            .iter()
            .filter(|url| upload.failed_keys.iter().any(|key| url.ends_with(key.as_str())))
            .cloned(),
    );
    if images.len() > uploaded {
        images.sort_by_key(|url| gallery_position(url));
    }

    if images != existing.images {
        changes.images = Some(images);
    }
    if upload.source_urls != existing.image_sources {
        changes.image_sources = Some(upload.source_urls.clone());
    }
}

/// Gallery order of a stored image: thumbnail first, then `image-{n}`
fn gallery_position(url: &str) -> u32 {
    let name = url.rsplit('/').next().unwrap_or(url);
    if name.ends_with("-thumbnail.jpg") {
        return 0;
    }
    name.strip_suffix(".jpg")
        .and_then(|stem| stem.rsplit_once("-image-"))
        .and_then(|(_, n)| n.parse().ok())
        .unwrap_or(u32::MAX)
}

fn variant_changes(
    product: &SheetProduct,
    existing: &CatalogVariant,
    detection: &mut Detection,
) -> VariantChanges {
    let missing = &mut detection.missing_mandatory;
    let dims = &product.dimensions;
    let current = &existing.dimensions;

    let price = match product.rounded_price() {
        Some(price) => (existing.price != Some(price)).then_some(price),
        None => {
            missing.push(MandatoryField::Price);
            None
        }
    };

    VariantChanges {
        variant_id: existing.id.clone(),
        price,
        height_mm: measurement(MandatoryField::Height, dims.height_mm, current.height_mm, missing),
        width_mm: measurement(MandatoryField::Width, dims.width_mm, current.width_mm, missing),
        length_mm: measurement(MandatoryField::Length, dims.length_mm, current.length_mm, missing),
        weight_g: measurement(MandatoryField::Weight, product.weight_g, existing.weight_g, missing),
        hs_code: mandatory_text(
            MandatoryField::HsCode,
            product.codes.hs_code.as_deref(),
            existing.codes.hs_code.as_deref(),
            missing,
        ),
        origin_country: match product.codes.origin_country.as_deref() {
            Some(origin) => {
                let same = existing
                    .codes
                    .origin_country
                    .as_deref()
                    .is_some_and(|current| current.eq_ignore_ascii_case(origin));
                (!same).then(|| origin.to_string())
            }
            None => {
                missing.push(MandatoryField::OriginCountry);
                None
            }
        },
        mid_code: optional_text(
            "mid_code",
            product.codes.mid_code.as_deref(),
            existing.codes.mid_code.as_deref(),
            &mut detection.cleared,
        ),
        ean: optional_text(
            "ean",
            product.ean.as_deref(),
            existing.ean.as_deref(),
            &mut detection.cleared,
        ),
    }
}

fn mandatory_text(
    field: MandatoryField,
    sheet: Option<&str>,
    current: Option<&str>,
    missing: &mut Vec<MandatoryField>,
) -> Option<String> {
    match sheet {
        Some(value) => (current != Some(value)).then(|| value.to_string()),
        None => {
            missing.push(field);
            None
        }
    }
}

fn measurement(
    field: MandatoryField,
    sheet: Option<f64>,
    current: Option<f64>,
    missing: &mut Vec<MandatoryField>,
) -> Option<f64> {
    match sheet {
        Some(value) => {
            let same = current.is_some_and(|c| (c - value).abs() < MEASURE_EPSILON);
            (!same).then_some(value)
        }
        None => {
            missing.push(field);
            None
        }
    }
}

fn optional_text(
    field: &'static str,
    sheet: Option<&str>,
    current: Option<&str>,
    cleared: &mut Vec<ClearedValue>,
) -> Option<FieldUpdate<String>> {
    match (sheet, current) {
        (Some(value), current) if current != Some(value) => Some(FieldUpdate::Set(value.to_string())),
        (Some(_), _) => None,
        (None, Some(previous)) if !previous.is_empty() => {
            cleared.push(ClearedValue {
                field,
                previous: previous.to_string(),
            });
            Some(FieldUpdate::Clear)
        }
        (None, _) => None,
    }
}

fn tag_update(
    sheet: &[String],
    current: &[String],
    cleared: &mut Vec<ClearedValue>,
) -> Option<FieldUpdate<Vec<String>>> {
    if sheet.is_empty() {
        if current.is_empty() {
            return None;
        }
        cleared.push(ClearedValue {
            field: "tags",
            previous: current.join(", "),
        });
        return Some(FieldUpdate::Clear);
    }

    let same = sheet.len() == current.len() && sheet.iter().all(|tag| current.contains(tag));
    (!same).then(|| FieldUpdate::Set(sheet.to_vec()))
}
