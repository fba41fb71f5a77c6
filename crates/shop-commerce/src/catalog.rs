//! Catalog product as returned by the products endpoint.

use crate::ids::ProductId;
use crate::money::Amount;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
///
/// The catalog is browsed in the currency preference in effect at fetch
/// time, so `price` is already expressed in that currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    #[serde(alias = "name")]
    pub title: String,
    /// Image reference (URL or asset name).
    #[serde(default, alias = "image", alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Unit price.
    pub price: Amount,
    /// Long description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Product {
    /// Create a product with no image or description.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: Amount) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_ref: None,
            price,
            description: None,
        }
    }

    /// Set the image reference.
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}
