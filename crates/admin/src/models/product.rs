//! Product domain types.
//!
//! Products are the only entity with owned child rows: each product has an
//! image list that is replaced wholesale on every update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storedash_core::{
    CategoryId, ColorId, ImageId, Price, PriceError, ProductId, SizeId, StoreId, SubcategoryId,
};

use super::category::Category;
use super::color::Color;
use super::size::Size;
use super::subcategory::Subcategory;
use super::validation::{
    Validate, ValidationError, optional_id, optional_text, require_id, require_text,
};

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub size_id: Option<SizeId>,
    pub color_id: Option<ColorId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub is_featured: bool,
    /// Hidden from storefront listings.
    pub is_archived: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    pub product_id: ProductId,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product with its images and referenced rows loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithRelations {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<Image>,
    pub category: Option<Category>,
    pub subcategory: Option<Subcategory>,
    pub size: Option<Size>,
    pub color: Option<Color>,
}

/// One image entry in a product request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageInput {
    pub url: String,
}

impl ImageInput {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Request body for creating or updating a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<ColorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_id: Option<SizeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageInput>>,
    pub is_featured: bool,
    pub is_archived: bool,
    pub is_locked: bool,
}

/// Validated product fields. `images` holds the replacement URL list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub color_id: Option<ColorId>,
    pub size_id: Option<SizeId>,
    pub images: Vec<String>,
    pub is_featured: bool,
    pub is_archived: bool,
    pub is_locked: bool,
}

impl Validate for ProductInput {
    type Draft = ProductDraft;

    fn validate(&self) -> Result<ProductDraft, ValidationError> {
        let name = require_text(self.name.as_ref(), "Name is required")?;

        let images = match self.images.as_deref() {
            Some(images) if !images.is_empty() => images
                .iter()
                .map(|image| require_text(Some(&image.url), "Image URL is required"))
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(ValidationError::new("Images are required")),
        };

        let price = match self.price.map(Price::new) {
            Some(Ok(price)) => price,
            Some(Err(PriceError::Negative)) => {
                return Err(ValidationError::new("Price must be positive"));
            }
            Some(Err(PriceError::Zero)) | None => {
                return Err(ValidationError::new("Price is required"));
            }
            Some(Err(PriceError::TooPrecise)) => {
                return Err(ValidationError::new("Price must have at most 2 decimal places"));
            }
            Some(Err(PriceError::TooLarge)) => {
                return Err(ValidationError::new("Price is too large"));
            }
        };

        let category_id = require_id(self.category_id.as_ref(), "Category id is required")?;
        let subcategory_id =
            require_id(self.subcategory_id.as_ref(), "Subcategory id is required")?;

        Ok(ProductDraft {
            name,
            description: optional_text(self.description.as_ref()),
            price,
            category_id,
            subcategory_id,
            color_id: optional_id(self.color_id.as_ref()),
            size_id: optional_id(self.size_id.as_ref()),
            images,
            is_featured: self.is_featured,
            is_archived: self.is_archived,
            is_locked: self.is_locked,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_input() -> ProductInput {
        ProductInput {
            name: Some("Linen Shirt".into()),
            price: Some(Decimal::new(4500, 2)),
            category_id: Some(CategoryId::new("cat1")),
            subcategory_id: Some(SubcategoryId::new("sub1")),
            images: Some(vec![ImageInput::new("https://img/1.png")]),
            ..ProductInput::default()
        }
    }

    #[test]
    fn test_valid_product() {
        let draft = valid_input().validate().unwrap();
        assert_eq!(draft.name, "Linen Shirt");
        assert_eq!(draft.images, vec!["https://img/1.png".to_string()]);
        assert_eq!(draft.color_id, None);
        assert!(!draft.is_archived);
    }

    #[test]
    fn test_empty_images_rejected() {
        let input = ProductInput {
            images: Some(vec![]),
            ..valid_input()
        };
        assert_eq!(
            input.validate().unwrap_err().message(),
            "Images are required"
        );

        let input = ProductInput {
            images: None,
            ..valid_input()
        };
        assert_eq!(
            input.validate().unwrap_err().message(),
            "Images are required"
        );
    }

    #[test]
    fn test_blank_image_url_rejected() {
        let input = ProductInput {
            images: Some(vec![ImageInput::new(" ")]),
            ..valid_input()
        };
        assert_eq!(
            input.validate().unwrap_err().message(),
            "Image URL is required"
        );
    }

    #[test]
    fn test_price_rules() {
        let zero = ProductInput {
            price: Some(Decimal::ZERO),
            ..valid_input()
        };
        assert_eq!(zero.validate().unwrap_err().message(), "Price is required");

        let negative = ProductInput {
            price: Some(Decimal::new(-1, 0)),
            ..valid_input()
        };
        assert_eq!(
            negative.validate().unwrap_err().message(),
            "Price must be positive"
        );

        let fractional_cent = ProductInput {
            price: Some(Decimal::new(1, 3)),
            ..valid_input()
        };
        assert_eq!(
            fractional_cent.validate().unwrap_err().message(),
            "Price must have at most 2 decimal places"
        );

        let huge = ProductInput {
            price: Some(Decimal::new(10_000_000_000, 0)),
            ..valid_input()
        };
        assert_eq!(huge.validate().unwrap_err().message(), "Price is too large");
    }

    #[test]
    fn test_field_order_matches_route_checks() {
        // name is checked before images, images before price
        let input = ProductInput::default();
        assert_eq!(input.validate().unwrap_err().message(), "Name is required");

        let input = ProductInput {
            name: Some("Shirt".into()),
            ..ProductInput::default()
        };
        assert_eq!(input.validate().unwrap_err().message(), "Images are required");
    }

    #[test]
    fn test_price_accepts_number_or_string() {
        let from_number: ProductInput = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        let from_string: ProductInput = serde_json::from_str(r#"{"price": "12.5"}"#).unwrap();
        assert_eq!(from_number.price, from_string.price);
    }
}
