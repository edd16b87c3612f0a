use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::PricedProduct;

/// Catalog fields shared by product creation and product requests.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock: i32,
    #[serde(default)]
    pub badges: Vec<String>,
    pub image_url: Option<String>,
    pub material: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<i64>,
    /// `0` clears the sale price.
    pub sale_price: Option<i64>,
    pub stock: Option<i32>,
    pub badges: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub material: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<PricedProduct>)]
    pub items: Vec<PricedProduct>,
}
