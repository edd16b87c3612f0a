use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Product, ProductRequest};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRequestList {
    pub items: Vec<ProductRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApprovedRequest {
    pub request: ProductRequest,
    pub product: Product,
}
