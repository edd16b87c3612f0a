use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::PricedProduct;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct WishlistProductList {
    #[schema(value_type = Vec<PricedProduct>)]
    pub items: Vec<PricedProduct>,
}
