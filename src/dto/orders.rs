use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{OrderStatus, PaymentMethod},
    models::{Order, OrderItem, ShippingAddress},
};

/// Ship to `address_id`, else to an inline address, else to the default address.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address_id: Option<Uuid>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
