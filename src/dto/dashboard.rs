use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerDashboard {
    pub orders_by_status: BTreeMap<String, i64>,
    pub total_spent: i64,
    pub cart_items: i64,
    pub cart_total: i64,
    pub wishlist_items: i64,
    pub open_tickets: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminDashboard {
    pub orders_by_status: BTreeMap<String, i64>,
    /// Sum of every non-cancelled order.
    pub revenue: i64,
    pub low_stock_threshold: i32,
    pub low_stock_products: i64,
    pub pending_product_requests: i64,
    pub open_tickets: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuperadminDashboard {
    pub users_by_role: BTreeMap<String, i64>,
    pub users_by_status: BTreeMap<String, i64>,
    pub pending_business_approvals: i64,
    pub pending_product_requests: i64,
    pub orders_by_status: BTreeMap<String, i64>,
}
