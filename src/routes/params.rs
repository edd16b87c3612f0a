use serde::Deserialize;
use utoipa::ToSchema;

use crate::entity::sea_orm_active_enums::{
    OrderStatus, RequestStatus, Role, TicketStatus, UserStatus,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Query structs that carry `page`/`per_page` alongside their filters.
/// Kept unflattened because url-encoded numbers do not survive `serde(flatten)`.
pub trait Paginated {
    fn page(&self) -> Option<i64>;
    fn per_page(&self) -> Option<i64>;

    fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page(),
            per_page: self.per_page(),
        }
    }
}

macro_rules! paginated {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Paginated for $ty {
                fn page(&self) -> Option<i64> {
                    self.page
                }

                fn per_page(&self) -> Option<i64> {
                    self.per_page
                }
            }
        )*
    };
}

paginated!(
    ProductQuery,
    OrderListQuery,
    LowStockQuery,
    RequestListQuery,
    TicketListQuery,
    UserListQuery,
    AuditLogQuery,
);

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    CreatedAt,
    Price,
    Name,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub on_sale: Option<bool>,
    pub in_stock: Option<bool>,
    pub badge: Option<String>,
    pub sort_by: Option<ProductSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub threshold: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryAdjustRequest {
    pub delta: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RequestListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<RequestStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TicketListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    /// Case-insensitive match on email or display name.
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AuditLogQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub user_id: Option<uuid::Uuid>,
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EventStreamQuery {
    pub order_id: Option<uuid::Uuid>,
    pub ticket_id: Option<uuid::Uuid>,
}
