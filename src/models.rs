use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        addresses, audit_logs, cart_items, categories, order_items, orders, product_requests, products,
        sea_orm_active_enums::{
            OrderStatus, PaymentMethod, RequestStatus, Role, TicketStatus, UserStatus,
        },
        staff_invites, support_ticket_messages, support_tickets, users, wishlist_items,
    },
    pricing::PriceTier,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub status: UserStatus,
    pub company_name: Option<String>,
    pub gst_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            phone: model.phone,
            role: model.role,
            status: model.status,
            company_name: model.company_name,
            gst_number: model.gst_number,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            image_url: model.image_url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    /// List price in minor units.
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock: i32,
    pub badges: Vec<String>,
    pub image_url: Option<String>,
    pub material: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category_id: model.category_id,
            price: model.price,
            sale_price: model.sale_price,
            stock: model.stock,
            badges: badges_from_json(model.badges),
            image_url: model.image_url,
            material: model.material,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// A product together with the price the current viewer pays for it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PricedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub effective_price: i64,
    pub price_tier: PriceTier,
}

impl PricedProduct {
    pub fn new(product: Product, tier: PriceTier) -> Self {
        let effective_price = crate::pricing::unit_price(product.price, product.sale_price, tier);
        Self {
            product,
            effective_price,
            price_tier: tier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct WishlistItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<wishlist_items::Model> for WishlistItem {
    fn from(model: wishlist_items::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: Uuid,
    pub label: String,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<addresses::Model> for Address {
    fn from(model: addresses::Model) -> Self {
        Self {
            id: model.id,
            label: model.label,
            full_name: model.full_name,
            phone: model.phone,
            line1: model.line1,
            line2: model.line2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
            is_default: model.is_default,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Address as copied onto an order at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "India".to_string()
}

impl From<addresses::Model> for ShippingAddress {
    fn from(model: addresses::Model) -> Self {
        Self {
            full_name: model.full_name,
            phone: model.phone,
            line1: model.line1,
            line2: model.line2,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub subtotal: i64,
    pub total_amount: i64,
    pub shipping_address: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            order_number: model.order_number,
            status: model.status,
            payment_method: model.payment_method,
            subtotal: model.subtotal,
            total_amount: model.total_amount,
            shipping_address: serde_json::from_value(model.shipping_address).ok(),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub line_total: i64,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            product_name: model.product_name,
            unit_price: model.unit_price,
            quantity: model.quantity,
            line_total: model.unit_price.saturating_mul(i64::from(model.quantity)),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub id: Uuid,
    pub requested_by: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock: i32,
    pub badges: Vec<String>,
    pub image_url: Option<String>,
    pub material: Option<String>,
    pub status: RequestStatus,
    pub review_note: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product_requests::Model> for ProductRequest {
    fn from(model: product_requests::Model) -> Self {
        Self {
            id: model.id,
            requested_by: model.requested_by,
            name: model.name,
            description: model.description,
            category_id: model.category_id,
            price: model.price,
            sale_price: model.sale_price,
            stock: model.stock,
            badges: badges_from_json(model.badges),
            image_url: model.image_url,
            material: model.material,
            status: model.status,
            review_note: model.review_note,
            reviewed_by: model.reviewed_by,
            reviewed_at: model.reviewed_at.map(|dt| dt.with_timezone(&Utc)),
            product_id: model.product_id,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupportTicket {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub subject: String,
    pub order_id: Option<Uuid>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<support_tickets::Model> for SupportTicket {
    fn from(model: support_tickets::Model) -> Self {
        Self {
            id: model.id,
            customer_id: model.customer_id,
            subject: model.subject,
            order_id: model.order_id,
            status: model.status,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketMessage {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    pub author_role: Role,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<support_ticket_messages::Model> for TicketMessage {
    fn from(model: support_ticket_messages::Model) -> Self {
        Self {
            id: model.id,
            ticket_id: model.ticket_id,
            author_id: model.author_id,
            author_role: model.author_role,
            body: model.body,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffInvite {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub invited_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub accepted_by: Option<Uuid>,
}

impl From<staff_invites::Model> for StaffInvite {
    fn from(model: staff_invites::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            invited_by: model.invited_by,
            created_at: model.created_at.with_timezone(&Utc),
            accepted_at: model.accepted_at.map(|dt| dt.with_timezone(&Utc)),
            accepted_by: model.accepted_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<audit_logs::Model> for AuditEntry {
    fn from(model: audit_logs::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            action: model.action,
            resource: model.resource,
            metadata: model.metadata,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Badges are stored as a JSON array; anything else reads as no badges.
pub fn badges_from_json(value: serde_json::Value) -> Vec<String> {
    serde_json::from_value(value).unwrap_or_default()
}
