use axum::{Router, routing::get};

use crate::state::AppState;

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod dashboard;
pub mod doc;
pub mod events;
pub mod health;
pub mod orders;
pub mod params;
pub mod product_requests;
pub mod products;
pub mod superadmin;
pub mod support;
pub mod wishlist;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .route("/routes/resolve", get(auth::resolve_route))
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/cart", cart::router())
        .nest("/wishlist", wishlist::router())
        .nest("/addresses", addresses::router())
        .nest("/orders", orders::router())
        .route("/dashboard", get(dashboard::customer_dashboard))
        .nest("/support/tickets", support::router())
        .nest("/admin", admin::router())
        .nest("/product-requests", product_requests::router())
        .nest("/superadmin", superadmin::router())
        .route("/events", get(events::stream_events))
}
