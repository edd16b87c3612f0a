use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddWishlistRequest, WishlistProductList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{CartItem, WishlistItem},
    response::ApiResponse,
    routes::params::Pagination,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/{product_id}", delete(remove_from_wishlist))
        .route("/{product_id}/move-to-cart", post(move_to_cart))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Wishlisted products", body = ApiResponse<WishlistProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<WishlistProductList>>> {
    let resp = wishlist_service::list_wishlist(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist",
    request_body = AddWishlistRequest,
    responses(
        (status = 200, description = "Added (idempotent)", body = ApiResponse<WishlistItem>),
        (status = 400, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddWishlistRequest>,
) -> AppResult<Json<ApiResponse<WishlistItem>>> {
    let resp = wishlist_service::add_to_wishlist(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not in wishlist")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::remove_from_wishlist(&state, &user, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{product_id}/move-to-cart",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Moved one unit to the cart", body = ApiResponse<CartItem>),
        (status = 404, description = "Not in wishlist")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn move_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = wishlist_service::move_to_cart(&state, &user, product_id).await?;
    Ok(Json(resp))
}
