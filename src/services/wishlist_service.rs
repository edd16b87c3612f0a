use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    dto::wishlist::{AddWishlistRequest, WishlistProductList},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, PricedProduct, Product, WishlistItem, badges_from_json},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

#[derive(FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    category_id: Option<Uuid>,
    price: i64,
    sale_price: Option<i64>,
    stock: i32,
    badges: serde_json::Value,
    image_url: Option<String>,
    material: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category_id: row.category_id,
            price: row.price,
            sale_price: row.sale_price,
            stock: row.stock,
            badges: badges_from_json(row.badges),
            image_url: row.image_url,
            material: row.material,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT p.id, p.name, p.description, p.category_id, p.price, p.sale_price, p.stock,
               p.badges, p.image_url, p.material, p.is_active, p.created_at, p.updated_at
        FROM wishlist_items w
        JOIN products p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlist_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    let tier = user.price_tier();
    let items = rows
        .into_iter()
        .map(|row| PricedProduct::new(Product::from(row), tier))
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", WishlistProductList { items }, Some(meta)))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product = Products::find()
        .filter(ProdCol::Id.eq(payload.product_id))
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("Product not found".into()));
    }

    // Adding twice is a no-op that returns the existing entry.
    let item = sqlx::query_as::<_, WishlistItem>(
        r#"
        INSERT INTO wishlist_items (id, user_id, product_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id) DO UPDATE SET product_id = EXCLUDED.product_id
        RETURNING id, product_id, user_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .fetch_one(&state.pool)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "wishlist_add",
        "wishlist_items",
        serde_json::json!({ "product_id": payload.product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Added to wishlist",
        item,
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "wishlist_remove",
        "wishlist_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::done("Removed from wishlist"))
}

/// Put one unit of a wishlisted product into the cart and drop it from the wishlist.
pub async fn move_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartItem>> {
    let mut tx = state.pool.begin().await?;

    let removed = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    if removed.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    let active: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;
    if !matches!(active, Some((true,))) {
        return Err(AppError::BadRequest("Product is no longer available".into()));
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + 1
        RETURNING id, product_id, user_id, quantity, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(product_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "wishlist_move_to_cart",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success("Moved to cart", item, Some(Meta::empty())))
}
