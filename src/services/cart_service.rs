use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Product, badges_from_json},
    pricing::{self, PriceTier},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    product_id: Uuid,
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

impl CartWithProductRow {
    fn into_dto(self, tier: PriceTier) -> AppResult<CartItemDto> {
        let unit_price = pricing::unit_price(self.price, self.sale_price, tier);
        Ok(CartItemDto {
            id: self.cart_id,
            quantity: self.quantity,
            unit_price,
            line_total: pricing::line_total(unit_price, self.quantity)?,
            product: Product {
                id: self.product_id,
                name: self.name,
                description: self.description,
                category_id: self.category_id,
                price: self.price,
                sale_price: self.sale_price,
                stock: self.stock,
                badges: badges_from_json(self.badges),
                image_url: self.image_url,
                material: self.material,
                is_active: self.is_active,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        })
    }
}

/// Every cart line of `user_id`, priced for `tier`, newest first.
pub async fn load_cart(pool: &DbPool, user_id: Uuid, tier: PriceTier) -> AppResult<CartList> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id AS product_id, p.name, p.description, p.category_id, p.price,
               p.sale_price, p.stock, p.badges, p.image_url, p.material, p.is_active,
               p.created_at, p.updated_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| row.into_dto(tier))
        .collect::<AppResult<Vec<CartItemDto>>>()?;
    let total = pricing::cart_total(items.iter().map(|i| (i.unit_price, i.quantity)))?;
    let item_count: i64 = items.iter().map(|i| i64::from(i.quantity)).sum();

    Ok(CartList {
        items,
        price_tier: tier,
        item_count,
        total,
    })
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let cart = load_cart(&state.pool, user.user_id, user.price_tier()).await?;
    let meta = Meta::total(cart.items.len());
    Ok(ApiResponse::success("OK", cart, Some(meta)))
}

async fn ensure_product_available(state: &AppState, product_id: Uuid) -> AppResult<()> {
    let product = Products::find()
        .filter(ProdCol::Id.eq(product_id))
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }
    Ok(())
}

/// Add `quantity` units; an existing line for the product is incremented.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    ensure_product_available(state, payload.product_id).await?;

    let cart_item = add_line(&state.pool, user.user_id, payload.product_id, payload.quantity).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": cart_item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub(crate) async fn add_line(
    pool: &DbPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<CartItem> {
    let item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
        RETURNING id, product_id, user_id, quantity, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(pool)
    .await?;
    Ok(item)
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        UPDATE cart_items
        SET quantity = $3
        WHERE product_id = $1 AND user_id = $2
        RETURNING id, product_id, user_id, quantity, created_at
        "#,
    )
    .bind(product_id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": product_id, "quantity": item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", item, Some(Meta::empty())))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::done("Removed from cart"))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_clear",
        "cart_items",
        serde_json::json!({ "removed": result.rows_affected() }),
    )
    .await;

    Ok(ApiResponse::done("Cart cleared"))
}
