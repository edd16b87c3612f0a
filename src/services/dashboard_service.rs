use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::dashboard::CustomerDashboard,
    error::AppResult,
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::cart_service,
    state::AppState,
};

/// Run a `SELECT key, COUNT(*) ... GROUP BY key` query into an ordered map.
pub async fn grouped_counts(pool: &DbPool, sql: &str) -> AppResult<BTreeMap<String, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(sql).fetch_all(pool).await?;
    Ok(rows.into_iter().collect())
}

/// `grouped_counts` with the first placeholder bound to `owner`.
pub async fn grouped_counts_for(
    pool: &DbPool,
    sql: &str,
    owner: Uuid,
) -> AppResult<BTreeMap<String, i64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(sql).bind(owner).fetch_all(pool).await?;
    Ok(rows.into_iter().collect())
}

pub async fn customer_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CustomerDashboard>> {
    let orders_by_status = grouped_counts_for(
        &state.pool,
        "SELECT status, COUNT(*) FROM orders WHERE user_id = $1 GROUP BY status",
        user.user_id,
    )
    .await?;

    let total_spent: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total_amount), 0)::BIGINT
        FROM orders
        WHERE user_id = $1 AND status <> 'cancelled'
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let cart = cart_service::load_cart(&state.pool, user.user_id, user.price_tier()).await?;

    let wishlist_items: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM wishlist_items WHERE user_id = $1")
            .bind(user.user_id)
            .fetch_one(&state.pool)
            .await?;

    let open_tickets: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM support_tickets WHERE customer_id = $1 AND status IN ('open', 'in_progress')",
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        CustomerDashboard {
            orders_by_status,
            total_spent,
            cart_items: cart.item_count,
            cart_total: cart.total,
            wishlist_items,
            open_tickets,
        },
        Some(Meta::empty()),
    ))
}
