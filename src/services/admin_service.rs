use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        dashboard::AdminDashboard,
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::ProductList,
    },
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    events::StoreEvent,
    middleware::auth::{AuthUser, ensure_staff},
    models::{Order, PricedProduct, Product},
    pricing::PriceTier,
    response::{ApiResponse, Meta},
    routes::params::{InventoryAdjustRequest, LowStockQuery, OrderListQuery, Paginated, SortOrder},
    services::{dashboard_service, order_service},
    state::AppState,
};

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_staff(user)?;
    let order = match Orders::find_by_id(id).one(&state.orm).await? {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = order_service::with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("Order found", data, Some(Meta::empty())))
}

/// Reject moves out of a terminal status. Re-applying the current status is a no-op.
pub fn check_status_transition(from: OrderStatus, to: OrderStatus) -> AppResult<()> {
    if from == to {
        return Ok(());
    }
    if from.is_terminal() {
        return Err(AppError::BadRequest(format!(
            "Order is already {}",
            from.as_str()
        )));
    }
    Ok(())
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;

    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    check_status_transition(existing.status, payload.status)?;
    let changed = existing.status != payload.status;

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;
    txn.commit().await?;

    if changed {
        audit::record(
            &state.pool,
            user.user_id,
            "order_status_update",
            "orders",
            serde_json::json!({ "order_id": order.id, "status": order.status }),
        )
        .await;
        state.events.publish(StoreEvent::OrderStatusChanged {
            order_id: order.id,
            customer_id: order.user_id,
            status: order.status,
        });
    }

    Ok(ApiResponse::success(
        "Order updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_staff(user)?;
    let threshold = query
        .threshold
        .unwrap_or(state.config.low_stock_threshold);
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(ProdCol::Stock.lte(threshold))
        .filter(ProdCol::IsActive.eq(true))
        .order_by_asc(ProdCol::Stock)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|p| PricedProduct::new(Product::from(p), PriceTier::Retail))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Low stock",
        ProductList { items },
        Some(meta),
    ))
}

/// Stock after adding `delta`; it may not go negative or past `i32::MAX`.
pub fn apply_stock_delta(stock: i32, delta: i32) -> AppResult<i32> {
    match stock.checked_add(delta) {
        Some(next) if next >= 0 => Ok(next),
        Some(_) => Err(AppError::BadRequest("stock cannot be negative".into())),
        None => Err(AppError::BadRequest("stock is out of range".into())),
    }
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let new_stock = apply_stock_delta(product.stock, payload.delta)?;

    let mut active: ProductActive = product.into();
    active.stock = Set(new_stock);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": updated.id, "delta": payload.delta, "stock": updated.stock }),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory updated",
        Product::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AdminDashboard>> {
    ensure_staff(user)?;
    let threshold = state.config.low_stock_threshold;

    let orders_by_status = dashboard_service::grouped_counts(
        &state.pool,
        "SELECT status, COUNT(*) FROM orders GROUP BY status",
    )
    .await?;

    let revenue: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_amount), 0)::BIGINT FROM orders WHERE status <> 'cancelled'",
    )
    .fetch_one(&state.pool)
    .await?;

    let low_stock_products: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM products WHERE is_active AND stock <= $1",
    )
    .bind(threshold)
    .fetch_one(&state.pool)
    .await?;

    let pending_product_requests: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM product_requests WHERE status = 'pending'",
    )
    .fetch_one(&state.pool)
    .await?;

    let open_tickets: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM support_tickets WHERE status IN ('open', 'in_progress')",
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        AdminDashboard {
            orders_by_status,
            revenue,
            low_stock_threshold: threshold,
            low_stock_products,
            pending_product_requests,
            open_tickets,
        },
        Some(Meta::empty()),
    ))
}
