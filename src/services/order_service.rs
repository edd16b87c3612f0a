use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems, Model as CartItemModel},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products, Model as ProductModel},
        sea_orm_active_enums::OrderStatus,
    },
    error::{AppError, AppResult},
    events::StoreEvent,
    middleware::auth::AuthUser,
    models::{Order, OrderItem, ShippingAddress},
    pricing::{self, PriceTier},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, Paginated, SortOrder},
    services::address_service,
    state::AppState,
    validation,
};

/// One priced cart line, ready to be written as an order item.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

/// Price every cart line against the locked product rows, refusing lines
/// whose product is gone, retired or short on stock.
pub fn price_cart_lines(
    cart: &[CartItemModel],
    products: &HashMap<Uuid, ProductModel>,
    tier: PriceTier,
) -> AppResult<Vec<CheckoutLine>> {
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut lines = Vec::with_capacity(cart.len());
    for item in cart {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        let product = products
            .get(&item.product_id)
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Product {} is no longer available",
                    item.product_id
                ))
            })?;
        if product.stock < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                product.name
            )));
        }
        lines.push(CheckoutLine {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: pricing::unit_price(product.price, product.sale_price, tier),
            quantity: item.quantity,
        });
    }
    Ok(lines)
}

fn validate_inline_address(address: ShippingAddress) -> AppResult<ShippingAddress> {
    Ok(ShippingAddress {
        full_name: validation::ensure_present("full_name", &address.full_name)?,
        phone: validation::ensure_phone(&address.phone)?,
        line1: validation::ensure_present("line1", &address.line1)?,
        line2: address.line2.filter(|l| !l.trim().is_empty()),
        city: validation::ensure_present("city", &address.city)?,
        state: validation::ensure_present("state", &address.state)?,
        postal_code: validation::ensure_pin_code(&address.postal_code)?,
        country: address.country,
    })
}

async fn resolve_shipping_address<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    address_id: Option<Uuid>,
    inline: Option<ShippingAddress>,
) -> AppResult<ShippingAddress> {
    if let Some(id) = address_id {
        let address = address_service::find_owned(conn, user_id, id).await?;
        return Ok(ShippingAddress::from(address));
    }
    if let Some(address) = inline {
        return validate_inline_address(address);
    }
    address_service::default_address(conn, user_id)
        .await?
        .map(ShippingAddress::from)
        .ok_or_else(|| AppError::BadRequest("A shipping address is required".into()))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
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
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Place an order from the caller's cart.
///
/// Runs as one transaction: the cart lines and then the product rows (in id
/// order) are locked, stock is checked and decremented, the order and its item
/// snapshot are written and exactly the ordered cart lines are removed. Any
/// failure leaves cart and stock untouched.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let shipping = resolve_shipping_address(
        &txn,
        user.user_id,
        payload.address_id,
        payload.shipping_address,
    )
    .await?;

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    let cart_ids: Vec<Uuid> = cart.iter().map(|item| item.id).collect();

    let product_ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines = price_cart_lines(&cart, &products, user.price_tier())?;
    let subtotal = pricing::cart_total(lines.iter().map(|l| (l.unit_price, l.quantity)))?;

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        order_number: Set(build_order_number(order_id)),
        status: Set(OrderStatus::Processing),
        payment_method: Set(payload.payment_method),
        subtotal: Set(subtotal),
        total_amount: Set(subtotal),
        shipping_address: Set(serde_json::to_value(&shipping)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    let mut products = products;
    for line in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            product_name: Set(line.product_name),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));

        // reduce stock
        if let Some(product) = products.remove(&line.product_id) {
            let remaining = product.stock - line.quantity;
            let mut active: ProductActive = product.into();
            active.stock = Set(remaining);
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?;
        }
    }

    // only the lines that were ordered; lines added meanwhile stay in the cart
    CartItems::delete_many()
        .filter(CartCol::Id.is_in(cart_ids))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = order.total_amount,
        items = order_items.len(),
        "order placed"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_amount": order.total_amount }),
    )
    .await;
    state.events.publish(StoreEvent::OrderPlaced {
        order_id: order.id,
        customer_id: order.user_id,
        order_number: order.order_number.clone(),
        total_amount: order.total_amount,
    });

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: Order::from(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let data = with_items(&state.orm, order).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

/// Attach the item snapshot to an order.
pub async fn with_items<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
) -> AppResult<OrderWithItems> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(OrderWithItems {
        order: Order::from(order),
        items,
    })
}

pub fn build_order_number(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    let short = &suffix[..8];
    format!("ORD-{}-{}", date, short.to_uppercase())
}
