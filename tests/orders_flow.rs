mod common;

use furniture_store_api::{
    dto::{
        addresses::AddressRequest,
        cart::AddToCartRequest,
        orders::{CheckoutRequest, UpdateOrderStatusRequest},
    },
    entity::{
        Products,
        sea_orm_active_enums::{OrderStatus, PaymentMethod, Role, UserStatus},
    },
    error::AppError,
    events::StoreEvent,
    routes::params::{InventoryAdjustRequest, LowStockQuery, OrderListQuery},
    services::{address_service, admin_service, cart_service, order_service},
};
use sea_orm::EntityTrait;

// Customer adds to cart -> checks out; admin moves the order along and watches stock.
#[tokio::test]
async fn checkout_and_admin_fulfilment_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let mut events = state.events.subscribe();

    let customer =
        common::create_user(&state, "customer@example.com", Role::Customer, UserStatus::Active).await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin, UserStatus::Active).await?;
    let product_id = common::create_product(&state, "Walnut Bookshelf", 12_000, 6).await?;

    // No address on file and none given
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id,
            quantity: 2,
        },
    )
    .await?;
    let err = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            address_id: None,
            shipping_address: None,
            payment_method: PaymentMethod::Cod,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    address_service::create_address(
        &state,
        &customer,
        AddressRequest {
            label: "Home".into(),
            full_name: "Asha Rao".into(),
            phone: "+91 98765 43210".into(),
            line1: "12 MG Road".into(),
            line2: None,
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            postal_code: "560001".into(),
            country: None,
            is_default: true,
        },
    )
    .await?;

    // Adding the same product again merges the line
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id,
            quantity: 1,
        },
    )
    .await?;

    let placed = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            address_id: None,
            shipping_address: None,
            payment_method: PaymentMethod::Upi,
        },
    )
    .await?
    .data
    .unwrap();
    let order = placed.order;
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.total_amount, 36_000);
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 3);
    assert_eq!(
        order.shipping_address.as_ref().map(|a| a.city.as_str()),
        Some("Bengaluru")
    );

    match events.recv().await? {
        StoreEvent::OrderPlaced {
            order_id,
            customer_id,
            total_amount,
            ..
        } => {
            assert_eq!(order_id, order.id);
            assert_eq!(customer_id, customer.user_id);
            assert_eq!(total_amount, 36_000);
        }
        other => panic!("unexpected event {other:?}"),
    }

    // Stock went down and the cart is empty
    let stored = Products::find_by_id(product_id).one(&state.orm).await?.unwrap();
    assert_eq!(stored.stock, 3);
    let cart = cart_service::list_cart(&state, &customer).await?.data.unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);

    // Another customer cannot see the order
    let stranger =
        common::create_user(&state, "stranger@example.com", Role::Customer, UserStatus::Active).await?;
    assert!(matches!(
        order_service::get_order(&state, &stranger, order.id).await,
        Err(AppError::NotFound)
    ));

    // Customers cannot change order status
    assert!(matches!(
        admin_service::update_order_status(
            &state,
            &customer,
            order.id,
            UpdateOrderStatusRequest {
                status: OrderStatus::Shipped
            },
        )
        .await,
        Err(AppError::Forbidden)
    ));

    for status in [OrderStatus::Shipped, OrderStatus::Delivered] {
        let updated = admin_service::update_order_status(
            &state,
            &admin,
            order.id,
            UpdateOrderStatusRequest { status },
        )
        .await?
        .data
        .unwrap();
        assert_eq!(updated.status, status);
        match events.recv().await? {
            StoreEvent::OrderStatusChanged { status: seen, .. } => assert_eq!(seen, status),
            other => panic!("unexpected event {other:?}"),
        }
    }

    // Delivered is final
    let err = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Cancelled,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Stock of 3 is at or under the threshold
    let low = admin_service::list_low_stock(
        &state,
        &admin,
        LowStockQuery {
            page: Some(1),
            per_page: Some(20),
            threshold: Some(5),
        },
    )
    .await?;
    assert!(
        low.data.unwrap().items.iter().any(|p| p.product.id == product_id),
        "expected product to appear in low-stock list"
    );

    // Ordering more than is left fails and leaves the cart alone
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id,
            quantity: 4,
        },
    )
    .await?;
    let err = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            address_id: None,
            shipping_address: None,
            payment_method: PaymentMethod::Card,
        },
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Insufficient stock"));
    let cart = cart_service::list_cart(&state, &customer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);

    // Restock, then the same cart goes through
    let restocked = admin_service::adjust_inventory(
        &state,
        &admin,
        product_id,
        InventoryAdjustRequest { delta: 10 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(restocked.stock, 13);

    let err = admin_service::adjust_inventory(
        &state,
        &admin,
        product_id,
        InventoryAdjustRequest { delta: -100 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            address_id: None,
            shipping_address: None,
            payment_method: PaymentMethod::Card,
        },
    )
    .await?;
    let stored = Products::find_by_id(product_id).one(&state.orm).await?.unwrap();
    assert_eq!(stored.stock, 9);

    // Staff see every order and can filter by status
    assert!(matches!(
        admin_service::list_all_orders(&state, &customer, OrderListQuery::default()).await,
        Err(AppError::Forbidden)
    ));
    let everything = admin_service::list_all_orders(&state, &admin, OrderListQuery::default()).await?;
    assert_eq!(everything.meta.as_ref().and_then(|m| m.total), Some(2));
    let delivered = admin_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            status: Some(OrderStatus::Delivered),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(delivered.items.len(), 1);
    assert_eq!(delivered.items[0].id, order.id);

    let detail = admin_service::get_order_admin(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.order.order_number, order.order_number);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].line_total, 36_000);
    assert!(matches!(
        admin_service::get_order_admin(&state, &customer, order.id).await,
        Err(AppError::Forbidden)
    ));

    Ok(())
}
