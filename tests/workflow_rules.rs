use std::collections::HashMap;

use chrono::Utc;
use furniture_store_api::{
    dto::auth::AccountType,
    entity::{
        cart_items,
        products,
        sea_orm_active_enums::{OrderStatus, Role, TicketStatus, UserStatus},
        staff_invites,
    },
    pricing::PriceTier,
    services::{
        admin_service::{apply_stock_delta, check_status_transition},
        auth_service::{hash_password, initial_role, verify_password},
        order_service::{build_order_number, price_cart_lines},
        support_service::status_after_message,
        superadmin_service::check_self_update,
    },
};
use serde_json::json;
use uuid::Uuid;

fn product(name: &str, price: i64, sale_price: Option<i64>, stock: i32) -> products::Model {
    let now = Utc::now().fixed_offset();
    products::Model {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        category_id: None,
        price,
        sale_price,
        stock,
        badges: json!([]),
        image_url: None,
        material: None,
        is_active: true,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

fn cart_line(product_id: Uuid, quantity: i32) -> cart_items::Model {
    cart_items::Model {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        product_id,
        quantity,
        created_at: Utc::now().fixed_offset(),
    }
}

fn catalog(items: &[&products::Model]) -> HashMap<Uuid, products::Model> {
    items.iter().map(|p| (p.id, (*p).clone())).collect()
}

#[test]
fn checkout_prices_lines_per_tier() {
    let sofa = product("Teak Sofa", 45_000, Some(42_000), 3);
    let lamp = product("Floor Lamp", 2_500, None, 10);
    let cart = vec![cart_line(sofa.id, 1), cart_line(lamp.id, 2)];
    let products = catalog(&[&sofa, &lamp]);

    let retail = price_cart_lines(&cart, &products, PriceTier::Retail).unwrap();
    assert_eq!(retail.len(), 2);
    assert_eq!(retail[0].unit_price, 42_000);
    assert_eq!(retail[1].unit_price, 2_500);
    assert_eq!(retail[1].quantity, 2);

    let business = price_cart_lines(&cart, &products, PriceTier::Business).unwrap();
    assert_eq!(business[0].unit_price, 36_900);
    assert_eq!(business[1].unit_price, 2_050);
    assert_eq!(business[0].product_name, "Teak Sofa");
}

#[test]
fn checkout_refuses_empty_or_unavailable_carts() {
    let products = HashMap::new();
    let err = price_cart_lines(&[], &products, PriceTier::Retail).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request Cart is empty");

    let ghost = Uuid::new_v4();
    let err = price_cart_lines(&[cart_line(ghost, 1)], &products, PriceTier::Retail).unwrap_err();
    assert!(err.to_string().contains("no longer available"));

    let mut retired = product("Old Chair", 1_000, None, 5);
    retired.is_active = false;
    let products = catalog(&[&retired]);
    assert!(price_cart_lines(&[cart_line(retired.id, 1)], &products, PriceTier::Retail).is_err());
}

#[test]
fn checkout_refuses_more_than_in_stock() {
    let table = product("Dining Table", 30_000, None, 2);
    let products = catalog(&[&table]);

    assert!(price_cart_lines(&[cart_line(table.id, 2)], &products, PriceTier::Retail).is_ok());
    let err = price_cart_lines(&[cart_line(table.id, 3)], &products, PriceTier::Retail).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request Insufficient stock for Dining Table");
}

#[test]
fn order_numbers_carry_date_and_id_prefix() {
    let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
    let number = build_order_number(id);
    assert!(number.starts_with("ORD-"));
    assert!(number.ends_with("-A1B2C3D4"));
    assert_eq!(number.len(), "ORD-20260101-A1B2C3D4".len());
}

#[test]
fn terminal_orders_do_not_move() {
    assert!(check_status_transition(OrderStatus::Processing, OrderStatus::Shipped).is_ok());
    assert!(check_status_transition(OrderStatus::Shipped, OrderStatus::Delivered).is_ok());
    assert!(check_status_transition(OrderStatus::Processing, OrderStatus::Cancelled).is_ok());
    assert!(check_status_transition(OrderStatus::Delivered, OrderStatus::Delivered).is_ok());

    let err = check_status_transition(OrderStatus::Delivered, OrderStatus::Shipped).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request Order is already delivered");
    assert!(check_status_transition(OrderStatus::Cancelled, OrderStatus::Processing).is_err());
}

#[test]
fn ticket_status_follows_the_conversation() {
    assert_eq!(
        status_after_message(TicketStatus::Open, true).unwrap(),
        TicketStatus::InProgress
    );
    assert_eq!(
        status_after_message(TicketStatus::Open, false).unwrap(),
        TicketStatus::Open
    );
    assert_eq!(
        status_after_message(TicketStatus::Resolved, false).unwrap(),
        TicketStatus::Open
    );
    assert_eq!(
        status_after_message(TicketStatus::Resolved, true).unwrap(),
        TicketStatus::Resolved
    );
    assert_eq!(
        status_after_message(TicketStatus::InProgress, false).unwrap(),
        TicketStatus::InProgress
    );
    assert!(status_after_message(TicketStatus::Closed, true).is_err());
    assert!(status_after_message(TicketStatus::Closed, false).is_err());
}

#[test]
fn superadmins_cannot_lock_themselves_out() {
    let me = Uuid::new_v4();
    let other = Uuid::new_v4();

    assert!(check_self_update(me, other, Some(Role::Customer), Some(UserStatus::Rejected)).is_ok());
    assert!(check_self_update(me, me, Some(Role::Superadmin), Some(UserStatus::Active)).is_ok());
    assert!(check_self_update(me, me, None, None).is_ok());

    let err = check_self_update(me, me, Some(Role::Admin), None).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request You cannot demote yourself");
    let err = check_self_update(me, me, None, Some(UserStatus::Pending)).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request You cannot deactivate yourself");
}

#[test]
fn new_accounts_start_with_the_right_role() {
    assert_eq!(
        initial_role("a@example.com", AccountType::Customer, None, None),
        (Role::Customer, UserStatus::Active)
    );
    assert_eq!(
        initial_role("b@example.com", AccountType::Business, None, None),
        (Role::Business, UserStatus::Pending)
    );
    assert_eq!(
        initial_role(
            "owner@example.com",
            AccountType::Customer,
            Some("owner@example.com"),
            None
        ),
        (Role::Superadmin, UserStatus::Active)
    );

    let invite = staff_invites::Model {
        id: Uuid::new_v4(),
        email: "staff@example.com".to_string(),
        role: Role::Admin,
        invited_by: Uuid::new_v4(),
        created_at: Utc::now().fixed_offset(),
        accepted_at: None,
        accepted_by: None,
    };
    assert_eq!(
        initial_role("staff@example.com", AccountType::Business, None, Some(&invite)),
        (Role::Admin, UserStatus::Active)
    );
}

#[test]
fn password_hashes_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert_ne!(hash, "correct horse");
    assert!(verify_password("correct horse", &hash).unwrap());
    assert!(!verify_password("wrong horse", &hash).unwrap());
}

#[test]
fn inventory_adjustments_stay_in_range() {
    assert_eq!(apply_stock_delta(10, 5).unwrap(), 15);
    assert_eq!(apply_stock_delta(10, -10).unwrap(), 0);

    let err = apply_stock_delta(10, -11).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request stock cannot be negative");
    let err = apply_stock_delta(10, i32::MAX).unwrap_err();
    assert_eq!(err.to_string(), "Bad Request stock is out of range");
    assert!(apply_stock_delta(0, i32::MIN).is_err());
}
