mod common;

use furniture_store_api::{
    dto::{
        addresses::AddressRequest,
        auth::{ChangePasswordRequest, LoginRequest, UpdateProfileRequest},
        cart::{AddToCartRequest, UpdateCartItemRequest},
        orders::CheckoutRequest,
        wishlist::AddWishlistRequest,
    },
    entity::sea_orm_active_enums::{PaymentMethod, Role, UserStatus},
    error::AppError,
    middleware::auth::SessionUser,
    routes::params::AuditLogQuery,
    services::{
        address_service, auth_service, cart_service, dashboard_service, order_service,
        superadmin_service, wishlist_service,
    },
};
use uuid::Uuid;

fn address(label: &str, city: &str, is_default: bool) -> AddressRequest {
    AddressRequest {
        label: label.into(),
        full_name: "Meera Iyer".into(),
        phone: "9876543210".into(),
        line1: "4 Lake View Road".into(),
        line2: None,
        city: city.into(),
        state: "Tamil Nadu".into(),
        postal_code: "600001".into(),
        country: None,
        is_default,
    }
}

// A shopper manages their address book, profile, cart and wishlist, then reads their dashboard.
#[tokio::test]
async fn shopper_account_management_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let owner =
        common::create_user(&state, "owner@example.com", Role::Superadmin, UserStatus::Active).await?;
    let customer =
        common::create_user(&state, "meera@example.com", Role::Customer, UserStatus::Active).await?;
    let session = SessionUser {
        user_id: customer.user_id,
        role: Role::Customer,
        status: UserStatus::Active,
    };

    // The first address is the default even when not asked for
    let home = address_service::create_address(&state, &customer, address("Home", "Chennai", false))
        .await?
        .data
        .unwrap();
    assert!(home.is_default);
    let office = address_service::create_address(&state, &customer, address("Office", "Chennai", false))
        .await?
        .data
        .unwrap();
    assert!(!office.is_default);
    let cottage = address_service::create_address(&state, &customer, address("Cottage", "Ooty", false))
        .await?
        .data
        .unwrap();

    let updated = address_service::update_address(
        &state,
        &customer,
        office.id,
        address("Office", "Coimbatore", false),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.city, "Coimbatore");
    assert!(!updated.is_default);

    // Moving the default leaves exactly one default
    address_service::set_default(&state, &customer, office.id).await?;
    let book = address_service::list_addresses(&state, &customer).await?.data.unwrap();
    let defaults: Vec<_> = book.items.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].id, office.id);

    // The database refuses a second default outright
    let second_default = sqlx::query(
        "INSERT INTO addresses (id, user_id, label, full_name, phone, line1, city, state, postal_code, is_default) \
         VALUES ($1, $2, 'Spare', 'Meera Iyer', '9876543210', '1 Beach Road', 'Chennai', 'Tamil Nadu', '600001', TRUE)",
    )
    .bind(Uuid::new_v4())
    .bind(customer.user_id)
    .execute(&state.pool)
    .await;
    assert!(second_default.is_err());

    // Racing default switches settle on one of them
    let switches = [home.id, cottage.id].map(|id| {
        let state = state.clone();
        let customer = customer.clone();
        tokio::spawn(async move { address_service::set_default(&state, &customer, id).await })
    });
    for switch in switches {
        switch.await??;
    }
    let book = address_service::list_addresses(&state, &customer).await?.data.unwrap();
    assert_eq!(book.items.iter().filter(|a| a.is_default).count(), 1);
    address_service::set_default(&state, &customer, office.id).await?;

    // Unsetting the flag through an update keeps the default in place
    let kept = address_service::update_address(
        &state,
        &customer,
        office.id,
        address("Office", "Coimbatore", false),
    )
    .await?
    .data
    .unwrap();
    assert!(kept.is_default);

    let defaults_set = superadmin_service::list_audit_logs(
        &state,
        &owner,
        AuditLogQuery {
            page: None,
            per_page: None,
            user_id: Some(customer.user_id),
            action: Some("address_set_default".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(defaults_set.items.len(), 4);
    assert!(defaults_set.items.iter().any(|entry| {
        entry.metadata.as_ref().and_then(|m| m.get("address_id")) == Some(&serde_json::json!(office.id))
    }));

    // Deleting the default promotes the oldest remaining address
    address_service::delete_address(&state, &customer, office.id).await?;
    let book = address_service::list_addresses(&state, &customer).await?.data.unwrap();
    assert_eq!(book.items.len(), 2);
    let promoted: Vec<_> = book.items.iter().filter(|a| a.is_default).collect();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].id, home.id);

    // Other shoppers cannot touch the address book
    let stranger =
        common::create_user(&state, "stranger@example.com", Role::Customer, UserStatus::Active).await?;
    assert!(matches!(
        address_service::set_default(&state, &stranger, cottage.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        address_service::delete_address(&state, &stranger, cottage.id).await,
        Err(AppError::NotFound)
    ));

    // Profile edits
    let profile = auth_service::update_profile(
        &state,
        &session,
        UpdateProfileRequest {
            display_name: Some("  Meera  ".into()),
            phone: Some("+91 98765 43210".into()),
            company_name: None,
            gst_number: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(profile.display_name.as_deref(), Some("Meera"));
    assert_eq!(profile.status, UserStatus::Active);
    assert!(matches!(
        auth_service::update_profile(
            &state,
            &session,
            UpdateProfileRequest {
                display_name: None,
                phone: None,
                company_name: None,
                gst_number: Some("27ABCDE1234F1Z5".into()),
            },
        )
        .await,
        Err(AppError::BadRequest(_))
    ));

    // A business buyer changing their GSTIN goes back to review
    let buyer = common::create_user(&state, "buyer@example.com", Role::Business, UserStatus::Active).await?;
    let buyer_session = SessionUser {
        user_id: buyer.user_id,
        role: Role::Business,
        status: UserStatus::Active,
    };
    let reverified = auth_service::update_profile(
        &state,
        &buyer_session,
        UpdateProfileRequest {
            display_name: None,
            phone: None,
            company_name: Some("Teak House".into()),
            gst_number: Some("29abcde1234f1z5".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(reverified.status, UserStatus::Pending);
    assert_eq!(reverified.gst_number.as_deref(), Some("29ABCDE1234F1Z5"));

    // Password change needs the current password and takes effect at login
    assert!(matches!(
        auth_service::change_password(
            &state,
            &session,
            ChangePasswordRequest {
                current_password: "not-my-password".into(),
                new_password: "fresh-secret-42".into(),
            },
        )
        .await,
        Err(AppError::BadRequest(_))
    ));
    auth_service::change_password(
        &state,
        &session,
        ChangePasswordRequest {
            current_password: common::PASSWORD.into(),
            new_password: "fresh-secret-42".into(),
        },
    )
    .await?;
    assert!(
        auth_service::login_user(
            &state,
            LoginRequest {
                email: "meera@example.com".into(),
                password: common::PASSWORD.into(),
            },
        )
        .await
        .is_err()
    );
    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "meera@example.com".into(),
            password: "fresh-secret-42".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(login.user.id, customer.user_id);

    // Cart edits
    let sideboard = common::create_product(&state, "Sheesham Sideboard", 5_000, 10).await?;
    let stool = common::create_product(&state, "Rattan Stool", 3_000, 10).await?;
    let lamp = common::create_product(&state, "Brass Floor Lamp", 2_500, 10).await?;
    for product_id in [sideboard, stool, lamp] {
        cart_service::add_to_cart(
            &state,
            &customer,
            AddToCartRequest {
                product_id,
                quantity: 1,
            },
        )
        .await?;
    }

    let line = cart_service::update_quantity(
        &state,
        &customer,
        sideboard,
        UpdateCartItemRequest { quantity: 2 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(line.quantity, 2);
    assert!(matches!(
        cart_service::update_quantity(&state, &customer, sideboard, UpdateCartItemRequest { quantity: 0 })
            .await,
        Err(AppError::BadRequest(_))
    ));

    cart_service::remove_from_cart(&state, &customer, lamp).await?;
    assert!(matches!(
        cart_service::remove_from_cart(&state, &customer, lamp).await,
        Err(AppError::NotFound)
    ));
    let cart = cart_service::list_cart(&state, &customer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.total, 13_000);

    cart_service::clear_cart(&state, &customer).await?;
    let cart = cart_service::list_cart(&state, &customer).await?.data.unwrap();
    assert!(cart.items.is_empty());

    // Wishlist removal
    for product_id in [stool, lamp] {
        wishlist_service::add_to_wishlist(&state, &customer, AddWishlistRequest { product_id }).await?;
    }
    wishlist_service::remove_from_wishlist(&state, &customer, lamp).await?;
    assert!(matches!(
        wishlist_service::remove_from_wishlist(&state, &customer, lamp).await,
        Err(AppError::NotFound)
    ));

    // One order placed, one line left in the cart
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: sideboard,
            quantity: 2,
        },
    )
    .await?;
    order_service::checkout(
        &state,
        &customer,
        CheckoutRequest {
            address_id: Some(cottage.id),
            shipping_address: None,
            payment_method: PaymentMethod::Card,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            product_id: stool,
            quantity: 1,
        },
    )
    .await?;

    let dashboard = dashboard_service::customer_dashboard(&state, &customer)
        .await?
        .data
        .unwrap();
    assert_eq!(dashboard.orders_by_status.get("processing"), Some(&1));
    assert_eq!(dashboard.total_spent, 10_000);
    assert_eq!(dashboard.cart_items, 1);
    assert_eq!(dashboard.cart_total, 3_000);
    assert_eq!(dashboard.wishlist_items, 1);
    assert_eq!(dashboard.open_tickets, 0);

    Ok(())
}
