#![allow(dead_code)]

use furniture_store_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        products::ActiveModel as ProductActive,
        sea_orm_active_enums::{Role, UserStatus},
        users::ActiveModel as UserActive,
    },
    middleware::auth::AuthUser,
    services::auth_service::hash_password,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

/// Database for integration flows, if one is configured.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            None
        }
    }
}

pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url, 1).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE support_ticket_messages, support_tickets, product_requests, staff_invites, \
         order_items, orders, addresses, wishlist_items, cart_items, audit_logs, products, \
         categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig::for_database(database_url, "integration-test-secret");
    Ok(AppState::connect(config).await?)
}

pub async fn create_user(
    state: &AppState,
    email: &str,
    role: Role,
    status: UserStatus,
) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(PASSWORD)?),
        display_name: Set(None),
        phone: Set(None),
        role: Set(role),
        status: Set(status),
        company_name: Set(None),
        gst_number: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some("Solid wood, hand finished".into())),
        category_id: Set(None),
        price: Set(price),
        sale_price: Set(None),
        stock: Set(stock),
        badges: Set(serde_json::json!([])),
        image_url: Set(None),
        material: Set(Some("teak".into())),
        is_active: Set(true),
        created_by: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
