use furniture_store_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::auth_service::hash_password,
    validation::slugify,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    // Ensure migrations are applied.
    let orm = create_orm_conn(&config.database_url, 1).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url, 2).await?;

    let superadmin_email = config
        .superadmin_email
        .clone()
        .unwrap_or_else(|| "owner@example.com".to_string());
    let owner_id = ensure_user(&pool, &superadmin_email, "owner123", "superadmin", None).await?;
    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "admin", None).await?;
    let customer_id =
        ensure_user(&pool, "customer@example.com", "customer123", "customer", None).await?;
    let business_id = ensure_user(
        &pool,
        "buyer@example.com",
        "business123",
        "business",
        Some(("Sharma Interiors Pvt Ltd", "27ABCDE1234F1Z5")),
    )
    .await?;

    seed_catalog(&pool, owner_id).await?;

    println!(
        "Seed completed. Superadmin: {owner_id}, Admin: {admin_id}, Customer: {customer_id}, Business: {business_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
    business: Option<(&str, &str)>,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let (company, gst) = business.unzip();

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role, status, company_name, gst_number)
        VALUES ($1, $2, $3, $4, 'active', $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, status = 'active'
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(company)
    .bind(gst)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, description: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name, slug, description)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slugify(name))
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool, created_by: Uuid) -> anyhow::Result<()> {
    let living = ensure_category(pool, "Living Room", "Sofas, coffee tables and TV units").await?;
    let bedroom = ensure_category(pool, "Bedroom", "Beds, wardrobes and side tables").await?;
    let dining = ensure_category(pool, "Dining", "Dining sets and sideboards").await?;
    let office = ensure_category(pool, "Home Office", "Desks and ergonomic chairs").await?;

    // (name, description, category, price, sale_price, stock, comma-separated badges, material)
    let products: Vec<(&str, &str, Uuid, i64, Option<i64>, i32, &str, &str)> = vec![
        ("Aranya Three Seater Sofa", "Deep-seat sofa with removable covers", living, 4_599_900, Some(3_999_900), 12, "bestseller", "Sheesham wood"),
        ("Kaveri Coffee Table", "Low table with a storage shelf", living, 1_249_900, None, 25, "new", "Mango wood"),
        ("Nila King Bed", "Hydraulic storage king bed", bedroom, 5_499_900, Some(4_899_900), 6, "bestseller,sale", "Engineered wood"),
        ("Saanjh Bedside Table", "Two-drawer bedside table", bedroom, 699_900, None, 40, "", "Teak veneer"),
        ("Utsav Six Seater Dining Set", "Table with six cushioned chairs", dining, 6_299_900, None, 4, "premium", "Solid acacia"),
        ("Kriti Study Desk", "Desk with cable tray", office, 1_599_900, Some(1_399_900), 18, "new", "Plywood"),
        ("Dhruv Ergonomic Chair", "Mesh chair with lumbar support", office, 1_899_900, None, 3, "", "Mesh and steel"),
    ];

    for (name, desc, category_id, price, sale_price, stock, badges, material) in products {
        let badges: Vec<&str> = badges.split(',').filter(|b| !b.is_empty()).collect();
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, category_id, price, sale_price, stock, badges, material, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(category_id)
        .bind(price)
        .bind(sale_price)
        .bind(stock)
        .bind(serde_json::json!(badges))
        .bind(material)
        .bind(created_by)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
