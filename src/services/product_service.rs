use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::{
        Categories,
        products::{ActiveModel, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, MaybeUser, ensure_staff},
    models::{PricedProduct, Product},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{Paginated, ProductQuery, ProductSortBy, SortOrder},
    services::category_service,
    state::AppState,
};

/// Catalog fields after validation: trimmed name, clean badges.
#[derive(Debug, Clone)]
pub struct CatalogFields {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub stock: i32,
    pub badges: Vec<String>,
    pub image_url: Option<String>,
    pub material: Option<String>,
}

pub fn clean_badges(badges: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(badges.len());
    for badge in badges {
        let badge = badge.trim().to_lowercase();
        if !badge.is_empty() && !cleaned.contains(&badge) {
            cleaned.push(badge);
        }
    }
    cleaned
}

fn check_prices(price: i64, sale_price: Option<i64>, stock: i32) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    if price > pricing::MAX_PRICE {
        return Err(AppError::BadRequest(format!(
            "price must not exceed {}",
            pricing::MAX_PRICE
        )));
    }
    if let Some(sale) = sale_price {
        if sale <= 0 || sale >= price {
            return Err(AppError::BadRequest(
                "sale_price must be greater than 0 and below price".into(),
            ));
        }
    }
    if stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_catalog_fields(payload: CreateProductRequest) -> AppResult<CatalogFields> {
    let name = crate::validation::ensure_present("name", &payload.name)?;
    check_prices(payload.price, payload.sale_price, payload.stock)?;
    Ok(CatalogFields {
        name,
        description: payload.description,
        category_id: payload.category_id,
        price: payload.price,
        sale_price: payload.sale_price,
        stock: payload.stock,
        badges: clean_badges(payload.badges),
        image_url: payload.image_url,
        material: payload.material,
    })
}

pub async fn ensure_category_exists<C: ConnectionTrait>(
    conn: &C,
    category_id: Option<Uuid>,
) -> AppResult<()> {
    if let Some(id) = category_id {
        if Categories::find_by_id(id).one(conn).await?.is_none() {
            return Err(AppError::BadRequest("category not found".into()));
        }
    }
    Ok(())
}

pub async fn ensure_name_available<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("A product named {name} already exists")));
    }
    Ok(())
}

/// Insert a product from validated fields on any connection or transaction.
pub async fn insert_product<C: ConnectionTrait>(
    conn: &C,
    fields: CatalogFields,
    created_by: Uuid,
) -> AppResult<crate::entity::products::Model> {
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(fields.name),
        description: Set(fields.description),
        category_id: Set(fields.category_id),
        price: Set(fields.price),
        sale_price: Set(fields.sale_price),
        stock: Set(fields.stock),
        badges: Set(serde_json::json!(fields.badges)),
        image_url: Set(fields.image_url),
        material: Set(fields.material),
        is_active: Set(true),
        created_by: Set(Some(created_by)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(product)
}

pub async fn list_products(
    state: &AppState,
    viewer: &MaybeUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if !viewer.is_staff() {
        condition = condition.add(Column::IsActive.eq(true));
    }

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = crate::validation::contains_pattern(search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }

    if let Some(slug) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let category = category_service::find_category(state, slug)
            .await?
            .ok_or(AppError::NotFound)?;
        condition = condition.add(Column::CategoryId.eq(category.id));
    }

    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    match query.on_sale {
        Some(true) => {
            condition = condition.add(Column::SalePrice.is_not_null()).add(
                Expr::col(Column::SalePrice).lt(Expr::col(Column::Price)),
            );
        }
        Some(false) => {
            condition = condition.add(
                Condition::any()
                    .add(Column::SalePrice.is_null())
                    .add(Expr::col(Column::SalePrice).gte(Expr::col(Column::Price))),
            );
        }
        None => {}
    }

    match query.in_stock {
        Some(true) => condition = condition.add(Column::Stock.gt(0)),
        Some(false) => condition = condition.add(Column::Stock.lte(0)),
        None => {}
    }

    if let Some(badge) = query.badge.as_ref().filter(|b| !b.trim().is_empty()) {
        let needle = serde_json::json!([badge.trim().to_lowercase()]).to_string();
        condition = condition.add(Expr::cust_with_values("badges @> ?::jsonb", [needle]));
    }

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let tier = viewer.price_tier();
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| PricedProduct::new(Product::from(model), tier))
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    viewer: &MaybeUser,
    id: Uuid,
) -> AppResult<ApiResponse<PricedProduct>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .filter(|p| p.is_active || viewer.is_staff())
        .ok_or(AppError::NotFound)?;
    let priced = PricedProduct::new(Product::from(product), viewer.price_tier());
    Ok(ApiResponse::success("Product", priced, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let fields = validate_catalog_fields(payload)?;
    ensure_category_exists(&state.orm, fields.category_id).await?;
    ensure_name_available(&state.orm, &fields.name, None).await?;

    let product = insert_product(&state.orm, fields, user.user_id).await?;

    tracing::info!(product_id = %product.id, user_id = %user.user_id, "product created");
    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let price = payload.price.unwrap_or(existing.price);
    let sale_price = match payload.sale_price {
        Some(0) => None,
        Some(sale) => Some(sale),
        None => existing.sale_price,
    };
    let stock = payload.stock.unwrap_or(existing.stock);
    check_prices(price, sale_price, stock)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = crate::validation::ensure_present("name", &name)?;
        ensure_name_available(&txn, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(category_id) = payload.category_id {
        ensure_category_exists(&txn, Some(category_id)).await?;
        active.category_id = Set(Some(category_id));
    }
    if let Some(badges) = payload.badges {
        active.badges = Set(serde_json::json!(clean_badges(badges)));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url));
    }
    if let Some(material) = payload.material {
        active.material = Set(Some(material));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    // untouched columns stay Unchanged and are not written back
    if payload.price.is_some() {
        active.price = Set(price);
    }
    if payload.sale_price.is_some() {
        active.sale_price = Set(sale_price);
    }
    if payload.stock.is_some() {
        active.stock = Set(stock);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

/// Products that have been ordered are retired (hidden) instead of deleted so
/// order history keeps its references.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let ordered = crate::entity::OrderItems::find()
        .filter(crate::entity::order_items::Column::ProductId.eq(id))
        .count(&state.orm)
        .await?;

    let message = if ordered > 0 {
        let mut active: ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?;
        "Product retired"
    } else {
        Products::delete_by_id(id).exec(&state.orm).await?;
        "Deleted"
    };

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id, "retired": ordered > 0 }),
    )
    .await;

    Ok(ApiResponse::done(message))
}
