use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        product_requests::{ApprovedRequest, ProductRequestList, ReviewRequest},
        products::CreateProductRequest,
    },
    entity::{
        product_requests::{ActiveModel, Column, Entity as ProductRequests, Model},
        sea_orm_active_enums::{RequestStatus, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff, ensure_superadmin},
    models::{Product, ProductRequest, badges_from_json},
    response::{ApiResponse, Meta},
    routes::params::{Paginated, RequestListQuery},
    services::product_service::{self, CatalogFields},
    state::AppState,
};

fn review_note(payload: Option<ReviewRequest>) -> Option<String> {
    payload
        .and_then(|r| r.note)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

fn ensure_pending(request: &Model) -> AppResult<()> {
    if request.status != RequestStatus::Pending {
        return Err(AppError::BadRequest(format!(
            "Request was already {}",
            request.status.as_str()
        )));
    }
    Ok(())
}

fn catalog_fields(request: &Model) -> CatalogFields {
    CatalogFields {
        name: request.name.clone(),
        description: request.description.clone(),
        category_id: request.category_id,
        price: request.price,
        sale_price: request.sale_price,
        stock: request.stock,
        badges: badges_from_json(request.badges.clone()),
        image_url: request.image_url.clone(),
        material: request.material.clone(),
    }
}

pub async fn submit(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductRequest>> {
    ensure_staff(user)?;
    let fields = product_service::validate_catalog_fields(payload)?;
    product_service::ensure_category_exists(&state.orm, fields.category_id).await?;

    let request = ActiveModel {
        id: Set(Uuid::new_v4()),
        requested_by: Set(user.user_id),
        name: Set(fields.name),
        description: Set(fields.description),
        category_id: Set(fields.category_id),
        price: Set(fields.price),
        sale_price: Set(fields.sale_price),
        stock: Set(fields.stock),
        badges: Set(serde_json::json!(fields.badges)),
        image_url: Set(fields.image_url),
        material: Set(fields.material),
        status: Set(RequestStatus::Pending),
        review_note: Set(None),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        product_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_request_submit",
        "product_requests",
        serde_json::json!({ "request_id": request.id, "name": request.name }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product request submitted",
        ProductRequest::from(request),
        Some(Meta::empty()),
    ))
}

/// Admins see their own requests, superadmins see every request.
pub async fn list(
    state: &AppState,
    user: &AuthUser,
    query: RequestListQuery,
) -> AppResult<ApiResponse<ProductRequestList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if user.role != Role::Superadmin {
        condition = condition.add(Column::RequestedBy.eq(user.user_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status));
    }

    let finder = ProductRequests::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductRequest::from)
        .collect();

    Ok(ApiResponse::success(
        "Product requests",
        ProductRequestList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn approve(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: Option<ReviewRequest>,
) -> AppResult<ApiResponse<ApprovedRequest>> {
    ensure_superadmin(user)?;

    let txn = state.orm.begin().await?;
    let request = ProductRequests::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_pending(&request)?;

    let fields = catalog_fields(&request);
    product_service::ensure_category_exists(&txn, fields.category_id).await?;
    product_service::ensure_name_available(&txn, &fields.name, None).await?;
    let product = product_service::insert_product(&txn, fields, request.requested_by).await?;

    let mut active: ActiveModel = request.into();
    active.status = Set(RequestStatus::Approved);
    active.product_id = Set(Some(product.id));
    active.review_note = Set(review_note(payload));
    active.reviewed_by = Set(Some(user.user_id));
    active.reviewed_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let request = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(request_id = %request.id, product_id = %product.id, "product request approved");
    audit::record(
        &state.pool,
        user.user_id,
        "product_request_approve",
        "product_requests",
        serde_json::json!({ "request_id": request.id, "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product request approved",
        ApprovedRequest {
            request: ProductRequest::from(request),
            product: Product::from(product),
        },
        Some(Meta::empty()),
    ))
}

pub async fn reject(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: Option<ReviewRequest>,
) -> AppResult<ApiResponse<ProductRequest>> {
    ensure_superadmin(user)?;

    let txn = state.orm.begin().await?;
    let request = ProductRequests::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_pending(&request)?;

    let mut active: ActiveModel = request.into();
    active.status = Set(RequestStatus::Rejected);
    active.review_note = Set(review_note(payload));
    active.reviewed_by = Set(Some(user.user_id));
    active.reviewed_at = Set(Some(Utc::now().into()));
    active.updated_at = Set(Utc::now().into());
    let request = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_request_reject",
        "product_requests",
        serde_json::json!({ "request_id": request.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product request rejected",
        ProductRequest::from(request),
        Some(Meta::empty()),
    ))
}
