use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        product_requests::{ApprovedRequest, ProductRequestList, ReviewRequest},
        products::CreateProductRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::ProductRequest,
    response::ApiResponse,
    routes::params::RequestListQuery,
    services::product_request_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(submit_request))
        .route("/{id}/approve", post(approve_request))
        .route("/{id}/reject", post(reject_request))
}

/// The review note body is optional; an empty body means no note.
fn review_body(body: &Bytes) -> AppResult<Option<ReviewRequest>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Invalid review body: {e}")))
}

#[utoipa::path(
    post,
    path = "/api/product-requests",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Request submitted for review", body = ApiResponse<ProductRequest>),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Product Requests"
)]
pub async fn submit_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductRequest>>)> {
    let resp = product_request_service::submit(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/product-requests",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "pending, approved or rejected")
    ),
    responses(
        (status = 200, description = "Own requests for admins, every request for superadmins", body = ApiResponse<ProductRequestList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Product Requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<ApiResponse<ProductRequestList>>> {
    let resp = product_request_service::list(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product-requests/{id}/approve",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body(content = ReviewRequest, description = "Optional review note"),
    responses(
        (status = 200, description = "Approved and published as a product", body = ApiResponse<ApprovedRequest>),
        (status = 400, description = "Request already reviewed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Product name taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Product Requests"
)]
pub async fn approve_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ApprovedRequest>>> {
    let review = review_body(&body)?;
    let resp = product_request_service::approve(&state, &user, id, review).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product-requests/{id}/reject",
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body(content = ReviewRequest, description = "Optional review note"),
    responses(
        (status = 200, description = "Rejected", body = ApiResponse<ProductRequest>),
        (status = 400, description = "Request already reviewed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Product Requests"
)]
pub async fn reject_request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ProductRequest>>> {
    let review = review_body(&body)?;
    let resp = product_request_service::reject(&state, &user, id, review).await?;
    Ok(Json(resp))
}
