use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::addresses::{AddressList, AddressRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Address,
    response::ApiResponse,
    services::address_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/{id}", put(update_address).delete(delete_address))
        .route("/{id}/default", post(set_default))
}

#[utoipa::path(
    get,
    path = "/api/addresses",
    responses((status = 200, description = "Saved addresses, default first", body = ApiResponse<AddressList>)),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<AddressList>>> {
    let resp = address_service::list_addresses(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = AddressRequest,
    responses(
        (status = 201, description = "Address saved", body = ApiResponse<Address>),
        (status = 400, description = "Invalid phone or PIN code")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddressRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Address>>)> {
    let resp = address_service::create_address(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = AddressRequest,
    responses(
        (status = 200, description = "Address updated", body = ApiResponse<Address>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddressRequest>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::update_address(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/addresses/{id}/default",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address is now the default", body = ApiResponse<Address>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn set_default(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Address>>> {
    let resp = address_service::set_default(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = address_service::delete_address(&state, &user, id).await?;
    Ok(Json(resp))
}
