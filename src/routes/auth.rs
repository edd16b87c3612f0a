use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};

use crate::{
    dto::auth::{
        ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest, RouteQuery,
        RouteResolution, UpdateProfileRequest,
    },
    error::AppResult,
    middleware::auth::{MaybeUser, SessionUser},
    models::User,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/profile", patch(update_profile))
        .route("/password", post(change_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Register user", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let resp = auth_service::register_user(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login user", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_user(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current profile, any account status", body = ApiResponse<User>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(
    State(state): State<AppState>,
    session: SessionUser,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::me(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<User>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    session: SessionUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = auth_service::update_profile(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Current password is wrong or new one too short"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    session: SessionUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = auth_service::change_password(&state, &session, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/routes/resolve",
    params(
        ("path" = String, Query, description = "Frontend path, e.g. /admin/orders")
    ),
    responses(
        (status = 200, description = "Access decision for the current viewer", body = ApiResponse<RouteResolution>)
    ),
    tag = "Auth"
)]
pub async fn resolve_route(
    viewer: MaybeUser,
    Query(query): Query<RouteQuery>,
) -> Json<ApiResponse<RouteResolution>> {
    Json(auth_service::resolve_route(&viewer, &query.path))
}
