use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        dashboard::SuperadminDashboard,
        superadmin::{AuditLogList, CreateInviteRequest, InviteList, UpdateUserRequest, UserList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{StaffInvite, User},
    response::ApiResponse,
    routes::params::{AuditLogQuery, UserListQuery},
    services::superadmin_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/users", get(list_users))
        .route("/users/{id}", patch(update_user))
        .route("/invites", get(list_invites).post(create_invite))
        .route("/invites/{id}", delete(revoke_invite))
        .route("/audit-logs", get(list_audit_logs))
}

#[utoipa::path(
    get,
    path = "/api/superadmin/dashboard",
    responses(
        (status = 200, description = "Platform overview", body = ApiResponse<SuperadminDashboard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SuperadminDashboard>>> {
    let resp = superadmin_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/superadmin/users",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("role" = Option<String>, Query, description = "customer, business, admin or superadmin"),
        ("status" = Option<String>, Query, description = "active, pending or rejected"),
        ("q" = Option<String>, Query, description = "Search email or display name")
    ),
    responses(
        (status = 200, description = "Users", body = ApiResponse<UserList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = superadmin_service::list_users(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/superadmin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Role or status changed", body = ApiResponse<User>),
        (status = 400, description = "Self demotion or deactivation"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = superadmin_service::update_user(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/superadmin/invites",
    request_body = CreateInviteRequest,
    responses(
        (status = 201, description = "Admin invite created", body = ApiResponse<StaffInvite>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already invited or registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn create_invite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateInviteRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StaffInvite>>)> {
    let resp = superadmin_service::create_invite(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/superadmin/invites",
    responses(
        (status = 200, description = "Invites, newest first", body = ApiResponse<InviteList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn list_invites(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InviteList>>> {
    let resp = superadmin_service::list_invites(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/superadmin/invites/{id}",
    params(("id" = Uuid, Path, description = "Invite ID")),
    responses(
        (status = 200, description = "Invite revoked", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Invite already accepted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn revoke_invite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = superadmin_service::revoke_invite(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/superadmin/audit-logs",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("user_id" = Option<Uuid>, Query, description = "Only entries by this user"),
        ("action" = Option<String>, Query, description = "Exact action name, e.g. checkout")
    ),
    responses(
        (status = 200, description = "Audit trail, newest first", body = ApiResponse<AuditLogList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Superadmin"
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> AppResult<Json<ApiResponse<AuditLogList>>> {
    let resp = superadmin_service::list_audit_logs(&state, &user, query).await?;
    Ok(Json(resp))
}
