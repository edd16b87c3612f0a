use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::support::{
        OpenTicketRequest, PostMessageRequest, TicketList, TicketWithMessages,
        UpdateTicketStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{SupportTicket, TicketMessage},
    response::ApiResponse,
    routes::params::TicketListQuery,
    services::support_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tickets).post(open_ticket))
        .route("/{id}", get(get_ticket))
        .route("/{id}/messages", post(post_message))
        .route("/{id}/status", patch(update_status))
}

#[utoipa::path(
    post,
    path = "/api/support/tickets",
    request_body = OpenTicketRequest,
    responses(
        (status = 201, description = "Ticket opened with its first message", body = ApiResponse<TicketWithMessages>),
        (status = 400, description = "Validation failed or order not owned"),
        (status = 403, description = "Staff cannot open tickets")
    ),
    security(("bearer_auth" = [])),
    tag = "Support"
)]
pub async fn open_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OpenTicketRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TicketWithMessages>>)> {
    let resp = support_service::open_ticket(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/support/tickets",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "open, in_progress, resolved or closed")
    ),
    responses(
        (status = 200, description = "Own tickets for customers, every ticket for staff", body = ApiResponse<TicketList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Support"
)]
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TicketListQuery>,
) -> AppResult<Json<ApiResponse<TicketList>>> {
    let resp = support_service::list_tickets(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/support/tickets/{id}",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket with its conversation", body = ApiResponse<TicketWithMessages>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Support"
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TicketWithMessages>>> {
    let resp = support_service::get_ticket(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/support/tickets/{id}/messages",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = ApiResponse<TicketMessage>),
        (status = 400, description = "Ticket closed or empty body"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Support"
)]
pub async fn post_message(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<TicketMessage>>)> {
    let resp = support_service::post_message(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/support/tickets/{id}/status",
    params(("id" = Uuid, Path, description = "Ticket ID")),
    request_body = UpdateTicketStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<SupportTicket>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Support"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTicketStatusRequest>,
) -> AppResult<Json<ApiResponse<SupportTicket>>> {
    let resp = support_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
