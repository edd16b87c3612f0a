use axum::{Json, extract::State};

use crate::{
    dto::dashboard::CustomerDashboard, error::AppResult, middleware::auth::AuthUser,
    response::ApiResponse, services::dashboard_service, state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Orders, cart, wishlist and tickets at a glance", body = ApiResponse<CustomerDashboard>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn customer_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CustomerDashboard>>> {
    let resp = dashboard_service::customer_dashboard(&state, &user).await?;
    Ok(Json(resp))
}
