use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::{
        dashboard::SuperadminDashboard,
        superadmin::{AuditLogList, CreateInviteRequest, InviteList, UpdateUserRequest, UserList},
    },
    entity::{
        AuditLogs, Users,
        audit_logs::Column as AuditCol,
        sea_orm_active_enums::{Role, UserStatus},
        staff_invites::{ActiveModel as InviteActive, Column as InviteCol, Entity as StaffInvites},
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_superadmin},
    models::{AuditEntry, StaffInvite, User},
    response::{ApiResponse, Meta},
    routes::params::{AuditLogQuery, Paginated, UserListQuery},
    services::dashboard_service,
    state::AppState,
    validation,
};

/// A superadmin may not strip their own role or leave active status.
pub fn check_self_update(
    actor: Uuid,
    target: Uuid,
    role: Option<Role>,
    status: Option<UserStatus>,
) -> AppResult<()> {
    if actor != target {
        return Ok(());
    }
    if role.is_some_and(|r| r != Role::Superadmin) {
        return Err(AppError::BadRequest("You cannot demote yourself".into()));
    }
    if status.is_some_and(|s| s != UserStatus::Active) {
        return Err(AppError::BadRequest("You cannot deactivate yourself".into()));
    }
    Ok(())
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserListQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_superadmin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(role) = query.role {
        condition = condition.add(UserCol::Role.eq(role));
    }
    if let Some(status) = query.status {
        condition = condition.add(UserCol::Status.eq(status));
    }
    if let Some(search) = query.q.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = validation::contains_pattern(search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(UserCol::Email).ilike(pattern.clone()))
                .add(Expr::col(UserCol::DisplayName).ilike(pattern)),
        );
    }

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::success(
        "Users",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_superadmin(user)?;
    if payload.role.is_none() && payload.status.is_none() {
        return Err(AppError::BadRequest("Nothing to update".into()));
    }
    check_self_update(user.user_id, id, payload.role, payload.status)?;

    let target = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let before = (target.role, target.status);

    let mut active: UserActive = target.into();
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(
        target_id = %updated.id,
        role = updated.role.as_str(),
        status = updated.status.as_str(),
        "user updated"
    );
    audit::record(
        &state.pool,
        user.user_id,
        "user_update",
        "users",
        serde_json::json!({
            "user_id": updated.id,
            "from": { "role": before.0, "status": before.1 },
            "to": { "role": updated.role, "status": updated.status },
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "User updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn create_invite(
    state: &AppState,
    user: &AuthUser,
    payload: CreateInviteRequest,
) -> AppResult<ApiResponse<StaffInvite>> {
    ensure_superadmin(user)?;
    let email = validation::ensure_email(&payload.email)?;

    if Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("A user with this email already exists".into()));
    }
    if StaffInvites::find()
        .filter(InviteCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("This email is already invited".into()));
    }

    let invite = InviteActive {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        role: Set(Role::Admin),
        invited_by: Set(user.user_id),
        created_at: NotSet,
        accepted_at: Set(None),
        accepted_by: Set(None),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "invite_create",
        "staff_invites",
        serde_json::json!({ "invite_id": invite.id, "email": invite.email }),
    )
    .await;

    Ok(ApiResponse::success(
        "Invite created",
        StaffInvite::from(invite),
        Some(Meta::empty()),
    ))
}

pub async fn list_invites(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InviteList>> {
    ensure_superadmin(user)?;
    let items: Vec<StaffInvite> = StaffInvites::find()
        .order_by_desc(InviteCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StaffInvite::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Invites", InviteList { items }, Some(meta)))
}

pub async fn revoke_invite(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;
    let invite = StaffInvites::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if invite.accepted_at.is_some() {
        return Err(AppError::BadRequest("Invite was already accepted".into()));
    }

    let email = invite.email.clone();
    invite.delete(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "invite_revoke",
        "staff_invites",
        serde_json::json!({ "invite_id": id, "email": email }),
    )
    .await;

    Ok(ApiResponse::done("Invite revoked"))
}

pub async fn list_audit_logs(
    state: &AppState,
    user: &AuthUser,
    query: AuditLogQuery,
) -> AppResult<ApiResponse<AuditLogList>> {
    ensure_superadmin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(user_id) = query.user_id {
        condition = condition.add(AuditCol::UserId.eq(user_id));
    }
    if let Some(action) = query.action.as_ref().filter(|a| !a.is_empty()) {
        condition = condition.add(AuditCol::Action.eq(action.as_str()));
    }

    let finder = AuditLogs::find()
        .filter(condition)
        .order_by_desc(AuditCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(AuditEntry::from)
        .collect();

    Ok(ApiResponse::success(
        "Audit log",
        AuditLogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SuperadminDashboard>> {
    ensure_superadmin(user)?;

    let users_by_role = dashboard_service::grouped_counts(
        &state.pool,
        "SELECT role, COUNT(*) FROM users GROUP BY role",
    )
    .await?;
    let users_by_status = dashboard_service::grouped_counts(
        &state.pool,
        "SELECT status, COUNT(*) FROM users GROUP BY status",
    )
    .await?;
    let orders_by_status = dashboard_service::grouped_counts(
        &state.pool,
        "SELECT status, COUNT(*) FROM orders GROUP BY status",
    )
    .await?;

    let pending_business_approvals: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role = 'business' AND status = 'pending'",
    )
    .fetch_one(&state.pool)
    .await?;

    let pending_product_requests: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM product_requests WHERE status = 'pending'",
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(ApiResponse::success(
        "Dashboard",
        SuperadminDashboard {
            users_by_role,
            users_by_status,
            pending_business_approvals,
            pending_product_requests,
            orders_by_status,
        },
        Some(Meta::empty()),
    ))
}
