use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    access::home_for,
    audit,
    dto::auth::{
        AccountType, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
        RouteResolution, UpdateProfileRequest,
    },
    entity::{
        sea_orm_active_enums::{Role, UserStatus},
        staff_invites::{self, Column as InviteCol, Entity as StaffInvites},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{MaybeUser, SessionUser, issue_token},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Role and status a new account starts with.
pub fn initial_role(
    email: &str,
    account_type: AccountType,
    superadmin_email: Option<&str>,
    invite: Option<&staff_invites::Model>,
) -> (Role, UserStatus) {
    if superadmin_email.is_some_and(|s| s == email) {
        return (Role::Superadmin, UserStatus::Active);
    }
    if let Some(invite) = invite {
        return (invite.role, UserStatus::Active);
    }
    match account_type {
        AccountType::Business => (Role::Business, UserStatus::Pending),
        AccountType::Customer => (Role::Customer, UserStatus::Active),
    }
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let email = validation::ensure_email(&payload.email)?;
    validation::ensure_password(&payload.password)?;
    let phone = payload
        .phone
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(validation::ensure_phone)
        .transpose()?;

    let (company_name, gst_number) = match payload.account_type {
        AccountType::Business => {
            let company = validation::ensure_present(
                "company_name",
                payload.company_name.as_deref().unwrap_or_default(),
            )?;
            let gst = validation::ensure_gst(payload.gst_number.as_deref().unwrap_or_default())?;
            (Some(company), Some(gst))
        }
        AccountType::Customer => (payload.company_name, None),
    };

    let txn = state.orm.begin().await?;

    let exists = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&txn)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("Email is already taken".to_string()));
    }

    let invite = StaffInvites::find()
        .filter(InviteCol::Email.eq(email.as_str()))
        .filter(InviteCol::AcceptedAt.is_null())
        .one(&txn)
        .await?;

    let (role, status) = initial_role(
        &email,
        payload.account_type,
        state.config.superadmin_email.as_deref(),
        invite.as_ref(),
    );

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        display_name: Set(payload.display_name.filter(|n| !n.trim().is_empty())),
        phone: Set(phone),
        role: Set(role),
        status: Set(status),
        company_name: Set(company_name),
        gst_number: Set(gst_number),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    if let Some(invite) = invite {
        let mut active = invite.into_active_model();
        active.accepted_at = Set(Some(Utc::now().into()));
        active.accepted_by = Set(Some(user.id));
        active.update(&txn).await?;
    }

    txn.commit().await?;

    tracing::info!(
        user_id = %user.id,
        role = user.role.as_str(),
        status = user.status.as_str(),
        "user registered"
    );
    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role.as_str() }),
    )
    .await;

    let message = match user.status {
        UserStatus::Pending => "Registration received, awaiting approval",
        _ => "User created",
    };
    Ok(ApiResponse::success(message, User::from(user), Some(Meta::empty())))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = validation::normalize_email(&payload.email);
    let user = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .one(&state.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(&state.config, user.id, user.role)?;
    let redirect_to = match user.status {
        UserStatus::Active => home_for(user.role),
        UserStatus::Pending => crate::access::PENDING_PATH,
        UserStatus::Rejected => crate::access::REJECTED_PATH,
    }
    .to_string();

    audit::record(
        &state.pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        token: format!("Bearer {}", token),
        user: User::from(user),
        redirect_to,
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn me(state: &AppState, session: &SessionUser) -> AppResult<ApiResponse<User>> {
    let user = Users::find_by_id(session.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", User::from(user), Some(Meta::empty())))
}

pub async fn update_profile(
    state: &AppState,
    session: &SessionUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    let existing = Users::find_by_id(session.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_business = existing.role == Role::Business;
    let current_gst = existing.gst_number.clone();
    let mut active: users::ActiveModel = existing.into();

    if let Some(name) = payload.display_name {
        let name = name.trim().to_string();
        active.display_name = Set((!name.is_empty()).then_some(name));
    }
    if let Some(phone) = payload.phone {
        let phone = if phone.trim().is_empty() {
            None
        } else {
            Some(validation::ensure_phone(&phone)?)
        };
        active.phone = Set(phone);
    }
    if let Some(company) = payload.company_name {
        if is_business {
            active.company_name = Set(Some(validation::ensure_present("company_name", &company)?));
        } else {
            let company = company.trim().to_string();
            active.company_name = Set((!company.is_empty()).then_some(company));
        }
    }
    if let Some(gst) = payload.gst_number {
        if !is_business {
            return Err(AppError::BadRequest(
                "Only business accounts carry a GST number".into(),
            ));
        }
        let gst = validation::ensure_gst(&gst)?;
        // A changed GSTIN has to be verified again.
        if current_gst.as_deref() != Some(gst.as_str()) {
            active.status = Set(UserStatus::Pending);
        }
        active.gst_number = Set(Some(gst));
    }
    active.updated_at = Set(Utc::now().into());

    let user = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.id,
        "profile_update",
        "users",
        serde_json::json!({ "user_id": user.id, "status": user.status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success("Profile updated", User::from(user), Some(Meta::empty())))
}

pub async fn change_password(
    state: &AppState,
    session: &SessionUser,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    validation::ensure_password(&payload.new_password)?;

    let existing = Users::find_by_id(session.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if !verify_password(&payload.current_password, &existing.password_hash)? {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }

    let mut active: users::ActiveModel = existing.into();
    active.password_hash = Set(hash_password(&payload.new_password)?);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        session.user_id,
        "password_change",
        "users",
        serde_json::json!({ "user_id": session.user_id }),
    )
    .await;

    Ok(ApiResponse::done("Password changed"))
}

pub fn resolve_route(viewer: &MaybeUser, path: &str) -> ApiResponse<RouteResolution> {
    let session = viewer.0.as_ref();
    let decision = crate::access::resolve_route(session.map(SessionUser::viewer), path);
    ApiResponse::success(
        "OK",
        RouteResolution {
            path: path.to_string(),
            role: session.map(|s| s.role),
            status: session.map(|s| s.status),
            decision,
        },
        Some(Meta::empty()),
    )
}

