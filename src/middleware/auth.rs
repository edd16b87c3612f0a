use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::EntityTrait;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::Claims,
    entity::{
        Users,
        sea_orm_active_enums::{Role, UserStatus},
    },
    error::{AppError, AppResult},
    pricing::PriceTier,
    state::AppState,
};

/// A signed-in account in any status. Role and status are read from the
/// database on every request so approvals take effect without a new token.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub role: Role,
    pub status: UserStatus,
}

/// A signed-in account whose status is `active`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Optional session, for endpoints whose output depends on the viewer.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

impl SessionUser {
    pub fn viewer(&self) -> (Role, UserStatus) {
        (self.role, self.status)
    }
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn price_tier(&self) -> PriceTier {
        PriceTier::for_viewer(Some((self.role, UserStatus::Active)))
    }
}

impl MaybeUser {
    pub fn price_tier(&self) -> PriceTier {
        PriceTier::for_viewer(self.0.as_ref().map(SessionUser::viewer))
    }

    pub fn is_staff(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(|u| u.status == UserStatus::Active && u.role.is_staff())
    }
}

pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.role.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_superadmin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Superadmin)
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, role: Role) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        role: role.as_str().to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn decode_token(config: &AppConfig, token: &str) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    Ok(decoded.claims)
}

fn bearer_token(parts: &Parts) -> AppResult<Option<&str>> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;

    Ok(Some(token.trim()))
}

async fn load_session(state: &AppState, token: &str) -> AppResult<SessionUser> {
    let claims = decode_token(&state.config, token)?;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    let user = Users::find_by_id(user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".into()))?;

    Ok(SessionUser {
        user_id: user.id,
        role: user.role,
        status: user.status,
    })
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        load_session(state, token).await
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = SessionUser::from_request_parts(parts, state).await?;
        if session.status != UserStatus::Active {
            tracing::debug!(
                user_id = %session.user_id,
                status = session.status.as_str(),
                "inactive account rejected"
            );
            return Err(AppError::Forbidden);
        }
        Ok(AuthUser {
            user_id: session.user_id,
            role: session.role,
        })
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => Ok(MaybeUser(Some(load_session(state, token).await?))),
            None => Ok(MaybeUser(None)),
        }
    }
}
