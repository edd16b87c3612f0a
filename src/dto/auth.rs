use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    access::RouteDecision,
    entity::sea_orm_active_enums::{Role, UserStatus},
    models::User,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Customer,
    Business,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub account_type: AccountType,
    pub company_name: Option<String>,
    pub gst_number: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    /// Where the frontend should land after sign-in.
    pub redirect_to: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub gst_number: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RouteQuery {
    pub path: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RouteResolution {
    pub path: String,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub decision: RouteDecision,
}
