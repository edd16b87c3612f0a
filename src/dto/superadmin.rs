use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::sea_orm_active_enums::{Role, UserStatus},
    models::{AuditEntry, StaffInvite, User},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInviteRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InviteList {
    pub items: Vec<StaffInvite>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogList {
    pub items: Vec<AuditEntry>,
}
