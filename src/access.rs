//! Storefront routing table and the role/status redirect rules applied to it.
//!
//! The frontend asks `resolve_route` where a viewer may go; the same role
//! checks back the API guards in `middleware::auth`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::entity::sea_orm_active_enums::{Role, UserStatus};

pub const LOGIN_PATH: &str = "/login";
pub const PENDING_PATH: &str = "/pending-approval";
pub const REJECTED_PATH: &str = "/account-rejected";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteAccess {
    /// Anyone, signed in or not.
    Public,
    /// Sign-in and sign-up pages; signed-in viewers are sent home.
    GuestOnly,
    /// Any signed-in account in good standing.
    Authenticated,
    /// Admins and superadmins.
    Staff,
    SuperAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow,
    Redirect { to: String },
    NotFound,
}

impl RouteDecision {
    fn redirect(to: &str) -> Self {
        RouteDecision::Redirect { to: to.to_string() }
    }
}

pub const ROUTES: &[(&str, RouteAccess)] = &[
    ("/", RouteAccess::Public),
    ("/products", RouteAccess::Public),
    ("/products/:id", RouteAccess::Public),
    ("/categories/:slug", RouteAccess::Public),
    ("/about", RouteAccess::Public),
    ("/contact", RouteAccess::Public),
    ("/login", RouteAccess::GuestOnly),
    ("/register", RouteAccess::GuestOnly),
    ("/pending-approval", RouteAccess::Authenticated),
    ("/account-rejected", RouteAccess::Authenticated),
    ("/account", RouteAccess::Authenticated),
    ("/account/addresses", RouteAccess::Authenticated),
    ("/cart", RouteAccess::Authenticated),
    ("/wishlist", RouteAccess::Authenticated),
    ("/checkout", RouteAccess::Authenticated),
    ("/orders", RouteAccess::Authenticated),
    ("/orders/:id", RouteAccess::Authenticated),
    ("/support", RouteAccess::Authenticated),
    ("/support/:id", RouteAccess::Authenticated),
    ("/admin", RouteAccess::Staff),
    ("/admin/products", RouteAccess::Staff),
    ("/admin/orders", RouteAccess::Staff),
    ("/admin/orders/:id", RouteAccess::Staff),
    ("/admin/inventory", RouteAccess::Staff),
    ("/admin/requests", RouteAccess::Staff),
    ("/admin/support", RouteAccess::Staff),
    ("/superadmin", RouteAccess::SuperAdmin),
    ("/superadmin/users", RouteAccess::SuperAdmin),
    ("/superadmin/requests", RouteAccess::SuperAdmin),
    ("/superadmin/invites", RouteAccess::SuperAdmin),
];

/// Landing page of each role's dashboard.
pub fn home_for(role: Role) -> &'static str {
    match role {
        Role::Customer | Role::Business => "/account",
        Role::Admin => "/admin",
        Role::Superadmin => "/superadmin",
    }
}

fn status_page(status: UserStatus) -> Option<&'static str> {
    match status {
        UserStatus::Active => None,
        UserStatus::Pending => Some(PENDING_PATH),
        UserStatus::Rejected => Some(REJECTED_PATH),
    }
}

/// Find the access rule for a concrete path. `:name` segments match any
/// non-empty segment and trailing slashes are ignored.
pub fn route_access(path: &str) -> Option<RouteAccess> {
    let segments = split_path(path);
    ROUTES
        .iter()
        .find(|(pattern, _)| pattern_matches(pattern, &segments))
        .map(|(_, access)| *access)
}

fn split_path(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn pattern_matches(pattern: &str, segments: &[&str]) -> bool {
    let parts = split_path(pattern);
    parts.len() == segments.len()
        && parts
            .iter()
            .zip(segments)
            .all(|(part, seg)| part.starts_with(':') || part == seg)
}

pub fn resolve_route(viewer: Option<(Role, UserStatus)>, path: &str) -> RouteDecision {
    let Some(access) = route_access(path) else {
        return RouteDecision::NotFound;
    };

    if access == RouteAccess::Public {
        return RouteDecision::Allow;
    }

    let Some((role, status)) = viewer else {
        return match access {
            RouteAccess::GuestOnly => RouteDecision::Allow,
            _ => RouteDecision::redirect(LOGIN_PATH),
        };
    };

    let normalized = format!("/{}", split_path(path).join("/"));
    match status_page(status) {
        Some(page) if normalized == page && access != RouteAccess::GuestOnly => {
            return RouteDecision::Allow;
        }
        Some(page) => return RouteDecision::redirect(page),
        None if normalized == PENDING_PATH || normalized == REJECTED_PATH => {
            return RouteDecision::redirect(home_for(role));
        }
        None => {}
    }

    let allowed = match access {
        RouteAccess::Public | RouteAccess::Authenticated => true,
        RouteAccess::GuestOnly => false,
        RouteAccess::Staff => role.is_staff(),
        RouteAccess::SuperAdmin => role == Role::Superadmin,
    };

    if allowed {
        RouteDecision::Allow
    } else {
        RouteDecision::redirect(home_for(role))
    }
}
