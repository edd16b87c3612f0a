use furniture_store_api::{
    access::{RouteAccess, RouteDecision, home_for, resolve_route, route_access},
    entity::sea_orm_active_enums::{Role, UserStatus},
};

fn redirect(to: &str) -> RouteDecision {
    RouteDecision::Redirect { to: to.to_string() }
}

#[test]
fn matches_dynamic_segments_and_ignores_trailing_slash() {
    assert_eq!(route_access("/products/abc-123"), Some(RouteAccess::Public));
    assert_eq!(route_access("/orders/42/"), Some(RouteAccess::Authenticated));
    assert_eq!(route_access("/admin/orders/7?tab=items"), Some(RouteAccess::Staff));
    assert_eq!(route_access("/products/1/reviews"), None);
    assert_eq!(route_access("/nowhere"), None);
}

#[test]
fn unknown_paths_are_not_found() {
    assert_eq!(resolve_route(None, "/nowhere"), RouteDecision::NotFound);
    assert_eq!(
        resolve_route(Some((Role::Superadmin, UserStatus::Active)), "/secret"),
        RouteDecision::NotFound
    );
}

#[test]
fn guests_see_public_pages_and_are_sent_to_login() {
    assert_eq!(resolve_route(None, "/"), RouteDecision::Allow);
    assert_eq!(resolve_route(None, "/products/9"), RouteDecision::Allow);
    assert_eq!(resolve_route(None, "/login"), RouteDecision::Allow);
    assert_eq!(resolve_route(None, "/cart"), redirect("/login"));
    assert_eq!(resolve_route(None, "/admin"), redirect("/login"));
    assert_eq!(resolve_route(None, "/pending-approval"), redirect("/login"));
}

#[test]
fn signed_in_users_leave_guest_pages() {
    let customer = Some((Role::Customer, UserStatus::Active));
    assert_eq!(resolve_route(customer, "/login"), redirect("/account"));
    assert_eq!(resolve_route(customer, "/register"), redirect("/account"));

    let admin = Some((Role::Admin, UserStatus::Active));
    assert_eq!(resolve_route(admin, "/login"), redirect("/admin"));
}

#[test]
fn role_gates_redirect_to_the_viewers_home() {
    let customer = Some((Role::Customer, UserStatus::Active));
    assert_eq!(resolve_route(customer, "/cart"), RouteDecision::Allow);
    assert_eq!(resolve_route(customer, "/admin/orders"), redirect("/account"));
    assert_eq!(resolve_route(customer, "/superadmin"), redirect("/account"));

    let admin = Some((Role::Admin, UserStatus::Active));
    assert_eq!(resolve_route(admin, "/admin/orders/1"), RouteDecision::Allow);
    assert_eq!(resolve_route(admin, "/superadmin/users"), redirect("/admin"));

    let owner = Some((Role::Superadmin, UserStatus::Active));
    assert_eq!(resolve_route(owner, "/admin"), RouteDecision::Allow);
    assert_eq!(resolve_route(owner, "/superadmin/invites"), RouteDecision::Allow);
}

#[test]
fn pending_and_rejected_accounts_are_held_on_their_status_page() {
    let pending = Some((Role::Business, UserStatus::Pending));
    assert_eq!(resolve_route(pending, "/pending-approval"), RouteDecision::Allow);
    assert_eq!(resolve_route(pending, "/cart"), redirect("/pending-approval"));
    assert_eq!(resolve_route(pending, "/account-rejected"), redirect("/pending-approval"));
    assert_eq!(resolve_route(pending, "/login"), redirect("/pending-approval"));
    // the storefront itself stays browsable
    assert_eq!(resolve_route(pending, "/products"), RouteDecision::Allow);

    let rejected = Some((Role::Business, UserStatus::Rejected));
    assert_eq!(resolve_route(rejected, "/account-rejected"), RouteDecision::Allow);
    assert_eq!(resolve_route(rejected, "/checkout"), redirect("/account-rejected"));
}

#[test]
fn active_accounts_skip_status_pages() {
    let business = Some((Role::Business, UserStatus::Active));
    assert_eq!(resolve_route(business, "/pending-approval"), redirect("/account"));
    assert_eq!(resolve_route(business, "/checkout"), RouteDecision::Allow);
}

#[test]
fn homes_per_role() {
    assert_eq!(home_for(Role::Customer), "/account");
    assert_eq!(home_for(Role::Business), "/account");
    assert_eq!(home_for(Role::Admin), "/admin");
    assert_eq!(home_for(Role::Superadmin), "/superadmin");
}
