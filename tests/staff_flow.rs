mod common;

use furniture_store_api::{
    dto::{
        auth::{AccountType, LoginRequest, RegisterRequest},
        product_requests::ReviewRequest,
        products::CreateProductRequest,
        superadmin::{CreateInviteRequest, UpdateUserRequest},
    },
    entity::sea_orm_active_enums::{RequestStatus, Role, UserStatus},
    error::AppError,
    routes::params::{AuditLogQuery, RequestListQuery},
    services::{auth_service, product_request_service, superadmin_service},
};

fn sofa_request(name: &str) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        description: Some("Three seater in linen".into()),
        category_id: None,
        price: 54_000,
        sale_price: None,
        stock: 4,
        badges: vec!["new".into()],
        image_url: None,
        material: Some("linen".into()),
    }
}

// Admin proposes products for superadmin review; superadmin manages accounts and invites.
#[tokio::test]
async fn product_requests_and_account_management_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;

    let owner =
        common::create_user(&state, "owner@example.com", Role::Superadmin, UserStatus::Active).await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin, UserStatus::Active).await?;
    let customer =
        common::create_user(&state, "customer@example.com", Role::Customer, UserStatus::Active).await?;

    // Customers cannot propose products
    assert!(matches!(
        product_request_service::submit(&state, &customer, sofa_request("Linen Sofa")).await,
        Err(AppError::Forbidden)
    ));

    let request = product_request_service::submit(&state, &admin, sofa_request("Linen Sofa"))
        .await?
        .data
        .unwrap();
    assert_eq!(request.status, RequestStatus::Pending);

    // Admins cannot approve their own requests
    assert!(matches!(
        product_request_service::approve(&state, &admin, request.id, None).await,
        Err(AppError::Forbidden)
    ));

    let approved = product_request_service::approve(
        &state,
        &owner,
        request.id,
        Some(ReviewRequest {
            note: Some("Looks good".into()),
        }),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(approved.request.status, RequestStatus::Approved);
    assert_eq!(approved.request.product_id, Some(approved.product.id));
    assert_eq!(approved.product.name, "Linen Sofa");
    assert_eq!(approved.product.price, 54_000);

    // Reviewed requests stay reviewed
    assert!(matches!(
        product_request_service::reject(&state, &owner, request.id, None).await,
        Err(AppError::BadRequest(_))
    ));

    let second = product_request_service::submit(&state, &admin, sofa_request("Velvet Sofa"))
        .await?
        .data
        .unwrap();
    let rejected = product_request_service::reject(&state, &owner, second.id, None)
        .await?
        .data
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.product_id, None);

    let pending = product_request_service::list(
        &state,
        &admin,
        RequestListQuery {
            page: None,
            per_page: None,
            status: Some(RequestStatus::Pending),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(pending.items.is_empty());

    // A business sign-up waits for approval
    let buyer = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "Buyer@Example.com".into(),
            password: common::PASSWORD.into(),
            display_name: Some("Buyer".into()),
            phone: None,
            account_type: AccountType::Business,
            company_name: Some("Oak & Co".into()),
            gst_number: Some("27abcde1234f1z5".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(buyer.email, "buyer@example.com");
    assert_eq!(buyer.status, UserStatus::Pending);
    assert_eq!(buyer.gst_number.as_deref(), Some("27ABCDE1234F1Z5"));

    let login = auth_service::login_user(
        &state,
        LoginRequest {
            email: "buyer@example.com".into(),
            password: common::PASSWORD.into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(login.redirect_to, "/pending-approval");

    let approved_buyer = superadmin_service::update_user(
        &state,
        &owner,
        buyer.id,
        UpdateUserRequest {
            role: None,
            status: Some(UserStatus::Active),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(approved_buyer.status, UserStatus::Active);

    // The superadmin cannot demote themselves
    assert!(matches!(
        superadmin_service::update_user(
            &state,
            &owner,
            owner.user_id,
            UpdateUserRequest {
                role: Some(Role::Admin),
                status: None,
            },
        )
        .await,
        Err(AppError::BadRequest(_))
    ));

    // Invited emails register straight into the staff role
    superadmin_service::create_invite(
        &state,
        &owner,
        CreateInviteRequest {
            email: "new.admin@example.com".into(),
        },
    )
    .await?;
    assert!(matches!(
        superadmin_service::create_invite(
            &state,
            &owner,
            CreateInviteRequest {
                email: "new.admin@example.com".into(),
            },
        )
        .await,
        Err(AppError::Conflict(_))
    ));
    let invited = auth_service::register_user(
        &state,
        RegisterRequest {
            email: "new.admin@example.com".into(),
            password: common::PASSWORD.into(),
            display_name: None,
            phone: None,
            account_type: AccountType::Customer,
            company_name: None,
            gst_number: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(invited.role, Role::Admin);
    assert_eq!(invited.status, UserStatus::Active);

    let invites = superadmin_service::list_invites(&state, &owner)
        .await?
        .data
        .unwrap();
    assert_eq!(invites.items.len(), 1);
    assert_eq!(invites.items[0].accepted_by, Some(invited.id));

    // Accepted invites stay on record; open ones can be withdrawn
    assert!(matches!(
        superadmin_service::revoke_invite(&state, &owner, invites.items[0].id).await,
        Err(AppError::BadRequest(_))
    ));
    let pending_invite = superadmin_service::create_invite(
        &state,
        &owner,
        CreateInviteRequest {
            email: "later.admin@example.com".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(matches!(
        superadmin_service::revoke_invite(&state, &admin, pending_invite.id).await,
        Err(AppError::Forbidden)
    ));
    superadmin_service::revoke_invite(&state, &owner, pending_invite.id).await?;
    assert!(matches!(
        superadmin_service::revoke_invite(&state, &owner, pending_invite.id).await,
        Err(AppError::NotFound)
    ));
    let invites = superadmin_service::list_invites(&state, &owner)
        .await?
        .data
        .unwrap();
    assert_eq!(invites.items.len(), 1);

    let approvals = superadmin_service::list_audit_logs(
        &state,
        &owner,
        AuditLogQuery {
            page: None,
            per_page: None,
            user_id: None,
            action: Some("product_request_approve".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(approvals.items.len(), 1);
    assert_eq!(approvals.items[0].user_id, Some(owner.user_id));

    let dashboard = superadmin_service::dashboard(&state, &owner).await?.data.unwrap();
    assert_eq!(dashboard.pending_product_requests, 0);
    assert_eq!(dashboard.users_by_role.get("admin"), Some(&2));

    Ok(())
}
