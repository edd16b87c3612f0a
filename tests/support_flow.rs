mod common;

use furniture_store_api::{
    dto::support::{OpenTicketRequest, PostMessageRequest, UpdateTicketStatusRequest},
    entity::sea_orm_active_enums::{Role, TicketStatus, UserStatus},
    error::AppError,
    events::StoreEvent,
    routes::params::{AuditLogQuery, TicketListQuery},
    services::{superadmin_service, support_service},
};
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;

// Customer opens a ticket, staff replies, it is resolved, reopened and closed.
#[tokio::test]
async fn support_ticket_conversation_flow() -> anyhow::Result<()> {
    let Some(database_url) = common::database_url() else {
        return Ok(());
    };
    let state = common::setup_state(&database_url).await?;
    let mut events = state.events.subscribe();

    let customer =
        common::create_user(&state, "customer@example.com", Role::Customer, UserStatus::Active).await?;
    let other =
        common::create_user(&state, "other@example.com", Role::Customer, UserStatus::Active).await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin, UserStatus::Active).await?;
    let owner =
        common::create_user(&state, "owner@example.com", Role::Superadmin, UserStatus::Active).await?;

    // Order references must belong to the customer
    let err = support_service::open_ticket(
        &state,
        &customer,
        OpenTicketRequest {
            subject: "Where is my order?".into(),
            message: "It has been a week".into(),
            order_id: Some(Uuid::new_v4()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Staff do not open tickets
    assert!(matches!(
        support_service::open_ticket(
            &state,
            &admin,
            OpenTicketRequest {
                subject: "Test".into(),
                message: "Test".into(),
                order_id: None,
            },
        )
        .await,
        Err(AppError::Forbidden)
    ));

    let opened = support_service::open_ticket(
        &state,
        &customer,
        OpenTicketRequest {
            subject: "Scratched table top".into(),
            message: "The table arrived with a long scratch.".into(),
            order_id: None,
        },
    )
    .await?
    .data
    .unwrap();
    let ticket_id = opened.ticket.id;
    assert_eq!(opened.ticket.status, TicketStatus::Open);
    assert_eq!(opened.messages.len(), 1);
    assert!(matches!(
        events.recv().await?,
        StoreEvent::TicketOpened { ticket_id: id, .. } if id == ticket_id
    ));

    // Invisible to other customers
    assert!(matches!(
        support_service::get_ticket(&state, &other, ticket_id).await,
        Err(AppError::NotFound)
    ));
    let theirs = support_service::list_tickets(&state, &other, TicketListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(theirs.items.is_empty());

    // Staff reply picks the ticket up
    let reply = support_service::post_message(
        &state,
        &admin,
        ticket_id,
        PostMessageRequest {
            body: "Sorry about that, a replacement top is on its way.".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(reply.author_role, Role::Admin);
    assert!(matches!(events.recv().await?, StoreEvent::TicketMessagePosted { .. }));
    assert!(matches!(
        events.recv().await?,
        StoreEvent::TicketStatusChanged {
            status: TicketStatus::InProgress,
            ..
        }
    ));

    support_service::update_status(
        &state,
        &admin,
        ticket_id,
        UpdateTicketStatusRequest {
            status: TicketStatus::Resolved,
        },
    )
    .await?;
    assert!(matches!(
        events.recv().await?,
        StoreEvent::TicketStatusChanged {
            status: TicketStatus::Resolved,
            ..
        }
    ));

    // Re-applying the current status changes nothing and announces nothing
    let unchanged = support_service::update_status(
        &state,
        &admin,
        ticket_id,
        UpdateTicketStatusRequest {
            status: TicketStatus::Resolved,
        },
    )
    .await?;
    assert_eq!(unchanged.message, "Ticket unchanged");
    assert_eq!(unchanged.data.unwrap().status, TicketStatus::Resolved);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // Customer reply reopens it
    support_service::post_message(
        &state,
        &customer,
        ticket_id,
        PostMessageRequest {
            body: "The replacement is scratched too.".into(),
        },
    )
    .await?;
    let detail = support_service::get_ticket(&state, &customer, ticket_id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.ticket.status, TicketStatus::Open);
    assert_eq!(detail.messages.len(), 3);
    assert_eq!(detail.messages[1].author_id, admin.user_id);

    // Customers cannot change status; closed tickets take no messages
    assert!(matches!(
        support_service::update_status(
            &state,
            &customer,
            ticket_id,
            UpdateTicketStatusRequest {
                status: TicketStatus::Closed
            },
        )
        .await,
        Err(AppError::Forbidden)
    ));
    support_service::update_status(
        &state,
        &admin,
        ticket_id,
        UpdateTicketStatusRequest {
            status: TicketStatus::Closed,
        },
    )
    .await?;
    let err = support_service::post_message(
        &state,
        &customer,
        ticket_id,
        PostMessageRequest {
            body: "Hello?".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Bad Request Ticket is closed");

    // Staff see every ticket
    let all = support_service::list_tickets(&state, &admin, TicketListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(all.items.len(), 1);

    // Every reply is on the audit trail, the refused one excepted
    let replies = superadmin_service::list_audit_logs(
        &state,
        &owner,
        AuditLogQuery {
            page: None,
            per_page: None,
            user_id: None,
            action: Some("ticket_message".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(replies.items.len(), 2);
    assert!(replies.items.iter().any(|entry| entry.user_id == Some(admin.user_id)));
    assert!(replies.items.iter().any(|entry| entry.user_id == Some(customer.user_id)));

    Ok(())
}
