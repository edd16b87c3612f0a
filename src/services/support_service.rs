use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::support::{
        OpenTicketRequest, PostMessageRequest, TicketList, TicketWithMessages,
        UpdateTicketStatusRequest,
    },
    entity::{
        Orders,
        orders::Column as OrderCol,
        sea_orm_active_enums::TicketStatus,
        support_ticket_messages::{
            ActiveModel as MessageActive, Column as MessageCol, Entity as TicketMessages,
        },
        support_tickets::{ActiveModel, Column, Entity as SupportTickets, Model},
    },
    error::{AppError, AppResult},
    events::StoreEvent,
    middleware::auth::{AuthUser, ensure_staff},
    models::{SupportTicket, TicketMessage},
    response::{ApiResponse, Meta},
    routes::params::{Paginated, TicketListQuery},
    state::AppState,
    validation,
};

/// Status a ticket moves to when a new message lands on it.
///
/// Closed tickets take no more messages. A customer reply reopens a resolved
/// ticket and a staff reply picks up an open one.
pub fn status_after_message(current: TicketStatus, from_staff: bool) -> AppResult<TicketStatus> {
    match (current, from_staff) {
        (TicketStatus::Closed, _) => Err(AppError::BadRequest("Ticket is closed".into())),
        (TicketStatus::Resolved, false) => Ok(TicketStatus::Open),
        (TicketStatus::Open, true) => Ok(TicketStatus::InProgress),
        (status, _) => Ok(status),
    }
}

fn ensure_can_read(user: &AuthUser, ticket: &Model) -> AppResult<()> {
    if user.is_staff() || ticket.customer_id == user.user_id {
        Ok(())
    } else {
        // other customers' tickets do not exist for this caller
        Err(AppError::NotFound)
    }
}

async fn insert_message<C: ConnectionTrait>(
    conn: &C,
    ticket_id: Uuid,
    user: &AuthUser,
    body: String,
) -> AppResult<TicketMessage> {
    let message = MessageActive {
        id: Set(Uuid::new_v4()),
        ticket_id: Set(ticket_id),
        author_id: Set(user.user_id),
        author_role: Set(user.role),
        body: Set(body),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(TicketMessage::from(message))
}

async fn messages_for<C: ConnectionTrait>(conn: &C, ticket_id: Uuid) -> AppResult<Vec<TicketMessage>> {
    let messages = TicketMessages::find()
        .filter(MessageCol::TicketId.eq(ticket_id))
        .order_by_asc(MessageCol::CreatedAt)
        .order_by_asc(MessageCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(TicketMessage::from)
        .collect();
    Ok(messages)
}

pub async fn open_ticket(
    state: &AppState,
    user: &AuthUser,
    payload: OpenTicketRequest,
) -> AppResult<ApiResponse<TicketWithMessages>> {
    if user.is_staff() {
        return Err(AppError::Forbidden);
    }
    let subject = validation::ensure_present("subject", &payload.subject)?;
    let body = validation::ensure_present("message", &payload.message)?;

    let txn = state.orm.begin().await?;

    if let Some(order_id) = payload.order_id {
        let owned = Orders::find()
            .filter(
                Condition::all()
                    .add(OrderCol::Id.eq(order_id))
                    .add(OrderCol::UserId.eq(user.user_id)),
            )
            .one(&txn)
            .await?;
        if owned.is_none() {
            return Err(AppError::BadRequest("Order not found for this account".into()));
        }
    }

    let ticket = ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(user.user_id),
        subject: Set(subject),
        order_id: Set(payload.order_id),
        status: Set(TicketStatus::Open),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let message = insert_message(&txn, ticket.id, user, body).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "ticket_open",
        "support_tickets",
        serde_json::json!({ "ticket_id": ticket.id }),
    )
    .await;
    state.events.publish(StoreEvent::TicketOpened {
        ticket_id: ticket.id,
        customer_id: ticket.customer_id,
        subject: ticket.subject.clone(),
    });

    Ok(ApiResponse::success(
        "Ticket opened",
        TicketWithMessages {
            ticket: SupportTicket::from(ticket),
            messages: vec![message],
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_tickets(
    state: &AppState,
    user: &AuthUser,
    query: TicketListQuery,
) -> AppResult<ApiResponse<TicketList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if !user.is_staff() {
        condition = condition.add(Column::CustomerId.eq(user.user_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status));
    }

    let finder = SupportTickets::find()
        .filter(condition)
        .order_by_desc(Column::UpdatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SupportTicket::from)
        .collect();

    Ok(ApiResponse::success(
        "Tickets",
        TicketList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_ticket(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TicketWithMessages>> {
    let ticket = SupportTickets::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_can_read(user, &ticket)?;

    let messages = messages_for(&state.orm, ticket.id).await?;
    Ok(ApiResponse::success(
        "Ticket",
        TicketWithMessages {
            ticket: SupportTicket::from(ticket),
            messages,
        },
        Some(Meta::empty()),
    ))
}

pub async fn post_message(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: PostMessageRequest,
) -> AppResult<ApiResponse<TicketMessage>> {
    let body = validation::ensure_present("body", &payload.body)?;

    let txn = state.orm.begin().await?;
    let ticket = SupportTickets::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_can_read(user, &ticket)?;

    let previous = ticket.status;
    let next = status_after_message(previous, user.is_staff())?;

    let message = insert_message(&txn, ticket.id, user, body).await?;

    let customer_id = ticket.customer_id;
    let mut active: ActiveModel = ticket.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "ticket_message",
        "support_ticket_messages",
        serde_json::json!({ "ticket_id": id, "message_id": message.id, "status": next.as_str() }),
    )
    .await;
    state.events.publish(StoreEvent::TicketMessagePosted {
        ticket_id: id,
        customer_id,
        message: message.clone(),
    });
    if next != previous {
        state.events.publish(StoreEvent::TicketStatusChanged {
            ticket_id: id,
            customer_id,
            status: next,
        });
    }

    Ok(ApiResponse::success(
        "Message posted",
        message,
        Some(Meta::empty()),
    ))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTicketStatusRequest,
) -> AppResult<ApiResponse<SupportTicket>> {
    ensure_staff(user)?;

    let ticket = SupportTickets::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if ticket.status == payload.status {
        return Ok(ApiResponse::success(
            "Ticket unchanged",
            SupportTicket::from(ticket),
            Some(Meta::empty()),
        ));
    }

    let mut active: ActiveModel = ticket.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let ticket = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "ticket_status_update",
        "support_tickets",
        serde_json::json!({ "ticket_id": ticket.id, "status": ticket.status }),
    )
    .await;
    state.events.publish(StoreEvent::TicketStatusChanged {
        ticket_id: ticket.id,
        customer_id: ticket.customer_id,
        status: ticket.status,
    });

    Ok(ApiResponse::success(
        "Ticket updated",
        SupportTicket::from(ticket),
        Some(Meta::empty()),
    ))
}
