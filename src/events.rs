//! In-process fan-out of store changes to live subscribers.
//!
//! Services publish after their transaction commits; the `/api/events` SSE
//! route subscribes and forwards whatever the viewer is allowed to see.

use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::{OrderStatus, Role, TicketStatus},
    models::TicketMessage,
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    OrderPlaced {
        order_id: Uuid,
        customer_id: Uuid,
        order_number: String,
        total_amount: i64,
    },
    OrderStatusChanged {
        order_id: Uuid,
        customer_id: Uuid,
        status: OrderStatus,
    },
    TicketOpened {
        ticket_id: Uuid,
        customer_id: Uuid,
        subject: String,
    },
    TicketMessagePosted {
        ticket_id: Uuid,
        customer_id: Uuid,
        message: TicketMessage,
    },
    TicketStatusChanged {
        ticket_id: Uuid,
        customer_id: Uuid,
        status: TicketStatus,
    },
}

impl StoreEvent {
    /// SSE event name.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::OrderPlaced { .. } => "order_placed",
            StoreEvent::OrderStatusChanged { .. } => "order_status_changed",
            StoreEvent::TicketOpened { .. } => "ticket_opened",
            StoreEvent::TicketMessagePosted { .. } => "ticket_message_posted",
            StoreEvent::TicketStatusChanged { .. } => "ticket_status_changed",
        }
    }

    /// Customer the event belongs to.
    pub fn customer_id(&self) -> Uuid {
        match self {
            StoreEvent::OrderPlaced { customer_id, .. }
            | StoreEvent::OrderStatusChanged { customer_id, .. }
            | StoreEvent::TicketOpened { customer_id, .. }
            | StoreEvent::TicketMessagePosted { customer_id, .. }
            | StoreEvent::TicketStatusChanged { customer_id, .. } => *customer_id,
        }
    }

    pub fn order_id(&self) -> Option<Uuid> {
        match self {
            StoreEvent::OrderPlaced { order_id, .. }
            | StoreEvent::OrderStatusChanged { order_id, .. } => Some(*order_id),
            _ => None,
        }
    }

    pub fn ticket_id(&self) -> Option<Uuid> {
        match self {
            StoreEvent::TicketOpened { ticket_id, .. }
            | StoreEvent::TicketMessagePosted { ticket_id, .. }
            | StoreEvent::TicketStatusChanged { ticket_id, .. } => Some(*ticket_id),
            _ => None,
        }
    }

    /// Staff see every event; everyone else only their own.
    pub fn visible_to(&self, user_id: Uuid, role: Role) -> bool {
        role.is_staff() || self.customer_id() == user_id
    }
}

/// Optional narrowing of a subscription to one order or ticket.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub order_id: Option<Uuid>,
    pub ticket_id: Option<Uuid>,
}

impl EventFilter {
    pub fn matches(&self, event: &StoreEvent) -> bool {
        if let Some(order_id) = self.order_id {
            if event.order_id() != Some(order_id) {
                return false;
            }
        }
        if let Some(ticket_id) = self.ticket_id {
            if event.ticket_id() != Some(ticket_id) {
                return false;
            }
        }
        true
    }
}

#[derive(Clone)]
pub struct EventHub {
    sender: broadcast::Sender<StoreEvent>,
}

impl EventHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: StoreEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => {
                tracing::debug!(kind, receivers, "event published");
                receivers
            }
            // No live subscribers.
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
