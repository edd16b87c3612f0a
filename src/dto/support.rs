use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::sea_orm_active_enums::TicketStatus,
    models::{SupportTicket, TicketMessage},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenTicketRequest {
    pub subject: String,
    pub message: String,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketWithMessages {
    pub ticket: SupportTicket,
    pub messages: Vec<TicketMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketList {
    pub items: Vec<SupportTicket>,
}
