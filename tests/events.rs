use furniture_store_api::{
    entity::sea_orm_active_enums::{OrderStatus, Role, TicketStatus},
    events::{EventFilter, EventHub, StoreEvent},
};
use uuid::Uuid;

fn order_placed(customer_id: Uuid, order_id: Uuid) -> StoreEvent {
    StoreEvent::OrderPlaced {
        order_id,
        customer_id,
        order_number: "ORD-20260101-ABCDEF12".to_string(),
        total_amount: 12_500,
    }
}

#[tokio::test]
async fn subscribers_receive_published_events() {
    let hub = EventHub::new(16);
    let mut first = hub.subscribe();
    let mut second = hub.subscribe();
    assert_eq!(hub.subscriber_count(), 2);

    let event = order_placed(Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(hub.publish(event.clone()), 2);

    assert_eq!(first.recv().await.unwrap(), event);
    assert_eq!(second.recv().await.unwrap(), event);
}

#[tokio::test]
async fn publishing_without_subscribers_is_harmless() {
    let hub = EventHub::new(4);
    let delivered = hub.publish(StoreEvent::TicketStatusChanged {
        ticket_id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        status: TicketStatus::Resolved,
    });
    assert_eq!(delivered, 0);
}

#[tokio::test]
async fn late_subscribers_only_see_new_events() {
    let hub = EventHub::new(4);
    hub.publish(order_placed(Uuid::new_v4(), Uuid::new_v4()));

    let mut rx = hub.subscribe();
    let next = StoreEvent::OrderStatusChanged {
        order_id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        status: OrderStatus::Shipped,
    };
    hub.publish(next.clone());
    assert_eq!(rx.recv().await.unwrap(), next);
}

#[test]
fn customers_only_see_their_own_events() {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let event = order_placed(owner, Uuid::new_v4());

    assert!(event.visible_to(owner, Role::Customer));
    assert!(!event.visible_to(stranger, Role::Customer));
    assert!(!event.visible_to(stranger, Role::Business));
    assert!(event.visible_to(stranger, Role::Admin));
    assert!(event.visible_to(stranger, Role::Superadmin));
}

#[test]
fn filters_narrow_to_one_order_or_ticket() {
    let customer = Uuid::new_v4();
    let order_id = Uuid::new_v4();
    let ticket_id = Uuid::new_v4();
    let order_event = order_placed(customer, order_id);
    let ticket_event = StoreEvent::TicketOpened {
        ticket_id,
        customer_id: customer,
        subject: "Wobbly leg".to_string(),
    };

    let any = EventFilter::default();
    assert!(any.matches(&order_event));
    assert!(any.matches(&ticket_event));

    let by_order = EventFilter {
        order_id: Some(order_id),
        ticket_id: None,
    };
    assert!(by_order.matches(&order_event));
    assert!(!by_order.matches(&ticket_event));
    assert!(!by_order.matches(&order_placed(customer, Uuid::new_v4())));

    let by_ticket = EventFilter {
        order_id: None,
        ticket_id: Some(ticket_id),
    };
    assert!(by_ticket.matches(&ticket_event));
    assert!(!by_ticket.matches(&order_event));
}

#[test]
fn events_serialize_with_a_type_tag() {
    let event = order_placed(Uuid::new_v4(), Uuid::new_v4());
    assert_eq!(event.kind(), "order_placed");

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "order_placed");
    assert_eq!(json["total_amount"], 12_500);
}
