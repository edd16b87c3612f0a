pub mod addresses;
pub mod audit_logs;
pub mod cart_items;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod product_requests;
pub mod products;
pub mod sea_orm_active_enums;
pub mod staff_invites;
pub mod support_ticket_messages;
pub mod support_tickets;
pub mod users;
pub mod wishlist_items;

pub use addresses::Entity as Addresses;
pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use product_requests::Entity as ProductRequests;
pub use products::Entity as Products;
pub use staff_invites::Entity as StaffInvites;
pub use support_ticket_messages::Entity as SupportTicketMessages;
pub use support_tickets::Entity as SupportTickets;
pub use users::Entity as Users;
pub use wishlist_items::Entity as WishlistItems;
