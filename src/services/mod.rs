pub mod address_service;
pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod category_service;
pub mod dashboard_service;
pub mod order_service;
pub mod product_request_service;
pub mod product_service;
pub mod superadmin_service;
pub mod support_service;
pub mod wishlist_service;
