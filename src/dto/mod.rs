pub mod addresses;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod product_requests;
pub mod products;
pub mod superadmin;
pub mod support;
pub mod wishlist;
