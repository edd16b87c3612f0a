use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    access::{RouteAccess, RouteDecision},
    dto::{
        addresses::{AddressList, AddressRequest},
        auth::{
            AccountType, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
            RouteResolution, UpdateProfileRequest,
        },
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        dashboard::{AdminDashboard, CustomerDashboard, SuperadminDashboard},
        orders::{CheckoutRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
        product_requests::{ApprovedRequest, ProductRequestList, ReviewRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        superadmin::{
            AuditLogList, CreateInviteRequest, InviteList, UpdateUserRequest, UserList,
        },
        support::{
            OpenTicketRequest, PostMessageRequest, TicketList, TicketWithMessages,
            UpdateTicketStatusRequest,
        },
        wishlist::{AddWishlistRequest, WishlistProductList},
    },
    entity::sea_orm_active_enums::{
        OrderStatus, PaymentMethod, RequestStatus, Role, TicketStatus, UserStatus,
    },
    events::StoreEvent,
    models::{
        Address, AuditEntry, CartItem, Category, Order, OrderItem, PricedProduct, Product, ProductRequest,
        ShippingAddress, StaffInvite, SupportTicket, TicketMessage, User, WishlistItem,
    },
    pricing::PriceTier,
    response::{ApiResponse, Meta},
    routes::{
        addresses, admin, auth, cart, categories, dashboard, events, health, orders, params,
        product_requests, products as product_routes, superadmin, support, wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::update_profile,
        auth::change_password,
        auth::resolve_route,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::move_to_cart,
        addresses::list_addresses,
        addresses::create_address,
        addresses::update_address,
        addresses::set_default,
        addresses::delete_address,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        dashboard::customer_dashboard,
        support::open_ticket,
        support::list_tickets,
        support::get_ticket,
        support::post_message,
        support::update_status,
        admin::dashboard,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::list_low_stock,
        admin::adjust_inventory,
        product_requests::submit_request,
        product_requests::list_requests,
        product_requests::approve_request,
        product_requests::reject_request,
        superadmin::dashboard,
        superadmin::list_users,
        superadmin::update_user,
        superadmin::create_invite,
        superadmin::list_invites,
        superadmin::revoke_invite,
        superadmin::list_audit_logs,
        events::stream_events
    ),
    components(
        schemas(
            Role,
            UserStatus,
            OrderStatus,
            PaymentMethod,
            RequestStatus,
            TicketStatus,
            PriceTier,
            RouteAccess,
            RouteDecision,
            User,
            Category,
            Product,
            PricedProduct,
            CartItem,
            WishlistItem,
            Address,
            ShippingAddress,
            Order,
            OrderItem,
            ProductRequest,
            SupportTicket,
            TicketMessage,
            StaffInvite,
            StoreEvent,
            AccountType,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            RouteResolution,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartList,
            AddWishlistRequest,
            WishlistProductList,
            AddressRequest,
            AddressList,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            ReviewRequest,
            ProductRequestList,
            ApprovedRequest,
            OpenTicketRequest,
            PostMessageRequest,
            UpdateTicketStatusRequest,
            TicketList,
            TicketWithMessages,
            UpdateUserRequest,
            CreateInviteRequest,
            UserList,
            InviteList,
            AuditEntry,
            AuditLogList,
            CustomerDashboard,
            AdminDashboard,
            SuperadminDashboard,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::InventoryAdjustRequest,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<CartList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, sessions and route access"),
        (name = "Categories", description = "Catalog categories"),
        (name = "Products", description = "Catalog with viewer-specific pricing"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Wishlist", description = "Saved products"),
        (name = "Addresses", description = "Shipping addresses"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Dashboard", description = "Customer overview"),
        (name = "Support", description = "Support tickets"),
        (name = "Admin", description = "Staff order and inventory management"),
        (name = "Product Requests", description = "Catalog additions awaiting superadmin review"),
        (name = "Superadmin", description = "Users, invites, audit trail and platform overview"),
        (name = "Events", description = "Live updates over server-sent events"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
