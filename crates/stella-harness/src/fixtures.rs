//! Marketplace route fixtures.

use stella_core::RouteConfig;

/// Customer-only routes.
const CUSTOMER: [&str; 1] = ["customer"];

/// Route that is public and exists only to be broken by tests.
pub const BROKEN_ROUTE: &str = "broken-route";

/// The marketplace route table, plus [`BROKEN_ROUTE`].
pub fn marketplace_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("splash", "Welcome to Stella"),
        RouteConfig::new("login", "Sign In").with_screen("auth").with_prop("mode", "login"),
        RouteConfig::new("signup", "Sign Up").with_screen("auth").with_prop("mode", "signup"),
        RouteConfig::new("customer-home", "Home").with_roles(CUSTOMER).with_chrome(true, true),
        RouteConfig::new("store-list", "Stores").with_roles(CUSTOMER).with_chrome(true, true),
        RouteConfig::new("search", "Search").with_roles(CUSTOMER),
        RouteConfig::new("product-grid", "Products")
            .with_roles(CUSTOMER)
            .with_chrome(true, false),
        RouteConfig::new("product-detail", "Product Details").with_roles(CUSTOMER),
        RouteConfig::new("cart", "Shopping Cart").with_roles(CUSTOMER).with_chrome(true, false),
        RouteConfig::new("order-tracking", "My Orders")
            .with_roles(CUSTOMER)
            .with_chrome(true, false),
        RouteConfig::new("shopkeeper-dashboard", "Dashboard")
            .with_roles(["shopkeeper"])
            .with_chrome(false, true),
        RouteConfig::new("add-product", "Add Product").with_roles(["shopkeeper"]),
        RouteConfig::new("delivery-dashboard", "Delivery Dashboard")
            .with_roles(["delivery_partner"])
            .with_chrome(false, true),
        RouteConfig::new("profile", "Profile")
            .with_roles(["customer", "shopkeeper", "delivery_partner"])
            .with_chrome(true, false),
        RouteConfig::new(BROKEN_ROUTE, "Broken"),
    ]
}
