//! Marketplace screens rendered as plain markup.

use std::{fmt::Write as _, time::Duration};

use async_trait::async_trait;
use stella_app::{Props, RenderOutput, Screen, ScreenContext, ScreenError, ScreenRegistry};
use stella_core::RouteId;
use tokio::task::JoinHandle;

/// How often the order tracking screen polls for updates.
pub const ORDER_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Screen kinds known to the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Landing page for signed-out sessions.
    Splash,
    /// Sign in and sign up, selected by the `mode` prop.
    Auth,
    /// Customer landing page.
    CustomerHome,
    /// Nearby stores.
    StoreList,
    /// Products of one store.
    ProductGrid,
    /// One product.
    ProductDetail,
    /// Shopping cart.
    Cart,
    /// Live order status.
    OrderTracking,
    /// Shopkeeper landing page.
    ShopkeeperDashboard,
    /// Delivery partner landing page.
    DeliveryDashboard,
    /// Account settings.
    Profile,
    /// Product search.
    Search,
    /// New product form for shopkeepers.
    AddProduct,
}

impl Page {
    /// Every page, in registration order.
    pub const ALL: [Self; 13] = [
        Self::Splash,
        Self::Auth,
        Self::CustomerHome,
        Self::StoreList,
        Self::ProductGrid,
        Self::ProductDetail,
        Self::Cart,
        Self::OrderTracking,
        Self::ShopkeeperDashboard,
        Self::DeliveryDashboard,
        Self::Profile,
        Self::Search,
        Self::AddProduct,
    ];

    /// Screen kind this page is registered under.
    pub fn kind(self) -> &'static str {
        match self {
            Self::Splash => "splash",
            Self::Auth => "auth",
            Self::CustomerHome => "customer-home",
            Self::StoreList => "store-list",
            Self::ProductGrid => "product-grid",
            Self::ProductDetail => "product-detail",
            Self::Cart => "cart",
            Self::OrderTracking => "order-tracking",
            Self::ShopkeeperDashboard => "shopkeeper-dashboard",
            Self::DeliveryDashboard => "delivery-dashboard",
            Self::Profile => "profile",
            Self::Search => "search",
            Self::AddProduct => "add-product",
        }
    }

    fn heading(self, props: &Props) -> &'static str {
        match self {
            Self::Splash => "Shop your neighbourhood",
            Self::Auth if props.get("mode").is_some_and(|mode| mode == "signup") => {
                "Create your account"
            },
            Self::Auth => "Welcome back",
            Self::CustomerHome => "Near you",
            Self::StoreList => "Stores",
            Self::ProductGrid => "Products",
            Self::ProductDetail => "Product",
            Self::Cart => "Your cart",
            Self::OrderTracking => "Order status",
            Self::ShopkeeperDashboard => "Today's orders",
            Self::DeliveryDashboard => "Deliveries",
            Self::Profile => "Profile",
            Self::Search => "Find products",
            Self::AddProduct => "New product",
        }
    }
}

/// A marketplace page.
pub struct MarketplaceScreen {
    page: Page,
    route: RouteId,
    refresh: Option<JoinHandle<()>>,
}

impl MarketplaceScreen {
    /// Build a screen for `page`.
    pub fn new(page: Page, ctx: &ScreenContext) -> Self {
        Self { page, route: ctx.route_id.clone(), refresh: None }
    }

    fn stop_refresh(&mut self) {
        if let Some(task) = self.refresh.take() {
            task.abort();
            tracing::debug!("Stopped order refresh for {}", self.route);
        }
    }
}

#[async_trait]
impl Screen for MarketplaceScreen {
    async fn render(&mut self, props: &Props) -> Result<RenderOutput, ScreenError> {
        let mut markup = format!("<main class=\"{}\"", self.page.kind());
        for (key, value) in props {
            let _ = write!(markup, " data-{}=\"{}\"", escape(key), escape(value));
        }
        let _ = write!(markup, "><h1>{}</h1></main>", escape(self.page.heading(props)));
        Ok(RenderOutput::Markup(markup))
    }

    async fn init(&mut self) -> Result<(), ScreenError> {
        if self.page == Page::OrderTracking {
            self.stop_refresh();
            let route = self.route.clone();
            self.refresh = Some(tokio::spawn(async move {
                let mut ticks = tokio::time::interval(ORDER_REFRESH_INTERVAL);
                // First tick is immediate; the rendered page is already fresh.
                ticks.tick().await;
                loop {
                    ticks.tick().await;
                    tracing::debug!("Refreshing order status for {route}");
                }
            }));
        }
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), ScreenError> {
        self.stop_refresh();
        Ok(())
    }

    async fn preload(&mut self) -> Result<(), ScreenError> {
        tracing::debug!("Warmed {}", self.page.kind());
        Ok(())
    }
}

impl Drop for MarketplaceScreen {
    fn drop(&mut self) {
        self.stop_refresh();
    }
}

/// Registry with a factory for every [`Page`].
pub fn registry() -> ScreenRegistry {
    let mut screens = ScreenRegistry::new();
    for page in Page::ALL {
        screens.register(
            page.kind(),
            move |ctx: ScreenContext| -> Result<Box<dyn Screen>, ScreenError> {
                Ok(Box::new(MarketplaceScreen::new(page, &ctx)))
            },
        );
    }
    screens
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use stella_app::Navigator;
    use stella_core::Params;

    use super::*;

    fn context(route: &str) -> ScreenContext {
        let (navigator, _rx) = Navigator::channel();
        ScreenContext { route_id: RouteId::new(route), props: Params::new(), navigator }
    }

    #[tokio::test]
    async fn render_escapes_props() {
        let mut screen = MarketplaceScreen::new(Page::ProductGrid, &context("product-grid"));
        let mut props = Params::new();
        props.insert("storeId".into(), "<5>".into());

        let output = screen.render(&props).await.unwrap();
        assert_eq!(
            output,
            RenderOutput::Markup(
                "<main class=\"product-grid\" data-storeId=\"&lt;5&gt;\"><h1>Products</h1></main>"
                    .into()
            )
        );
    }

    #[tokio::test]
    async fn auth_heading_follows_mode() {
        let mut screen = MarketplaceScreen::new(Page::Auth, &context("signup"));
        let mut props = Params::new();
        props.insert("mode".into(), "signup".into());

        let RenderOutput::Markup(markup) = screen.render(&props).await.unwrap() else {
            panic!("expected markup");
        };
        assert!(markup.contains("<h1>Create your account</h1>"));
    }

    #[tokio::test]
    async fn cleanup_stops_order_refresh() {
        let mut screen = MarketplaceScreen::new(Page::OrderTracking, &context("order-tracking"));
        screen.init().await.unwrap();
        assert!(screen.refresh.is_some());

        screen.cleanup().await.unwrap();
        assert!(screen.refresh.is_none());
        // Idempotent.
        screen.cleanup().await.unwrap();
    }

    #[test]
    fn registry_covers_every_page() {
        let screens = registry();
        for page in Page::ALL {
            assert!(screens.get(page.kind()).is_some(), "{} not registered", page.kind());
        }
    }
}
