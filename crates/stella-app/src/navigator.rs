//! Queued navigation handle.
//!
//! A [`Navigator`] lets code that cannot borrow the controller (screens, host
//! event handlers) request navigation. Requests are queued and the controller
//! runs them strictly in arrival order, each one only after the previous
//! transition has settled. A request issued from inside a screen's `init`
//! therefore never overlaps the transition that is initializing that screen.

use stella_core::{HistoryState, Params, RouteId};
use tokio::sync::mpsc;

use crate::NavRequest;

/// Cloneable handle that queues requests for a [`crate::NavigationController`].
#[derive(Debug, Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<NavRequest>,
}

impl Navigator {
    /// Create a handle and the queue it feeds.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<NavRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a request.
    ///
    /// Returns `false` if the controller is gone.
    pub fn send(&self, request: NavRequest) -> bool {
        self.tx.send(request).is_ok()
    }

    /// Queue a recorded navigation.
    pub fn navigate(&self, route: impl Into<RouteId>, params: Params) -> bool {
        self.send(NavRequest::Navigate { route: route.into(), params, record_history: true })
    }

    /// Queue a back navigation.
    pub fn back(&self) -> bool {
        self.send(NavRequest::Back)
    }

    /// Queue a native back/forward event.
    pub fn pop_state(&self, state: Option<HistoryState>) -> bool {
        self.send(NavRequest::PopState(state))
    }

    /// Queue a deep link.
    pub fn deep_link(&self, url: impl Into<String>) -> bool {
        self.send(NavRequest::DeepLink(url.into()))
    }

    /// Queue a link activation.
    pub fn link(&self, route: impl Into<RouteId>, params: impl Into<String>) -> bool {
        self.send(NavRequest::Link { route: route.into(), params: params.into() })
    }

    /// Queue a floating action button press.
    pub fn action_button(&self) -> bool {
        self.send(NavRequest::ActionButton)
    }

    /// Queue a bottom navigation tab selection.
    pub fn select_tab(&self, route: impl Into<RouteId>) -> bool {
        self.send(NavRequest::Tab(route.into()))
    }

    /// Queue a shutdown; requests queued after it are not served.
    pub fn shutdown(&self) -> bool {
        self.send(NavRequest::Shutdown)
    }

    /// Open a store's product grid.
    pub fn navigate_to_store(&self, store_id: &str) -> bool {
        self.navigate("product-grid", store_params(store_id))
    }

    /// Open a product's detail page.
    pub fn navigate_to_product(&self, product_id: &str, store_id: &str) -> bool {
        self.navigate("product-detail", product_params(product_id, store_id))
    }

    /// Open an order's tracking page.
    pub fn navigate_to_order(&self, order_id: &str) -> bool {
        self.navigate("order-tracking", order_params(order_id))
    }
}

pub(crate) fn store_params(store_id: &str) -> Params {
    Params::from([("storeId".to_string(), store_id.to_string())])
}

pub(crate) fn product_params(product_id: &str, store_id: &str) -> Params {
    Params::from([
        ("productId".to_string(), product_id.to_string()),
        ("storeId".to_string(), store_id.to_string()),
    ])
}

pub(crate) fn order_params(order_id: &str) -> Params {
    Params::from([("orderId".to_string(), order_id.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_queued_in_order() {
        let (navigator, mut rx) = Navigator::channel();
        assert!(navigator.navigate_to_product("7", "2"));
        assert!(navigator.back());

        assert_eq!(
            rx.try_recv().ok(),
            Some(NavRequest::Navigate {
                route: RouteId::new("product-detail"),
                params: product_params("7", "2"),
                record_history: true,
            })
        );
        assert_eq!(rx.try_recv().ok(), Some(NavRequest::Back));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_fails_once_queue_is_dropped() {
        let (navigator, rx) = Navigator::channel();
        drop(rx);
        assert!(!navigator.navigate_to_order("42"));
    }
}
