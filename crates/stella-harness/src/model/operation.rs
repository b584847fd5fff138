//! Operations for model-based testing.
//!
//! Operations are generated by proptest (or decoded from fuzz input) and
//! applied to both the model and the real controller.

use arbitrary::Arbitrary;

use crate::{BROKEN_ROUTE, Step};

/// Index into [`ROUTE_SLOTS`], taken modulo its length.
pub type RouteSlot = u8;

/// Index into [`ROLE_SLOTS`], taken modulo its length.
pub type RoleSlot = u8;

/// Routes operations can target. The last one is never registered.
pub const ROUTE_SLOTS: [&str; 14] = [
    "splash",
    "login",
    "signup",
    "customer-home",
    "store-list",
    "product-grid",
    "product-detail",
    "cart",
    "order-tracking",
    "shopkeeper-dashboard",
    "delivery-dashboard",
    "profile",
    "broken-route",
    "nowhere",
];

/// Roles operations can sign in as. The last one has no landing route.
pub const ROLE_SLOTS: [&str; 4] = ["customer", "shopkeeper", "delivery_partner", "auditor"];

/// Routes a fault can be injected into.
pub const FAULT_ROUTES: [&str; 3] = [BROKEN_ROUTE, "cart", "customer-home"];

/// Lifecycle steps a navigation fault can target.
pub const FAULT_STEPS: [Step; 4] = [Step::Construct, Step::Render, Step::Init, Step::Cleanup];

/// A fault injected into both the model and the real controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct FaultSlot {
    /// Index into [`FAULT_ROUTES`], taken modulo its length.
    pub route: u8,
    /// Index into [`FAULT_STEPS`], taken modulo its length.
    pub step: u8,
}

impl FaultSlot {
    /// Faulty route.
    pub fn route(self) -> &'static str {
        FAULT_ROUTES[usize::from(self.route) % FAULT_ROUTES.len()]
    }

    /// Failing step.
    pub fn step(self) -> Step {
        FAULT_STEPS[usize::from(self.step) % FAULT_STEPS.len()]
    }
}

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Recorded navigation, optionally carrying a store id.
    Navigate {
        /// Target route.
        route: RouteSlot,
        /// `storeId` parameter.
        store: Option<u8>,
    },

    /// Navigation that is not recorded in history.
    Replace {
        /// Target route.
        route: RouteSlot,
    },

    /// Go back one history entry.
    Back,

    /// Native back/forward event. `None` carries no state object.
    PopState {
        /// Route stored in the native entry.
        route: Option<RouteSlot>,
    },

    /// Sign in. Takes effect at the next navigation.
    SignIn {
        /// Role to sign in as.
        role: RoleSlot,
    },

    /// Sign out. Takes effect at the next navigation.
    SignOut,
}

impl Operation {
    /// Route id for a slot.
    pub fn route(slot: RouteSlot) -> &'static str {
        ROUTE_SLOTS[usize::from(slot) % ROUTE_SLOTS.len()]
    }

    /// Role for a slot.
    pub fn role(slot: RoleSlot) -> &'static str {
        ROLE_SLOTS[usize::from(slot) % ROLE_SLOTS.len()]
    }
}

/// Why an operation was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// The safe default failed; nothing is on screen.
    Fatal,
    /// Route table or role mapping cannot satisfy the request.
    Configuration,
}

/// Operation outcome.
pub type OperationResult = Result<(), OperationError>;
