//! Reference model for model-based testing.
//!
//! [`ModelWorld`] is a deliberately naive re-statement of the navigation
//! rules: no screens, no collaborators, no async. Operations are applied to
//! both the model and a real [`crate::SimHost`], and their observable states
//! are compared after every step.

mod operation;
mod world;

pub use operation::{
    FAULT_ROUTES, FAULT_STEPS, FaultSlot, Operation, OperationError, OperationResult, ROLE_SLOTS,
    ROUTE_SLOTS, RoleSlot, RouteSlot,
};
pub use world::{ModelWorld, ObservableState};
