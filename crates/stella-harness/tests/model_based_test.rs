//! Model-based property tests.
//!
//! These tests generate random operation sequences and verify that the real
//! controller behaves identically to the reference model.
//!
//! # Architecture
//!
//! ```text
//! proptest generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld       SimHost        Compare
//!      (reference)   (controller)      Results
//! ```

use proptest::prelude::*;
use stella_harness::{
    BROKEN_ROUTE, Effect, ModelWorld, Operation, SimHost, Step, marketplace_routes,
    model::{FaultSlot, RoleSlot, RouteSlot},
    paused_runtime,
};

/// Strategy for generating operations.
fn operation_strategy() -> impl Strategy<Value = Operation> {
    let route = any::<RouteSlot>();
    let role = any::<RoleSlot>();

    prop_oneof![
        // Weight towards navigation
        6 => (route.clone(), prop::option::of(0u8..4))
            .prop_map(|(route, store)| Operation::Navigate { route, store }),
        1 => route.clone().prop_map(|route| Operation::Replace { route }),
        2 => Just(Operation::Back),
        1 => prop::option::of(route).prop_map(|route| Operation::PopState { route }),
        1 => role.prop_map(|role| Operation::SignIn { role }),
        1 => Just(Operation::SignOut),
    ]
}

/// Strategy for a fault on one route.
fn fault_strategy() -> impl Strategy<Value = FaultSlot> {
    (any::<u8>(), any::<u8>()).prop_map(|(route, step)| FaultSlot { route, step })
}

proptest! {
    /// Results and observable state match the model after every operation.
    #[test]
    fn prop_model_matches_real(
        limit in 1usize..6,
        fault in prop::option::of(fault_strategy()),
        ops in prop::collection::vec(operation_strategy(), 0..40),
    ) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut model = ModelWorld::new(marketplace_routes(), limit);
            let mut real = SimHost::builder().history_limit(limit).build().unwrap();
            if let Some(fault) = fault {
                model.break_route(fault.route(), fault.step());
                real.scripts.fail(fault.route(), fault.step());
            }

            for (i, op) in ops.iter().enumerate() {
                let model_result = model.apply(op);
                let real_result = real.apply(op).await;

                prop_assert_eq!(
                    model_result,
                    real_result,
                    "Divergence at operation {}: {:?}",
                    i, op
                );
                prop_assert_eq!(
                    model.observable_state(),
                    real.observable_state(),
                    "State divergence after operation {}: {:?}",
                    i, op
                );
                real.assert_invariants(&format!("after operation {i}: {op:?}"));
            }
            Ok(())
        })?;
    }

    /// Every failed transition notifies exactly once, and nothing else does.
    #[test]
    fn prop_failures_are_notified_once_per_broken_visit(
        ops in prop::collection::vec(operation_strategy(), 0..30),
    ) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut real = SimHost::builder().signed_in("customer").build().unwrap();
            real.scripts.fail(BROKEN_ROUTE, Step::Init);

            let mut failures = 0;
            let broken_visit =
                |e: &Effect| matches!(e, Effect::Created { route, .. } if route == BROKEN_ROUTE);
            let session_ops =
                |op: &&Operation| matches!(op, Operation::SignIn { .. } | Operation::SignOut);

            for op in ops.iter().filter(|op| !session_ops(op)) {
                let before = real.journal.count(broken_visit);
                let _ = real.apply(op).await;
                failures += real.journal.count(broken_visit) - before;
            }

            let notified = real
                .journal
                .count(|e| matches!(e, Effect::Notified { severity, .. } if severity == "error"));
            prop_assert_eq!(notified, failures);
            Ok(())
        })?;
    }
}
