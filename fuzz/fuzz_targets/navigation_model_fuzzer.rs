//! Fuzz target for the navigation controller against the reference model
//!
//! # Strategy
//!
//! - Arbitrary operation sequences: navigation, replace, back, native pop,
//!   sign in and sign out
//! - Optional fault on one route, entering or leaving it
//! - History limits from 1 to 8
//!
//! # Invariants
//!
//! - Result and observable state match the model after every operation
//! - Every standard invariant holds once each operation settles

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stella_harness::{
    ModelWorld, Operation, SimHost, marketplace_routes, model::FaultSlot, paused_runtime,
};

#[derive(Debug, Arbitrary)]
struct Input {
    limit: u8,
    fault: Option<FaultSlot>,
    ops: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let limit = usize::from(input.limit % 8) + 1;
    let Ok(rt) = paused_runtime() else {
        return;
    };

    rt.block_on(async {
        let mut model = ModelWorld::new(marketplace_routes(), limit);
        let mut real = SimHost::builder().history_limit(limit).build().unwrap();
        if let Some(fault) = input.fault {
            model.break_route(fault.route(), fault.step());
            real.scripts.fail(fault.route(), fault.step());
        }

        for (i, op) in input.ops.iter().enumerate() {
            let expected = model.apply(op);
            let actual = real.apply(op).await;
            assert_eq!(expected, actual, "result diverged at operation {i}: {op:?}");
            assert_eq!(
                model.observable_state(),
                real.observable_state(),
                "state diverged at operation {i}: {op:?}"
            );
            real.assert_invariants(&format!("after operation {i}: {op:?}"));
        }
    });
});
