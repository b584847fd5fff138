//! Fuzz target for the bounded history stack
//!
//! # Strategy
//!
//! - Limits from 0 (raised to 1) to 16
//! - Interleaved pushes, self-transition records and pops
//! - A plain `Vec` tracks what the stack should hold
//!
//! # Invariants
//!
//! - Length never exceeds the limit
//! - Full stacks evict the oldest entry first
//! - Self-transitions are never recorded
//! - Pop returns the most recent entry

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stella_core::{HistoryEntry, HistoryStack, Params, RouteId};

#[derive(Debug, Clone, Arbitrary)]
enum StackOp {
    Push { route: u8 },
    Record { previous: u8, next: u8 },
    Pop,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    limit: u8,
    ops: Vec<StackOp>,
}

fn entry(route: u8, ts: u64) -> HistoryEntry {
    HistoryEntry::new(RouteId::new(format!("route-{}", route % 8)), Params::new(), ts)
}

fuzz_target!(|input: Input| {
    let limit = usize::from(input.limit % 17);
    let mut stack = HistoryStack::new(limit);
    let limit = limit.max(1);
    assert_eq!(stack.limit(), limit);

    let mut expected: Vec<HistoryEntry> = Vec::new();

    for (ts, op) in input.ops.into_iter().enumerate() {
        let ts = ts as u64;
        match op {
            StackOp::Push { route } => {
                stack.push(entry(route, ts));
                expected.push(entry(route, ts));
            },
            StackOp::Record { previous, next } => {
                let previous = entry(previous, ts);
                let next = entry(next, ts).route_id;
                let self_transition = previous.route_id == next;
                let pushed = stack.record(previous.clone(), &next);
                assert_eq!(pushed, !self_transition);
                if pushed {
                    expected.push(previous);
                }
            },
            StackOp::Pop => {
                assert_eq!(stack.pop(), expected.pop());
            },
            StackOp::Clear => {
                stack.clear();
                expected.clear();
            },
        }

        if expected.len() > limit {
            expected.remove(0);
        }
        assert!(stack.len() <= limit);
        assert_eq!(stack.peek_all(), expected);
    }
});
