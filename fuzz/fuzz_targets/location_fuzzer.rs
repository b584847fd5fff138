//! Fuzz target for fragment, deep-link and query parsing
//!
//! Fragments and deep links come straight from the address bar or from other
//! apps, so parsing must never panic on any input.
//!
//! # Invariants
//!
//! - `from_fragment`, `DeepLink::parse` and `parse_query` never panic
//! - A location with a non-empty route and non-empty parameter keys survives
//!   `to_fragment` followed by `from_fragment` unchanged

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use stella_core::{DeepLink, Location, Params, RouteId, location::parse_query};

#[derive(Debug, Arbitrary)]
struct Input {
    raw: String,
    route: String,
    params: Vec<(String, String)>,
}

fuzz_target!(|input: Input| {
    let _ = Location::from_fragment(&input.raw);
    let _ = DeepLink::parse(&input.raw);
    let _ = parse_query(&input.raw);

    if input.route.is_empty() {
        return;
    }
    let params: Params = input.params.into_iter().filter(|(key, _)| !key.is_empty()).collect();
    let location = Location::new(RouteId::new(input.route), params);

    let fragment = location.to_fragment();
    assert_eq!(
        Location::from_fragment(&fragment).as_ref(),
        Some(&location),
        "fragment {fragment} did not round-trip"
    );
});
