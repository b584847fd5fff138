//! Property-based tests for navigation rules.
//!
//! Each property holds for arbitrary routes, roles and journeys, not just the
//! hand-picked scenarios in the controller's own tests.

use std::collections::HashMap;

use proptest::prelude::*;
use stella_app::Phase;
use stella_core::{Params, RouteId};
use stella_harness::{
    BROKEN_ROUTE, Effect, Journal, SimHost, Step, marketplace_routes, model::ROUTE_SLOTS,
    paused_runtime,
};

const ROLES: [&str; 3] = ["customer", "shopkeeper", "delivery_partner"];

fn role_strategy() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![1 => Just(None), 3 => prop::sample::select(ROLES.to_vec()).prop_map(Some)]
}

fn known_route() -> impl Strategy<Value = &'static str> {
    prop::sample::select(ROUTE_SLOTS[..ROUTE_SLOTS.len() - 1].to_vec())
}

fn host(role: Option<&str>) -> SimHost {
    let builder = SimHost::builder();
    let builder = match role {
        Some(role) => builder.signed_in(role),
        None => builder.anonymous(),
    };
    builder.build().unwrap()
}

fn landing(role: Option<&str>) -> &'static str {
    match role {
        None => "splash",
        Some("shopkeeper") => "shopkeeper-dashboard",
        Some("delivery_partner") => "delivery-dashboard",
        Some(_) => "customer-home",
    }
}

/// Walk the journal and check screen lifecycle ordering.
///
/// Every init happens with no other initialized screen still uncleaned, and
/// every screen except the live one is cleaned up exactly once.
fn check_lifecycle(journal: &Journal, live: usize) -> Result<(), String> {
    let mut cleanups: HashMap<u64, usize> = HashMap::new();
    let mut created = Vec::new();
    let mut initialized_uncleaned: Option<u64> = None;

    for effect in journal.effects() {
        match effect {
            Effect::Created { instance, .. } => created.push(instance),
            Effect::Initialized { instance, .. } => {
                if let Some(previous) = initialized_uncleaned {
                    return Err(format!(
                        "#{instance} initialized before #{previous} was cleaned up"
                    ));
                }
                initialized_uncleaned = Some(instance);
            },
            Effect::CleanedUp { instance, .. } => {
                *cleanups.entry(instance).or_default() += 1;
                if initialized_uncleaned == Some(instance) {
                    initialized_uncleaned = None;
                }
            },
            _ => {},
        }
    }

    let uncleaned: Vec<_> =
        created.iter().filter(|i| cleanups.get(i).copied().unwrap_or(0) == 0).collect();
    if uncleaned.len() != live {
        return Err(format!("uncleaned instances {uncleaned:?}, expected {live} live"));
    }
    if let Some((instance, count)) = cleanups.iter().find(|(_, count)| **count > 1) {
        return Err(format!("#{instance} cleaned up {count} times"));
    }
    Ok(())
}

proptest! {
    /// Unregistered routes settle on the safe default, or wherever the guard
    /// sends the session from there.
    #[test]
    fn prop_unknown_route_settles_on_safe_default(
        suffix in "[a-z]{1,8}",
        role in role_strategy(),
    ) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host = host(role);
            let route = format!("unregistered-{suffix}");

            host.go(&route).await.unwrap();

            let expected = match role {
                None => "login",
                Some(role) => landing(Some(role)),
            };
            prop_assert_eq!(host.controller.current_route().map(RouteId::as_str), Some(expected));
            host.assert_invariants("after unknown route");
            Ok(())
        })?;
    }

    /// Anonymous sessions never reach an auth-required screen.
    #[test]
    fn prop_auth_required_routes_redirect_to_login(route in known_route()) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host = host(None);
            let requires_auth = marketplace_routes()
                .iter()
                .any(|r| r.id == route && r.requires_auth);

            host.go(route).await.unwrap();

            let current = host.controller.current_route().cloned();
            if requires_auth {
                prop_assert_eq!(current, Some(RouteId::new("login")));
                let created =
                    |e: &Effect| matches!(e, Effect::Created { route: r, .. } if r == route);
                prop_assert_eq!(host.journal.count(created), 0);
            } else {
                prop_assert_eq!(current, Some(RouteId::new(route)));
            }
            Ok(())
        })?;
    }

    /// Signed-in roles outside a route's allowed set land on their own
    /// default route.
    #[test]
    fn prop_disallowed_role_lands_on_role_default(
        route in known_route(),
        role in prop::sample::select(ROLES.to_vec()),
    ) {
        prop_assume!(route != BROKEN_ROUTE);
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host = host(Some(role));
            let config = marketplace_routes().into_iter().find(|r| r.id == route).unwrap();
            let admitted = config.allowed_roles.is_empty()
                || config.allowed_roles.iter().any(|r| r.as_str() == role);

            host.go(route).await.unwrap();

            let expected = if admitted { route } else { landing(Some(role)) };
            prop_assert_eq!(host.controller.current_route().map(RouteId::as_str), Some(expected));
            Ok(())
        })?;
    }

    /// History never exceeds its limit, and evicts oldest first.
    #[test]
    fn prop_history_is_bounded(
        limit in 1usize..5,
        stores in prop::collection::vec(0u8..50, 1..20),
    ) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host =
                SimHost::builder().signed_in("customer").history_limit(limit).build().unwrap();
            host.go("customer-home").await.unwrap();

            // Alternate between two routes so every transition is recorded.
            let mut visited = vec!["customer-home".to_string()];
            for (i, store) in stores.iter().enumerate() {
                let route = if i % 2 == 0 { "product-grid" } else { "store-list" };
                host.go_with(route, &[("storeId", store.to_string().as_str())]).await.unwrap();
                visited.push(route.to_string());

                let history = host.controller.history();
                prop_assert!(history.len() <= limit);
            }

            let history: Vec<_> =
                host.controller.history().into_iter().map(|e| e.route_id.to_string()).collect();
            let recorded = &visited[..visited.len() - 1];
            let expected = &recorded[recorded.len().saturating_sub(limit)..];
            prop_assert_eq!(history.as_slice(), expected);
            Ok(())
        })?;
    }

    /// Going back with empty history lands on the session's default route.
    #[test]
    fn prop_back_on_empty_history_lands_on_role_default(role in role_strategy()) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host = host(role);

            host.controller.go_back().await.unwrap();

            prop_assert_eq!(
                host.controller.current_route().map(RouteId::as_str),
                Some(landing(role))
            );
            host.assert_invariants("after back on empty history");
            Ok(())
        })?;
    }

    /// Outgoing screens are cleaned up exactly once, before the next init.
    #[test]
    fn prop_cleanup_precedes_next_init(
        journey in prop::collection::vec(known_route(), 1..15),
        break_route in any::<bool>(),
    ) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host = host(Some("customer"));
            if break_route {
                host.scripts.fail(BROKEN_ROUTE, Step::Init);
            }

            for route in &journey {
                host.go(route).await.unwrap();
                host.assert_invariants(&format!("after navigating to {route}"));
            }

            let live = usize::from(host.controller.has_live_screen());
            prop_assert_eq!(check_lifecycle(&host.journal, live), Ok(()));
            Ok(())
        })?;
    }

    /// Navigating to the current route never records history.
    #[test]
    fn prop_self_navigation_is_not_recorded(
        route in prop::sample::select(vec!["customer-home", "store-list", "cart", "profile"]),
        repeats in 1usize..4,
    ) {
        let rt = paused_runtime().unwrap();
        rt.block_on(async {
            let mut host = host(Some("customer"));
            host.go("customer-home").await.unwrap();
            host.go(route).await.unwrap();
            let before = host.controller.history();

            for _ in 0..repeats {
                host.controller.navigate(route, Params::new(), true).await.unwrap();
            }

            prop_assert_eq!(host.controller.history(), before);
            prop_assert_eq!(host.controller.phase(), Phase::Idle);
            Ok(())
        })?;
    }
}
