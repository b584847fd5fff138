//! Standard invariant checks.

use stella_app::Phase;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// A screen is live exactly when a route is current, and only while idle.
pub struct LiveScreenMatchesRoute;

impl Invariant for LiveScreenMatchesRoute {
    fn name(&self) -> &'static str {
        "live_screen_matches_route"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let nav = &state.navigation;
        if nav.has_live_screen != nav.current_route.is_some() {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "live screen: {}, current route: {:?}",
                    nav.has_live_screen, nav.current_route
                ),
            });
        }
        if nav.has_live_screen && nav.phase != Phase::Idle {
            return Err(Violation {
                invariant: self.name(),
                message: format!("screen live in phase {}", nav.phase),
            });
        }
        Ok(())
    }
}

/// A settled controller is never mid-transition.
pub struct NeverSettlesNavigating;

impl Invariant for NeverSettlesNavigating {
    fn name(&self) -> &'static str {
        "never_settles_navigating"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.navigation.phase == Phase::Navigating {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "settled while navigating to {:?}",
                    state.navigation.current_route
                ),
            });
        }
        Ok(())
    }
}

/// Internal history never exceeds its capacity.
pub struct HistoryBounded;

impl Invariant for HistoryBounded {
    fn name(&self) -> &'static str {
        "history_bounded"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let nav = &state.navigation;
        if nav.history.len() > nav.history_limit {
            return Err(Violation {
                invariant: self.name(),
                message: format!("{} entries, limit {}", nav.history.len(), nav.history_limit),
            });
        }
        Ok(())
    }
}

/// Interaction is re-enabled once a transition settles, successful or not.
pub struct InteractableWhenSettled;

impl Invariant for InteractableWhenSettled {
    fn name(&self) -> &'static str {
        "interactable_when_settled"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if !state.interactable {
            return Err(Violation {
                invariant: self.name(),
                message: format!("surface locked in phase {}", state.navigation.phase),
            });
        }
        Ok(())
    }
}

/// At most one screen instance exists, and it is the controller's.
pub struct SingleLiveScreen;

impl Invariant for SingleLiveScreen {
    fn name(&self) -> &'static str {
        "single_live_screen"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let expected = usize::from(state.navigation.has_live_screen);
        if state.live_screens != expected {
            return Err(Violation {
                invariant: self.name(),
                message: format!(
                    "{} screen instances alive, controller holds {expected}",
                    state.live_screens
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stella_core::{HistoryEntry, Params, RouteId};

    use super::*;

    fn settled_on(route: &str) -> SystemSnapshot {
        let mut state = SystemSnapshot::fresh(2);
        state.navigation.current_route = Some(RouteId::new(route));
        state.navigation.has_live_screen = true;
        state.live_screens = 1;
        state
    }

    #[test]
    fn settled_screen_passes() {
        let state = settled_on("cart");
        assert!(LiveScreenMatchesRoute.check(&state).is_ok());
        assert!(SingleLiveScreen.check(&state).is_ok());
    }

    #[test]
    fn route_without_screen_is_violation() {
        let mut state = settled_on("cart");
        state.navigation.has_live_screen = false;
        assert!(LiveScreenMatchesRoute.check(&state).is_err());
    }

    #[test]
    fn leaked_screen_is_violation() {
        let mut state = settled_on("cart");
        state.live_screens = 2;
        let violation = SingleLiveScreen.check(&state).err();
        assert_eq!(violation.map(|v| v.invariant), Some("single_live_screen"));
    }

    #[test]
    fn overfull_history_is_violation() {
        let mut state = settled_on("cart");
        for ts in 0..3 {
            let entry = HistoryEntry::new(RouteId::new("store-list"), Params::new(), ts);
            state.navigation.history.push(entry);
        }
        assert!(HistoryBounded.check(&state).is_err());
    }

    #[test]
    fn locked_surface_is_violation() {
        let mut state = settled_on("cart");
        state.interactable = false;
        assert!(InteractableWhenSettled.check(&state).is_err());
        state.navigation.phase = Phase::Navigating;
        assert!(NeverSettlesNavigating.check(&state).is_err());
    }
}
