//! Observable state snapshots for invariant checking.

use stella_app::{NavigationSnapshot, Phase};
use stella_core::Params;

/// Controller view plus what the simulated host observed.
#[derive(Debug, Clone)]
pub struct SystemSnapshot {
    /// Controller's own view.
    pub navigation: NavigationSnapshot,
    /// Surface accepts interaction.
    pub interactable: bool,
    /// Screen instances constructed and not yet dropped.
    pub live_screens: usize,
    /// Native history entries pushed so far.
    pub native_entries: usize,
}

impl SystemSnapshot {
    /// Snapshot of a controller that has not navigated yet.
    pub fn fresh(history_limit: usize) -> Self {
        Self {
            navigation: NavigationSnapshot {
                current_route: None,
                current_params: Params::new(),
                phase: Phase::Idle,
                has_live_screen: false,
                history: Vec::new(),
                history_limit,
            },
            interactable: true,
            live_screens: 0,
            native_entries: 0,
        }
    }
}
