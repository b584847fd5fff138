//! Recording host collaborators.
//!
//! Each collaborator writes what it was asked to do into the shared
//! [`Journal`] and keeps just enough state for invariant checks (current
//! interactability, pushed native entries).

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use stella_app::{
    ChromeController, NativeHistory, Notifier, RenderOutput, RenderSurface, Severity, SurfaceError,
};
use stella_core::{ChromeSpec, Location, RouteId};

use crate::{Effect, Journal};

/// Rendering surface that records every write.
#[derive(Debug)]
pub struct RecordingSurface {
    journal: Journal,
    interactable: AtomicBool,
    reject: AtomicBool,
}

impl RecordingSurface {
    /// Create a surface recording into `journal`.
    pub fn new(journal: Journal) -> Self {
        Self { journal, interactable: AtomicBool::new(true), reject: AtomicBool::new(false) }
    }

    /// Current interactability.
    pub fn is_interactable(&self) -> bool {
        self.interactable.load(Ordering::SeqCst)
    }

    /// Make every subsequent `apply` fail (or succeed again).
    pub fn reject_output(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

impl RenderSurface for RecordingSurface {
    fn apply(&self, output: RenderOutput) -> Result<(), SurfaceError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(SurfaceError("surface detached".into()));
        }
        let content = match output {
            RenderOutput::Markup(markup) => markup,
            RenderOutput::Node(handle) => format!("node:{}", handle.0),
        };
        self.journal.record(Effect::Applied { content });
        Ok(())
    }

    fn set_interactable(&self, interactable: bool) {
        self.interactable.store(interactable, Ordering::SeqCst);
        self.journal.record(Effect::Interactable { enabled: interactable });
    }

    fn scroll_to_top(&self) {
        self.journal.record(Effect::ScrolledToTop);
    }
}

/// Chrome that records every update.
#[derive(Debug)]
pub struct RecordingChrome {
    journal: Journal,
}

impl RecordingChrome {
    /// Create chrome recording into `journal`.
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl ChromeController for RecordingChrome {
    fn set_visibility(&self, chrome: ChromeSpec) {
        self.journal.record(Effect::Chrome {
            bottom_nav: chrome.show_bottom_nav,
            action_button: chrome.show_action_button,
        });
    }

    fn set_title(&self, title: &str) {
        self.journal.record(Effect::Title { title: title.to_string() });
    }

    fn set_document_title(&self, title: &str) {
        self.journal.record(Effect::DocumentTitle { title: title.to_string() });
    }

    fn set_active_tab(&self, route: &RouteId) {
        self.journal.record(Effect::ActiveTab { route: route.to_string() });
    }
}

/// Notifier that records every message.
#[derive(Debug)]
pub struct RecordingNotifier {
    journal: Journal,
}

impl RecordingNotifier {
    /// Create a notifier recording into `journal`.
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.journal.record(Effect::Notified {
            message: message.to_string(),
            severity: severity.to_string(),
        });
    }
}

/// In-memory native history with an address bar.
#[derive(Debug)]
pub struct SimHistory {
    journal: Journal,
    entries: Mutex<Vec<Location>>,
    address: Mutex<Option<Location>>,
}

impl SimHistory {
    /// Create an empty history recording into `journal`.
    pub fn new(journal: Journal) -> Self {
        Self { journal, entries: Mutex::new(Vec::new()), address: Mutex::new(None) }
    }

    /// Put `fragment` in the address bar, as if the app was opened with it.
    pub fn open_at(&self, fragment: &str) {
        *lock(&self.address) = Location::from_fragment(fragment);
    }

    /// Every pushed entry, oldest first.
    pub fn entries(&self) -> Vec<Location> {
        lock(&self.entries).clone()
    }
}

#[async_trait]
impl NativeHistory for SimHistory {
    async fn push_state(&self, location: &Location, title: &str) {
        self.journal.record(Effect::PushState {
            fragment: location.to_fragment(),
            title: title.to_string(),
        });
        lock(&self.entries).push(location.clone());
        *lock(&self.address) = Some(location.clone());
    }

    fn current_location(&self) -> Option<Location> {
        lock(&self.address).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
