//! Ordered record of every host effect and screen lifecycle call.
//!
//! All simulated collaborators and scripted screens of one [`crate::SimHost`]
//! share a single [`Journal`], so ordering across them (cleanup of the old
//! screen before init of the new one, chrome after init) can be asserted
//! directly.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;

/// One observed effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// A screen instance was constructed.
    Created {
        /// Route the screen was built for.
        route: String,
        /// Instance number, unique per host.
        instance: u64,
    },
    /// A screen rendered.
    Rendered {
        /// Route of the screen.
        route: String,
        /// Instance number.
        instance: u64,
    },
    /// A screen finished `init`.
    Initialized {
        /// Route of the screen.
        route: String,
        /// Instance number.
        instance: u64,
    },
    /// A screen ran `cleanup`.
    CleanedUp {
        /// Route of the screen.
        route: String,
        /// Instance number.
        instance: u64,
    },
    /// A screen ran `preload`.
    Preloaded {
        /// Route of the screen.
        route: String,
        /// Instance number.
        instance: u64,
    },
    /// Rendered output replaced the surface content.
    Applied {
        /// Markup, or `node:<id>` for host nodes.
        content: String,
    },
    /// The surface scrolled to the top.
    ScrolledToTop,
    /// Interaction was enabled or disabled.
    Interactable {
        /// New state.
        enabled: bool,
    },
    /// Chrome visibility changed.
    Chrome {
        /// Bottom bar shown.
        bottom_nav: bool,
        /// Action button shown.
        action_button: bool,
    },
    /// Visible title changed.
    Title {
        /// New title.
        title: String,
    },
    /// Document title changed.
    DocumentTitle {
        /// New title.
        title: String,
    },
    /// Bottom bar highlight moved.
    ActiveTab {
        /// Highlighted route.
        route: String,
    },
    /// A notification was shown.
    Notified {
        /// Message text.
        message: String,
        /// Severity label.
        severity: String,
    },
    /// A native history entry was pushed.
    PushState {
        /// URL fragment of the entry.
        fragment: String,
        /// Title passed with the entry.
        title: String,
    },
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { route, instance } => write!(f, "create {route}#{instance}"),
            Self::Rendered { route, instance } => write!(f, "render {route}#{instance}"),
            Self::Initialized { route, instance } => write!(f, "init {route}#{instance}"),
            Self::CleanedUp { route, instance } => write!(f, "cleanup {route}#{instance}"),
            Self::Preloaded { route, instance } => write!(f, "preload {route}#{instance}"),
            Self::Applied { content } => write!(f, "apply {content}"),
            Self::ScrolledToTop => f.write_str("scroll-top"),
            Self::Interactable { enabled } => write!(f, "interactable {enabled}"),
            Self::Chrome { bottom_nav, action_button } => {
                write!(f, "chrome nav={bottom_nav} action={action_button}")
            },
            Self::Title { title } => write!(f, "title {title}"),
            Self::DocumentTitle { title } => write!(f, "document-title {title}"),
            Self::ActiveTab { route } => write!(f, "active-tab {route}"),
            Self::Notified { message, severity } => write!(f, "notify {severity}: {message}"),
            Self::PushState { fragment, title } => write!(f, "push-state {fragment} ({title})"),
        }
    }
}

/// Shared, append-only effect log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    effects: Arc<Mutex<Vec<Effect>>>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect.
    pub fn record(&self, effect: Effect) {
        tracing::trace!("journal: {effect}");
        self.lock().push(effect);
    }

    /// Copy of every recorded effect, in order.
    pub fn effects(&self) -> Vec<Effect> {
        self.lock().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of effects matching `pred`.
    pub fn count(&self, pred: impl Fn(&Effect) -> bool) -> usize {
        self.lock().iter().filter(|effect| pred(effect)).count()
    }

    /// Position of the first effect matching `pred`.
    pub fn position(&self, pred: impl Fn(&Effect) -> bool) -> Option<usize> {
        self.lock().iter().position(pred)
    }

    /// One line per effect, for snapshot assertions.
    pub fn lines(&self) -> String {
        self.lock().iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Effect>> {
        self.effects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_follow_record_order() {
        let journal = Journal::new();
        journal.record(Effect::Interactable { enabled: false });
        journal.record(Effect::Created { route: "cart".into(), instance: 3 });
        journal.record(Effect::Title { title: "Shopping Cart".into() });

        assert_eq!(journal.lines(), "interactable false\ncreate cart#3\ntitle Shopping Cart");
        assert_eq!(journal.count(|e| matches!(e, Effect::Created { .. })), 1);
        assert_eq!(journal.position(|e| matches!(e, Effect::Title { .. })), Some(2));
    }

    #[test]
    fn clones_share_the_log() {
        let journal = Journal::new();
        let other = journal.clone();
        other.record(Effect::ScrolledToTop);
        assert_eq!(journal.effects(), vec![Effect::ScrolledToTop]);

        journal.clear();
        assert!(other.effects().is_empty());
    }
}
