//! Line-oriented host collaborators.
//!
//! Everything the controller drives is printed as one tagged line on the
//! console, so a session reads like a transcript:
//!
//! ```text
//! [url] #cart
//! <main class="cart"><h1>Shopping Cart</h1></main>
//! [chrome] bottom-nav=on action=off
//! [title] Shopping Cart
//! ```

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use stella_app::{
    ChromeController, NativeHistory, Notifier, RenderOutput, RenderSurface, Severity, SurfaceError,
};
use stella_core::{ChromeSpec, Location, RouteId};

/// Shared output sink.
#[derive(Clone)]
pub struct Console {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Console {
    /// Console writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Console writing to any sink.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self { out: Arc::new(Mutex::new(Box::new(out))) }
    }

    /// Console writing into memory, and a handle for reading it back.
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        (Self::new(capture.clone()), capture)
    }

    /// Write one line.
    pub fn line(&self, text: impl AsRef<str>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{}", text.as_ref()).and_then(|()| out.flush()) {
            tracing::warn!("Console write failed: {e}");
        }
    }
}

/// In-memory console output.
#[derive(Clone, Default)]
pub struct Capture {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl Capture {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Prints rendered markup.
pub struct TerminalSurface {
    console: Console,
}

impl TerminalSurface {
    /// Create a surface printing to `console`.
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl RenderSurface for TerminalSurface {
    fn apply(&self, output: RenderOutput) -> Result<(), SurfaceError> {
        match output {
            RenderOutput::Markup(markup) => {
                self.console.line(markup);
                Ok(())
            },
            RenderOutput::Node(handle) => {
                Err(SurfaceError(format!("cannot mount node {} on a terminal", handle.0)))
            },
        }
    }

    fn set_interactable(&self, interactable: bool) {
        tracing::trace!("Input {}", if interactable { "unlocked" } else { "locked" });
    }

    fn scroll_to_top(&self) {}
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Prints chrome changes.
pub struct TerminalChrome {
    console: Console,
    app_name: String,
}

impl TerminalChrome {
    /// Create chrome printing to `console`.
    pub fn new(console: Console, app_name: impl Into<String>) -> Self {
        Self { console, app_name: app_name.into() }
    }
}

impl ChromeController for TerminalChrome {
    fn set_visibility(&self, chrome: ChromeSpec) {
        self.console.line(format!(
            "[chrome] bottom-nav={} action={}",
            on_off(chrome.show_bottom_nav),
            on_off(chrome.show_action_button)
        ));
    }

    fn set_title(&self, title: &str) {
        self.console.line(format!("[title] {title}"));
    }

    fn set_document_title(&self, title: &str) {
        // The visible title already carries it; only log the window title.
        tracing::debug!("Window title: {title} ({})", self.app_name);
    }

    fn set_active_tab(&self, route: &RouteId) {
        self.console.line(format!("[tab] {route}"));
    }
}

/// Prints notifications.
pub struct TerminalNotifier {
    console: Console,
}

impl TerminalNotifier {
    /// Create a notifier printing to `console`.
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.console.line(format!("[{severity}] {message}"));
    }
}

/// Address bar and native history.
pub struct TerminalHistory {
    console: Console,
    address: Mutex<Option<String>>,
}

impl TerminalHistory {
    /// Create a history with an optional initial address.
    pub fn new(console: Console, address: Option<String>) -> Self {
        Self { console, address: Mutex::new(address) }
    }

    /// Fragment currently in the address bar.
    pub fn address(&self) -> Option<String> {
        self.address.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the address bar content without pushing an entry, as a native
    /// back/forward event does.
    pub fn set_address(&self, fragment: impl Into<String>) {
        *self.address.lock().unwrap_or_else(PoisonError::into_inner) = Some(fragment.into());
    }
}

#[async_trait]
impl NativeHistory for TerminalHistory {
    async fn push_state(&self, location: &Location, _title: &str) {
        let fragment = location.to_fragment();
        self.console.line(format!("[url] {fragment}"));
        self.set_address(fragment);
    }

    fn current_location(&self) -> Option<Location> {
        self.address().as_deref().and_then(Location::from_fragment)
    }
}

#[cfg(test)]
mod tests {
    use stella_core::Params;

    use super::*;

    #[test]
    fn chrome_prints_flags_and_titles() {
        let (console, capture) = Console::capture();
        let chrome = TerminalChrome::new(console, "Stella");

        chrome.set_visibility(ChromeSpec { show_bottom_nav: true, show_action_button: false });
        chrome.set_title("Stores");
        chrome.set_document_title("Stores - Stella");
        chrome.set_active_tab(&RouteId::new("store-list"));

        assert_eq!(
            capture.contents(),
            "[chrome] bottom-nav=on action=off\n[title] Stores\n[tab] store-list\n"
        );
    }

    #[test]
    fn surface_rejects_nodes() {
        let (console, capture) = Console::capture();
        let surface = TerminalSurface::new(console);

        assert!(surface.apply(RenderOutput::Markup("<main></main>".into())).is_ok());
        assert!(surface.apply(RenderOutput::Node(stella_app::NodeHandle(3))).is_err());
        assert_eq!(capture.contents(), "<main></main>\n");
    }

    #[tokio::test]
    async fn push_state_updates_address() {
        let (console, capture) = Console::capture();
        let history = TerminalHistory::new(console, None);
        assert_eq!(history.current_location(), None);

        let mut params = Params::new();
        params.insert("orderId".into(), "42".into());
        let location = Location::new(RouteId::new("order-tracking"), params);
        history.push_state(&location, "My Orders").await;

        assert_eq!(history.current_location(), Some(location));
        assert_eq!(capture.contents(), "[url] #order-tracking/orderId=42\n");
    }
}
