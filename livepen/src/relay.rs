//! Host message relay: the typed contract between the preview document and
//! the host page.
//!
//! Messages are plain JSON objects, either posted by the preview or produced
//! by [`crate::intercept::RuntimeShim`] for an intercepted event. Only the
//! two shapes below are accepted; anything else is dropped without error.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// `type` tag of an error message on the wire.
pub const ERROR_MESSAGE_TYPE: &str = "preview-error";
/// `type` tag of an open-url message on the wire.
pub const OPEN_URL_MESSAGE_TYPE: &str = "preview-open-url";

/// A message emitted by the runtime shim inside the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// An uncaught error or rejection in user code.
    #[serde(rename = "preview-error")]
    Error { message: String },

    /// A request to open an external link outside the preview.
    #[serde(rename = "preview-open-url")]
    OpenUrl { url: String },
}

impl InboundMessage {
    /// Parse a raw JSON message. Unknown or malformed shapes yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Validate an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// What the host must do in response to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayAction {
    /// Display (or replace) the inline error banner.
    ShowError(String),
    /// Open the URL in a new top-level browsing context.
    OpenInNewTab(String),
    /// Nothing to do.
    Ignored,
}

/// Host-side state of the relay: subscription and the current error banner.
#[derive(Debug, Clone, Default)]
pub struct MessageRelay {
    subscribed: bool,
    banner: Option<String>,
}

impl MessageRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening; called when the render host mounts.
    pub fn subscribe(&mut self) {
        self.subscribed = true;
    }

    /// Stop listening; called when the render host unmounts.
    pub fn unsubscribe(&mut self) {
        self.subscribed = false;
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Route one message. Each message is consumed exactly once.
    pub fn receive(&mut self, message: InboundMessage) -> RelayAction {
        if !self.subscribed {
            debug!("relay not subscribed, dropping message");
            return RelayAction::Ignored;
        }
        match message {
            InboundMessage::Error { message } => {
                debug!(%message, "preview error");
                self.banner = Some(message.clone());
                RelayAction::ShowError(message)
            }
            InboundMessage::OpenUrl { url } => {
                if is_external_url(&url) {
                    debug!(%url, "opening preview link in new tab");
                    RelayAction::OpenInNewTab(url)
                } else {
                    debug!(%url, "refusing non-http url from preview");
                    RelayAction::Ignored
                }
            }
        }
    }

    /// Parse and route a raw JSON message.
    pub fn receive_raw(&mut self, raw: &str) -> RelayAction {
        match InboundMessage::parse(raw) {
            Some(message) => self.receive(message),
            None => RelayAction::Ignored,
        }
    }

    /// Latest error, if one is showing.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// User closed the banner.
    pub fn dismiss(&mut self) {
        self.banner = None;
    }

    /// Any buffer edit acknowledges the error.
    pub fn on_buffer_changed(&mut self) {
        self.banner = None;
    }
}

/// Absolute `http://` or `https://` URL.
pub fn is_external_url(url: &str) -> bool {
    let url = url.trim();
    ["http://", "https://"]
        .iter()
        .any(|p| {
            url.len() > p.len()
                && url.get(..p.len()).is_some_and(|head| head.eq_ignore_ascii_case(p))
        })
}
