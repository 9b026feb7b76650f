//! Interception policy of the runtime shim.
//!
//! The JavaScript half (`runtime::shim`) takes no decisions. It cancels the
//! default action of every link click, form submission, script navigation
//! and uncaught error, then posts an [`InterceptEvent`] to the host. The host
//! runs [`RuntimeShim::intercept`] and answers with the [`ShimOutcome`]: the
//! shim shows the notice and, when `prevent_default` is false, replays the
//! cancelled action.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::relay::{is_external_url, InboundMessage};

/// `type` tag of an intercepted event posted by the shim to the host.
pub const INTERCEPT_MESSAGE_TYPE: &str = "preview-intercept";
/// `type` tag of the host's answer posted back into the preview.
pub const DECISION_MESSAGE_TYPE: &str = "livepen-decision";

// ── Notices ───────────────────────────────────────────────────────────

pub const NOTICE_UNCONNECTED_LINK: &str = "This link isn't connected yet";
pub const NOTICE_LOCAL_FILE_LINK: &str = "Local file links aren't available.";
pub const NOTICE_OPENING_LINK: &str = "Opening link in new tab\u{2026}";
pub const NOTICE_FORM_DISABLED: &str = "Form submission is disabled.";
pub const NOTICE_NAVIGATION_DISABLED: &str = "Navigation is disabled in the preview.";

/// How long a notice stays on screen.
pub const NOTICE_DURATION: Duration = Duration::from_millis(3000);

/// Lowercase fragments of errors caused by the sandbox itself rather than by
/// user code.
pub const SANDBOX_NOISE_PATTERNS: [&str; 6] = [
    "lockmanager",
    "securityerror",
    "the operation is insecure",
    "access is denied for this document",
    "sandboxed",
    "blocked a frame with origin",
];

/// Message browsers report for errors from opaque (cross-origin) scripts.
pub const OPAQUE_SCRIPT_ERROR: &str = "script error.";

// ── Decisions ─────────────────────────────────────────────────────────

/// What the shim does with a click on `<a href=...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// In-page anchor whose target exists: let the browser scroll.
    ScrollInPage,
    /// Leave the click to the browser (`mailto:`, `tel:`).
    Passthrough,
    /// Placeholder link (`""`, `#`, `javascript:void(0)`).
    NotConnected,
    /// Relative or unknown-scheme link that would try to load a local file.
    LocalFile,
    /// Absolute http(s) link: ask the host to open it.
    OpenExternal(String),
}

/// Classify a link click. `anchor_exists` is asked, at click time, whether
/// an element with the given id is in the document.
pub fn classify_link(href: &str, anchor_exists: impl Fn(&str) -> bool) -> LinkAction {
    let href = href.trim();
    if let Some(id) = href.strip_prefix('#') {
        if !id.is_empty() && anchor_exists(id) {
            return LinkAction::ScrollInPage;
        }
    }

    let lower = href.to_ascii_lowercase();
    if lower.is_empty() || lower == "#" || lower == "javascript:void(0)" || lower == "javascript:void(0);" {
        return LinkAction::NotConnected;
    }
    if is_external_url(href) {
        return LinkAction::OpenExternal(href.to_string());
    }
    if lower.starts_with("mailto:") || lower.starts_with("tel:") {
        return LinkAction::Passthrough;
    }
    LinkAction::LocalFile
}

/// Whether a form submission may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Allow,
    Block,
}

/// Forms may only submit to absolute http(s) actions.
pub fn classify_form(action: &str) -> FormAction {
    if is_external_url(action) {
        FormAction::Allow
    } else {
        FormAction::Block
    }
}

/// True for errors inherent to the sandbox that must never reach the user.
pub fn is_sandbox_noise(message: &str) -> bool {
    let lower = message.trim().to_ascii_lowercase();
    lower == OPAQUE_SCRIPT_ERROR || SANDBOX_NOISE_PATTERNS.iter().any(|p| lower.contains(p))
}

// ── Shim model ────────────────────────────────────────────────────────

/// A DOM-level event the shim intercepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimEvent<'a> {
    LinkClick { href: &'a str },
    FormSubmit { action: &'a str },
    LocationChange { url: &'a str },
    UncaughtError { message: &'a str },
    UnhandledRejection { reason: &'a str },
}

/// The wire form of a [`ShimEvent`], as posted by the shim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InterceptEvent {
    Link {
        href: String,
        /// The `#fragment` target was in the document at click time.
        #[serde(default)]
        anchor: bool,
    },
    Form {
        #[serde(default)]
        action: String,
    },
    Navigate {
        url: String,
    },
    Error {
        message: String,
    },
    Rejection {
        reason: String,
    },
}

impl InterceptEvent {
    pub fn as_event(&self) -> ShimEvent<'_> {
        match self {
            InterceptEvent::Link { href, .. } => ShimEvent::LinkClick { href },
            InterceptEvent::Form { action } => ShimEvent::FormSubmit { action },
            InterceptEvent::Navigate { url } => ShimEvent::LocationChange { url },
            InterceptEvent::Error { message } => ShimEvent::UncaughtError { message },
            InterceptEvent::Rejection { reason } => ShimEvent::UnhandledRejection { reason },
        }
    }
}

/// The shim's response to one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShimOutcome {
    /// The default browser action was cancelled.
    pub prevent_default: bool,
    /// Notice displayed as a result, if any.
    pub notice: Option<&'static str>,
    /// Message posted to the host, if any.
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Clone)]
struct Notice {
    text: &'static str,
    hide_at: Instant,
}

/// Model of one shim instance: created fresh for every render token.
#[derive(Debug, Clone, Default)]
pub struct RuntimeShim {
    anchors: Vec<String>,
    notice: Option<Notice>,
    notices_shown: usize,
}

impl RuntimeShim {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a shim for a document containing elements with these ids.
    pub fn with_anchors<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            anchors: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// User script added an element with `id` to the document.
    pub fn add_anchor(&mut self, id: impl Into<String>) {
        self.anchors.push(id.into());
    }

    /// Decide an event posted by the shim. A link whose fragment target
    /// exists registers that anchor first, so later clicks agree with it.
    pub fn intercept(&mut self, event: &InterceptEvent, now: Instant) -> ShimOutcome {
        if let InterceptEvent::Link { href, anchor: true } = event {
            if let Some(id) = href.trim().strip_prefix('#') {
                if !id.is_empty() && !self.anchors.iter().any(|a| a == id) {
                    self.add_anchor(id);
                }
            }
        }
        self.handle(event.as_event(), now)
    }

    pub fn handle(&mut self, event: ShimEvent<'_>, now: Instant) -> ShimOutcome {
        match event {
            ShimEvent::LinkClick { href } => {
                let anchors = &self.anchors;
                match classify_link(href, |id| anchors.iter().any(|a| a == id)) {
                    LinkAction::ScrollInPage | LinkAction::Passthrough => ShimOutcome::default(),
                    LinkAction::NotConnected => self.block(NOTICE_UNCONNECTED_LINK, now),
                    LinkAction::LocalFile => self.block(NOTICE_LOCAL_FILE_LINK, now),
                    LinkAction::OpenExternal(url) => ShimOutcome {
                        message: Some(InboundMessage::OpenUrl { url }),
                        ..self.block(NOTICE_OPENING_LINK, now)
                    },
                }
            }
            ShimEvent::FormSubmit { action } => match classify_form(action) {
                FormAction::Allow => ShimOutcome::default(),
                FormAction::Block => self.block(NOTICE_FORM_DISABLED, now),
            },
            // Only reachable where the browser exposes the Navigation API;
            // elsewhere script navigation is not intercepted at all.
            ShimEvent::LocationChange { url } if url.trim().starts_with('#') => {
                ShimOutcome::default()
            }
            ShimEvent::LocationChange { .. } => self.block(NOTICE_NAVIGATION_DISABLED, now),
            ShimEvent::UncaughtError { message } | ShimEvent::UnhandledRejection { reason: message } => {
                // Errors are always marked handled; noise is just not forwarded.
                let message = if is_sandbox_noise(message) {
                    None
                } else {
                    Some(InboundMessage::Error {
                        message: message.to_string(),
                    })
                };
                ShimOutcome {
                    prevent_default: true,
                    notice: None,
                    message,
                }
            }
        }
    }

    /// Notice visible at `now`, if any.
    pub fn visible_notice(&self, now: Instant) -> Option<&'static str> {
        self.notice
            .as_ref()
            .filter(|n| now < n.hide_at)
            .map(|n| n.text)
    }

    /// Total notices displayed so far.
    pub fn notices_shown(&self) -> usize {
        self.notices_shown
    }

    fn block(&mut self, text: &'static str, now: Instant) -> ShimOutcome {
        // A new notice replaces the old one and restarts the hide timer.
        self.notice = Some(Notice {
            text,
            hide_at: now + NOTICE_DURATION,
        });
        self.notices_shown += 1;
        ShimOutcome {
            prevent_default: true,
            notice: Some(text),
            message: None,
        }
    }
}
