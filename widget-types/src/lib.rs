//! Wire contract and message model for the chat widget
//!
//! These types are used by:
//! - the Dioxus widget (WASM), to build requests and render messages
//! - native unit tests, which exercise the reply rules without a browser
//!
//! Serializable with serde for JSON over HTTP

use std::fmt;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Webhook the widget posts to when the host page does not override it.
pub const DEFAULT_WEBHOOK_URL: &str =
    "https://s1q.app.n8n.cloud/webhook/a0346096-8293-40c4-9c03-6db5c5857a82/chat";

/// Session storage key holding the session identifier.
pub const SESSION_STORAGE_KEY: &str = "chatSessionId";

/// Maximum characters accepted by the input field.
pub const MAX_MESSAGE_CHARS: usize = 500;

pub const WIDGET_TITLE: &str = "💬 Chat Support";
pub const WIDGET_SUBTITLE: &str = "We're here to help you!";
pub const WELCOME_TEXT: &str =
    "👋 Hello! Welcome to our chat support. How can I help you today?";
pub const INPUT_PLACEHOLDER: &str = "Type your message...";
pub const SEND_LABEL: &str = "Send";
pub const SENDING_LABEL: &str = "Sending...";

/// Rendered when the webhook answers without a usable `response` or `message`.
pub const FALLBACK_REPLY: &str =
    "Thank you for your message! I have received it and will get back to you soon.";

/// Rendered when the webhook call fails at the transport level.
pub const ERROR_REPLY: &str = "Sorry, there was an error sending your message. Please try again.";

const SESSION_PREFIX: &str = "session_";
const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Chat message for UI display
///
/// Immutable once rendered. `timestamp` is already formatted for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: Sender, timestamp: impl Into<String>) -> Self {
        Self {
            id: format!("{}-{}", sender.as_str(), uuid::Uuid::new_v4()),
            text: text.into(),
            sender,
            timestamp: timestamp.into(),
        }
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

/// Hour:minute display form used for message and welcome timestamps.
pub fn display_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    at.format("%H:%M").to_string()
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g.
/// `2024-03-01T09:15:00.000Z`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ============================================================================
// Session identifier
// ============================================================================

/// Opaque per-tab correlation token: `session_<epoch millis>_<9 base-36 chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        Self::from_parts(now.timestamp_millis(), uuid::Uuid::new_v4().as_u128())
    }

    pub fn from_parts(epoch_millis: i64, entropy: u128) -> Self {
        Self(format!(
            "{SESSION_PREFIX}{epoch_millis}_{}",
            base36_suffix(entropy)
        ))
    }

    /// Wrap a value read back from storage. Empty values count as absent.
    pub fn from_stored(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn base36_suffix(mut entropy: u128) -> String {
    let mut digits = [b'0'; SESSION_SUFFIX_LEN];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(entropy % 36) as usize];
        entropy /= 36;
    }
    digits.iter().map(|&b| char::from(b)).collect()
}

// ============================================================================
// Webhook contract
// ============================================================================

/// Body of the single `POST` issued per user message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub message: String,
    pub timestamp: String,
    pub session_id: String,
}

impl WebhookRequest {
    pub fn new(message: impl Into<String>, session_id: &SessionId, sent_at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            timestamp: iso_timestamp(sent_at),
            session_id: session_id.as_str().to_string(),
        }
    }
}

/// Which part of a successful reply ended up on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Response,
    Message,
    Fallback,
}

/// The recognised fields of a successful webhook reply.
///
/// Only non-empty strings count. Any other JSON shape (arrays, `null`,
/// numbers, objects without these fields) yields an empty reply and therefore
/// the fallback text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookReply {
    pub response: Option<String>,
    pub message: Option<String>,
}

impl WebhookReply {
    pub fn from_value(body: &serde_json::Value) -> Self {
        Self {
            response: non_empty_field(body, "response"),
            message: non_empty_field(body, "message"),
        }
    }

    /// `response` wins over `message` when both are present.
    pub fn resolve(&self) -> Option<(ReplySource, &str)> {
        self.response
            .as_deref()
            .map(|text| (ReplySource::Response, text))
            .or_else(|| {
                self.message
                    .as_deref()
                    .map(|text| (ReplySource::Message, text))
            })
    }

    pub fn into_text(self, fallback: &str) -> (ReplySource, String) {
        match self.resolve() {
            Some((source, text)) => (source, text.to_string()),
            None => (ReplySource::Fallback, fallback.to_string()),
        }
    }
}

fn non_empty_field(body: &serde_json::Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(|v| v.as_str())
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

// ============================================================================
// Tests
// ============================================================================
