use std::sync::OnceLock;

use widget_types::{
    DEFAULT_WEBHOOK_URL, ERROR_REPLY, FALLBACK_REPLY, INPUT_PLACEHOLDER, MAX_MESSAGE_CHARS,
    SENDING_LABEL, SEND_LABEL, SESSION_STORAGE_KEY, WELCOME_TEXT, WIDGET_SUBTITLE, WIDGET_TITLE,
};

/// Host-element attribute overriding the webhook URL.
pub const ATTR_WEBHOOK_URL: &str = "data-webhook-url";
pub const ATTR_TITLE: &str = "data-title";
pub const ATTR_SUBTITLE: &str = "data-subtitle";

/// Everything the widget needs to know about its host page and webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub webhook_url: String,
    pub session_storage_key: String,
    pub max_message_chars: usize,
    pub title: String,
    pub subtitle: String,
    pub welcome_text: String,
    pub placeholder: String,
    pub send_label: String,
    pub sending_label: String,
    pub fallback_reply: String,
    pub error_reply: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            webhook_url: DEFAULT_WEBHOOK_URL.to_string(),
            session_storage_key: SESSION_STORAGE_KEY.to_string(),
            max_message_chars: MAX_MESSAGE_CHARS,
            title: WIDGET_TITLE.to_string(),
            subtitle: WIDGET_SUBTITLE.to_string(),
            welcome_text: WELCOME_TEXT.to_string(),
            placeholder: INPUT_PLACEHOLDER.to_string(),
            send_label: SEND_LABEL.to_string(),
            sending_label: SENDING_LABEL.to_string(),
            fallback_reply: FALLBACK_REPLY.to_string(),
            error_reply: ERROR_REPLY.to_string(),
        }
    }
}

impl WidgetConfig {
    /// Apply `data-*` overrides read through `lookup`. Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(url) = read(ATTR_WEBHOOK_URL) {
            self.webhook_url = url;
        }
        if let Some(title) = read(ATTR_TITLE) {
            self.title = title;
        }
        if let Some(subtitle) = read(ATTR_SUBTITLE) {
            self.subtitle = subtitle;
        }
        self
    }
}

/// Set once by `mount`, read by components afterwards.
static WIDGET_CONFIG: OnceLock<WidgetConfig> = OnceLock::new();

/// Returns `false` if a config was already installed.
pub(crate) fn install_config(config: WidgetConfig) -> bool {
    WIDGET_CONFIG.set(config).is_ok()
}

pub(crate) fn is_installed() -> bool {
    WIDGET_CONFIG.get().is_some()
}

/// The mounted config, or the defaults when rendered outside of `mount`.
pub fn widget_config() -> WidgetConfig {
    WIDGET_CONFIG.get().cloned().unwrap_or_default()
}
