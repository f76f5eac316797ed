use chrono::Local;
use dioxus::prelude::*;
use widget_types::{display_time, ChatMessage};

use crate::config::WidgetConfig;
use crate::interop::{
    focus_element, locale_time, schedule_scroll_to_bottom, INPUT_ID, MESSAGES_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Sending,
}

impl UiState {
    pub fn is_sending(self) -> bool {
        matches!(self, UiState::Sending)
    }

    pub fn button_label(self, config: &WidgetConfig) -> &str {
        match self {
            UiState::Idle => &config.send_label,
            UiState::Sending => &config.sending_label,
        }
    }
}

/// The rendering surface the submit cycle drives.
///
/// Messages are only ever appended; the typing indicator always sits after
/// the last message.
pub trait ChatView {
    fn append_message(&mut self, message: ChatMessage);
    fn set_typing_visible(&mut self, visible: bool);
    fn scroll_to_bottom(&mut self);
    fn set_ui_state(&mut self, state: UiState);
    fn clear_input(&mut self);
    fn focus_input(&mut self);
    fn set_welcome_time(&mut self, time: String);

    /// Current time as shown next to messages.
    fn display_time(&self) -> String {
        display_time(&Local::now())
    }
}

/// Enter submits; Shift+Enter does not.
pub fn submits_on_key(key: &Key, shift: bool) -> bool {
    *key == Key::Enter && !shift
}

/// Border feedback while typing, based on characters left before the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthFeedback {
    Normal,
    Warning,
    Critical,
}

impl LengthFeedback {
    pub fn for_length(chars: usize, max_chars: usize) -> Self {
        let remaining = max_chars.saturating_sub(chars);
        if remaining < 10 {
            LengthFeedback::Critical
        } else if remaining < 50 {
            LengthFeedback::Warning
        } else {
            LengthFeedback::Normal
        }
    }

    pub fn border_color(self) -> &'static str {
        match self {
            LengthFeedback::Normal => "#e9ecef",
            LengthFeedback::Warning => "#ffc107",
            LengthFeedback::Critical => "#dc3545",
        }
    }
}

/// `ChatView` backed by Dioxus signals; the component renders from them.
#[derive(Clone, Copy)]
pub struct SignalView {
    pub messages: Signal<Vec<ChatMessage>>,
    pub typing: Signal<bool>,
    pub ui_state: Signal<UiState>,
    pub input: Signal<String>,
    pub welcome_time: Signal<String>,
}

impl ChatView for SignalView {
    fn append_message(&mut self, message: ChatMessage) {
        self.messages.write().push(message);
    }

    fn set_typing_visible(&mut self, visible: bool) {
        self.typing.set(visible);
    }

    fn scroll_to_bottom(&mut self) {
        // Signal writes render on the next frame; scroll after that.
        schedule_scroll_to_bottom(MESSAGES_ID);
    }

    fn set_ui_state(&mut self, state: UiState) {
        self.ui_state.set(state);
    }

    fn clear_input(&mut self) {
        self.input.set(String::new());
    }

    fn focus_input(&mut self) {
        focus_element(INPUT_ID);
    }

    fn set_welcome_time(&mut self, time: String) {
        self.welcome_time.set(time);
    }

    fn display_time(&self) -> String {
        locale_time().unwrap_or_else(|| display_time(&Local::now()))
    }
}
