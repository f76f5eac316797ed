//! The chat widget's submit cycle, independent of the DOM.
//!
//! `ChatWidget` drives a [`ChatView`], posts through a [`WebhookTransport`]
//! and keeps its session identifier in a [`SessionStore`]. The browser build
//! wires these to Dioxus signals, `fetch` and `sessionStorage`; tests wire
//! them to in-memory fakes.

use chrono::Utc;
use dioxus_logger::tracing::error;
use widget_types::{ChatMessage, ReplySource, Sender, SessionId, WebhookRequest};

use crate::config::WidgetConfig;
use crate::session::{load_or_create_session_id, SessionStore};
use crate::transport::WebhookTransport;
use crate::view::{ChatView, UiState};

/// What a call to [`ChatWidget::submit`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing rendered, nothing sent.
    Ignored,
    /// The webhook answered; the bot message came from this source.
    Replied(ReplySource),
    /// The webhook call failed; the apology message was rendered.
    Failed,
}

#[derive(Debug, Clone)]
pub struct ChatWidget<V, T, S> {
    view: V,
    transport: T,
    store: S,
    config: WidgetConfig,
}

impl<V, T, S> ChatWidget<V, T, S>
where
    V: ChatView,
    T: WebhookTransport,
    S: SessionStore,
{
    pub fn new(view: V, transport: T, store: S, config: WidgetConfig) -> Self {
        Self {
            view,
            transport,
            store,
            config,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Stamp the greeting with the current local time.
    pub fn set_welcome_time(&mut self) {
        let time = self.view.display_time();
        self.view.set_welcome_time(time);
    }

    pub fn session_identifier(&self) -> SessionId {
        load_or_create_session_id(&self.store, &self.config.session_storage_key, Utc::now())
    }

    pub fn render_message(&mut self, text: &str, is_from_user: bool) {
        let sender = if is_from_user { Sender::User } else { Sender::Bot };
        let timestamp = self.view.display_time();
        self.view
            .append_message(ChatMessage::new(text, sender, timestamp));
        self.view.scroll_to_bottom();
    }

    pub fn toggle_typing(&mut self, visible: bool) {
        self.view.set_typing_visible(visible);
        if visible {
            self.view.scroll_to_bottom();
        }
    }

    /// Render the user's message, post it, render the reply.
    ///
    /// Transport failures never escape: they are logged and answered with the
    /// configured apology. Whatever happens, the widget ends idle with the
    /// input focused.
    pub async fn submit(&mut self, raw_text: &str) -> SubmitOutcome {
        let text = raw_text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.render_message(text, true);
        self.view.clear_input();
        self.view.set_ui_state(UiState::Sending);
        self.toggle_typing(true);

        let request = WebhookRequest::new(text, &self.session_identifier(), Utc::now());
        let result = self.transport.post(&request).await;

        self.toggle_typing(false);

        let outcome = match result {
            Ok(reply) => {
                let (source, reply_text) = reply.into_text(&self.config.fallback_reply);
                self.render_message(&reply_text, false);
                SubmitOutcome::Replied(source)
            }
            Err(e) => {
                error!("Error sending message: {}", e);
                let apology = self.config.error_reply.clone();
                self.render_message(&apology, false);
                SubmitOutcome::Failed
            }
        };

        self.view.set_ui_state(UiState::Idle);
        self.view.focus_input();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use widget_types::{WebhookReply, ERROR_REPLY, FALLBACK_REPLY, SESSION_STORAGE_KEY};

    use super::*;
    use crate::session::MemoryStore;
    use crate::transport::WebhookError;

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Append(ChatMessage),
        Typing(bool),
        Scroll,
        Ui(UiState),
        ClearInput,
        Focus,
        WelcomeTime(String),
    }

    #[derive(Debug, Clone, Default)]
    struct FakeView {
        events: Rc<RefCell<Vec<ViewEvent>>>,
        clock: Option<&'static str>,
    }

    impl FakeView {
        fn events(&self) -> Vec<ViewEvent> {
            self.events.borrow().clone()
        }

        fn messages(&self) -> Vec<ChatMessage> {
            self.events
                .borrow()
                .iter()
                .filter_map(|event| match event {
                    ViewEvent::Append(message) => Some(message.clone()),
                    _ => None,
                })
                .collect()
        }

        fn typing_visible(&self) -> bool {
            self.events
                .borrow()
                .iter()
                .rev()
                .find_map(|event| match event {
                    ViewEvent::Typing(visible) => Some(*visible),
                    _ => None,
                })
                .unwrap_or(false)
        }

        fn ui_state(&self) -> UiState {
            self.events
                .borrow()
                .iter()
                .rev()
                .find_map(|event| match event {
                    ViewEvent::Ui(state) => Some(*state),
                    _ => None,
                })
                .unwrap_or_default()
        }

        fn push(&self, event: ViewEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    impl ChatView for FakeView {
        fn append_message(&mut self, message: ChatMessage) {
            self.push(ViewEvent::Append(message));
        }

        fn set_typing_visible(&mut self, visible: bool) {
            self.push(ViewEvent::Typing(visible));
        }

        fn scroll_to_bottom(&mut self) {
            self.push(ViewEvent::Scroll);
        }

        fn set_ui_state(&mut self, state: UiState) {
            self.push(ViewEvent::Ui(state));
        }

        fn clear_input(&mut self) {
            self.push(ViewEvent::ClearInput);
        }

        fn focus_input(&mut self) {
            self.push(ViewEvent::Focus);
        }

        fn set_welcome_time(&mut self, time: String) {
            self.push(ViewEvent::WelcomeTime(time));
        }

        fn display_time(&self) -> String {
            match self.clock {
                Some(time) => time.to_string(),
                None => widget_types::display_time(&chrono::Local::now()),
            }
        }
    }

    /// What the view looked like when the request went out.
    #[derive(Debug, Clone)]
    struct SentRequest {
        request: WebhookRequest,
        messages_on_screen: Vec<ChatMessage>,
        typing_visible: bool,
        ui_state: UiState,
    }

    #[derive(Clone)]
    struct FakeTransport {
        view: FakeView,
        result: Result<serde_json::Value, WebhookError>,
        sent: Rc<RefCell<Vec<SentRequest>>>,
    }

    impl FakeTransport {
        fn replying(view: &FakeView, body: serde_json::Value) -> Self {
            Self::with_result(view, Ok(body))
        }

        fn failing(view: &FakeView, error: WebhookError) -> Self {
            Self::with_result(view, Err(error))
        }

        fn with_result(view: &FakeView, result: Result<serde_json::Value, WebhookError>) -> Self {
            Self {
                view: view.clone(),
                result,
                sent: Rc::default(),
            }
        }

        fn sent(&self) -> Vec<SentRequest> {
            self.sent.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl WebhookTransport for FakeTransport {
        async fn post(&self, request: &WebhookRequest) -> Result<WebhookReply, WebhookError> {
            self.sent.borrow_mut().push(SentRequest {
                request: request.clone(),
                messages_on_screen: self.view.messages(),
                typing_visible: self.view.typing_visible(),
                ui_state: self.view.ui_state(),
            });
            self.result
                .clone()
                .map(|body| WebhookReply::from_value(&body))
        }
    }

    fn widget_with(
        transport: impl FnOnce(&FakeView) -> FakeTransport,
    ) -> (
        ChatWidget<FakeView, FakeTransport, MemoryStore>,
        FakeView,
        FakeTransport,
        MemoryStore,
    ) {
        let view = FakeView::default();
        let transport = transport(&view);
        let store = MemoryStore::new();
        let widget = ChatWidget::new(
            view.clone(),
            transport.clone(),
            store.clone(),
            WidgetConfig::default(),
        );
        (widget, view, transport, store)
    }

    fn bot_texts(view: &FakeView) -> Vec<String> {
        view.messages()
            .into_iter()
            .filter(|m| !m.is_from_user())
            .map(|m| m.text)
            .collect()
    }

    fn assert_idle_and_focused(view: &FakeView) {
        assert_eq!(view.ui_state(), UiState::Idle);
        assert!(!view.typing_visible());
        let events = view.events();
        assert_eq!(
            &events[events.len() - 2..],
            &[ViewEvent::Ui(UiState::Idle), ViewEvent::Focus]
        );
    }

    #[tokio::test]
    async fn user_message_is_rendered_once_before_the_request() {
        let (mut widget, view, transport, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        widget.submit("  Hello there  ").await;

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        let at_send = &sent[0];
        assert_eq!(at_send.messages_on_screen.len(), 1);
        assert!(at_send.messages_on_screen[0].is_from_user());
        assert_eq!(at_send.messages_on_screen[0].text, "Hello there");
        assert!(at_send.typing_visible);
        assert_eq!(at_send.ui_state, UiState::Sending);
        assert_eq!(at_send.request.message, "Hello there");

        let user_messages = view
            .messages()
            .into_iter()
            .filter(|m| m.is_from_user())
            .count();
        assert_eq!(user_messages, 1);
        assert!(view.events().contains(&ViewEvent::ClearInput));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let (mut widget, view, transport, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        assert_eq!(widget.submit("").await, SubmitOutcome::Ignored);
        assert_eq!(widget.submit(" \t\n ").await, SubmitOutcome::Ignored);

        assert!(view.events().is_empty());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn response_field_is_rendered() {
        let (mut widget, view, _, _) = widget_with(|view| {
            FakeTransport::replying(view, serde_json::json!({"response": "Hi there"}))
        });

        let outcome = widget.submit("hello").await;

        assert_eq!(outcome, SubmitOutcome::Replied(ReplySource::Response));
        assert_eq!(bot_texts(&view), vec!["Hi there".to_string()]);
        assert_idle_and_focused(&view);
    }

    #[tokio::test]
    async fn message_field_is_rendered_without_response() {
        let (mut widget, view, _, _) = widget_with(|view| {
            FakeTransport::replying(view, serde_json::json!({"message": "Hi there"}))
        });

        let outcome = widget.submit("hello").await;

        assert_eq!(outcome, SubmitOutcome::Replied(ReplySource::Message));
        assert_eq!(bot_texts(&view), vec!["Hi there".to_string()]);
    }

    #[tokio::test]
    async fn response_wins_over_message() {
        let (mut widget, view, _, _) = widget_with(|view| {
            FakeTransport::replying(
                view,
                serde_json::json!({"message": "second", "response": "first"}),
            )
        });

        widget.submit("hello").await;

        assert_eq!(bot_texts(&view), vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn empty_reply_renders_fallback() {
        let (mut widget, view, _, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        let outcome = widget.submit("hello").await;

        assert_eq!(outcome, SubmitOutcome::Replied(ReplySource::Fallback));
        assert_eq!(bot_texts(&view), vec![FALLBACK_REPLY.to_string()]);
        assert_idle_and_focused(&view);
    }

    #[tokio::test]
    async fn http_error_renders_apology_and_resets() {
        let (mut widget, view, transport, _) =
            widget_with(|view| FakeTransport::failing(view, WebhookError::Status(500)));

        let outcome = widget.submit("hello").await;

        assert_eq!(outcome, SubmitOutcome::Failed);
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(bot_texts(&view), vec![ERROR_REPLY.to_string()]);
        assert_idle_and_focused(&view);
    }

    #[tokio::test]
    async fn network_error_renders_apology_and_resets() {
        let (mut widget, view, _, _) = widget_with(|view| {
            FakeTransport::failing(view, WebhookError::Network("connection refused".into()))
        });

        assert_eq!(widget.submit("hello").await, SubmitOutcome::Failed);
        assert_eq!(bot_texts(&view), vec![ERROR_REPLY.to_string()]);
        assert_idle_and_focused(&view);
    }

    #[tokio::test]
    async fn typing_indicator_hides_before_reply_is_rendered() {
        let (mut widget, view, _, _) = widget_with(|view| {
            FakeTransport::replying(view, serde_json::json!({"response": "ok"}))
        });

        widget.submit("hello").await;

        let events = view.events();
        let hidden_at = events
            .iter()
            .position(|e| *e == ViewEvent::Typing(false))
            .unwrap();
        let reply_at = events
            .iter()
            .position(|e| matches!(e, ViewEvent::Append(m) if !m.is_from_user()))
            .unwrap();
        assert!(hidden_at < reply_at);
    }

    #[tokio::test]
    async fn requests_share_the_stored_session_id() {
        let (mut widget, _, transport, store) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        widget.submit("first").await;
        widget.submit("second").await;

        let sent = transport.sent();
        let stored = store.get_item(SESSION_STORAGE_KEY).unwrap();
        assert_eq!(sent[0].request.session_id, stored);
        assert_eq!(sent[1].request.session_id, stored);
        assert_eq!(widget.session_identifier().as_str(), stored);
    }

    #[tokio::test]
    async fn max_length_message_is_sent_intact() {
        let (mut widget, _, transport, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));
        let text = "x".repeat(500);

        widget.submit(&text).await;

        assert_eq!(transport.sent()[0].request.message, text);
    }

    #[tokio::test]
    async fn request_timestamp_is_iso_8601_utc() {
        let (mut widget, _, transport, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        widget.submit("hello").await;

        let timestamp = &transport.sent()[0].request.timestamp;
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
    }

    #[test]
    fn welcome_time_is_hour_minute() {
        let (mut widget, view, _, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        widget.set_welcome_time();

        let Some(ViewEvent::WelcomeTime(time)) = view.events().pop() else {
            panic!("welcome time not set");
        };
        assert_eq!(time.len(), 5);
        assert_eq!(time.as_bytes()[2], b':');
    }

    #[tokio::test]
    async fn times_come_from_the_view_locale() {
        let view = FakeView {
            clock: Some("02:05 PM"),
            ..FakeView::default()
        };
        let transport = FakeTransport::replying(&view, serde_json::json!({"response": "ok"}));
        let mut widget = ChatWidget::new(
            view.clone(),
            transport,
            MemoryStore::new(),
            WidgetConfig::default(),
        );

        widget.set_welcome_time();
        widget.submit("hello").await;

        assert!(view
            .events()
            .contains(&ViewEvent::WelcomeTime("02:05 PM".to_string())));
        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.timestamp == "02:05 PM"));
    }

    #[test]
    fn showing_typing_scrolls_but_hiding_does_not() {
        let (mut widget, view, _, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        widget.toggle_typing(true);
        widget.toggle_typing(false);

        assert_eq!(
            view.events(),
            vec![
                ViewEvent::Typing(true),
                ViewEvent::Scroll,
                ViewEvent::Typing(false)
            ]
        );
    }

    #[test]
    fn rendered_messages_scroll_into_view() {
        let (mut widget, view, _, _) =
            widget_with(|view| FakeTransport::replying(view, serde_json::json!({})));

        widget.render_message("<b>not markup</b>", false);

        let events = view.events();
        assert!(matches!(&events[0], ViewEvent::Append(m)
            if m.text == "<b>not markup</b>" && m.sender == Sender::Bot));
        assert_eq!(events[1], ViewEvent::Scroll);
    }
}
