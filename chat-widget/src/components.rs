use dioxus::prelude::*;
use widget_types::ChatMessage;

use crate::config::widget_config;
use crate::interop::{focus_element, INPUT_ID, MESSAGES_ID};
use crate::session::BrowserSessionStorage;
use crate::transport::GlooTransport;
use crate::view::{submits_on_key, LengthFeedback, SignalView, UiState};
use crate::widget::ChatWidget;

#[component]
pub fn ChatWidgetView() -> Element {
    let config = use_hook(widget_config);
    let messages = use_signal(Vec::<ChatMessage>::new);
    let typing = use_signal(|| false);
    let ui_state = use_signal(UiState::default);
    let mut input_text = use_signal(String::new);
    let welcome_time = use_signal(String::new);

    let widget = use_hook(|| {
        let view = SignalView {
            messages,
            typing,
            ui_state,
            input: input_text,
            welcome_time,
        };
        ChatWidget::new(
            view,
            GlooTransport::new(config.webhook_url.clone()),
            BrowserSessionStorage::new(),
            config.clone(),
        )
    });

    // Runs once after the first render: nothing here reads a signal.
    use_effect({
        let widget = widget.clone();
        move || {
            let mut widget = widget.clone();
            widget.set_welcome_time();
            focus_element(INPUT_ID);
        }
    });

    let submit = use_callback(move |_| {
        let mut widget = widget.clone();
        let text = input_text.to_string();
        spawn(async move {
            widget.submit(&text).await;
        });
    });

    let onsubmit = move |e: FormEvent| {
        e.prevent_default();
        submit.call(());
    };

    let onkeydown = move |e: KeyboardEvent| {
        if submits_on_key(&e.key(), e.modifiers().shift()) {
            e.prevent_default();
            submit.call(());
        }
    };

    let oninput = move |e: FormEvent| {
        input_text.set(e.value());
    };

    let state = ui_state();
    let button_label = state.button_label(&config).to_string();
    let feedback = LengthFeedback::for_length(
        input_text.read().chars().count(),
        config.max_message_chars,
    );

    rsx! {
        style { {WIDGET_STYLES} }

        div {
            class: "chat-widget",

            div {
                class: "chat-header",
                h2 { "{config.title}" }
                p { "{config.subtitle}" }
            }

            div {
                class: "chat-messages",
                id: MESSAGES_ID,

                div {
                    class: "message bot welcome-message",
                    div { "{config.welcome_text}" }
                    div { class: "message-time", "{welcome_time}" }
                }

                for message in messages.iter() {
                    MessageBubble { key: "{message.id}", message: message.clone() }
                }

                TypingIndicator { visible: typing() }
            }

            div {
                class: "chat-form",
                form {
                    class: "input-container",
                    id: "chatForm",
                    onsubmit,
                    input {
                        r#type: "text",
                        class: "chat-input",
                        id: INPUT_ID,
                        placeholder: "{config.placeholder}",
                        required: true,
                        maxlength: "{config.max_message_chars}",
                        value: "{input_text}",
                        style: "border-color: {feedback.border_color()};",
                        oninput,
                        onkeydown,
                    }
                    button {
                        r#type: "submit",
                        class: "send-btn",
                        id: "sendBtn",
                        disabled: state.is_sending(),
                        "{button_label}"
                    }
                }
            }
        }
    }
}

/// Text is rendered as a text node, never parsed as markup.
#[component]
pub fn MessageBubble(message: ChatMessage) -> Element {
    rsx! {
        div {
            class: "message {message.sender.as_str()}",
            div { "{message.text}" }
            div { class: "message-time", "{message.timestamp}" }
        }
    }
}

/// Always present after the last message; only its visibility changes.
#[component]
pub fn TypingIndicator(visible: bool) -> Element {
    rsx! {
        div {
            class: "typing-indicator",
            style: if visible { "display: block;" } else { "display: none;" },
            div {
                class: "typing-dots",
                span {}
                span {}
                span {}
            }
        }
    }
}

const WIDGET_STYLES: &str = r#"
.chat-widget {
    position: fixed;
    right: 1.5rem;
    bottom: 1.5rem;
    width: 360px;
    max-width: calc(100vw - 2rem);
    height: 520px;
    max-height: calc(100vh - 2rem);
    display: flex;
    flex-direction: column;
    background: #ffffff;
    border-radius: 1rem;
    box-shadow: 0 10px 30px rgba(0, 0, 0, 0.15);
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    overflow: hidden;
    z-index: 9999;
}

.chat-header {
    padding: 1rem 1.25rem;
    background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
    color: #ffffff;
    flex-shrink: 0;
}

.chat-header h2 {
    margin: 0;
    font-size: 1.125rem;
}

.chat-header p {
    margin: 0.25rem 0 0 0;
    font-size: 0.8125rem;
    opacity: 0.9;
}

.chat-messages {
    flex: 1;
    overflow-y: auto;
    padding: 1rem;
    background: #f8f9fa;
    scroll-behavior: smooth;
}

.message {
    max-width: 80%;
    margin-bottom: 0.75rem;
    padding: 0.625rem 0.875rem;
    border-radius: 1rem;
    font-size: 0.9375rem;
    line-height: 1.4;
    word-wrap: break-word;
    white-space: pre-wrap;
}

.message.user {
    margin-left: auto;
    background: #667eea;
    color: #ffffff;
    border-bottom-right-radius: 0.25rem;
}

.message.bot {
    margin-right: auto;
    background: #ffffff;
    color: #212529;
    border: 1px solid #e9ecef;
    border-bottom-left-radius: 0.25rem;
}

.message-time {
    margin-top: 0.25rem;
    font-size: 0.6875rem;
    opacity: 0.7;
}

.typing-indicator {
    margin-bottom: 0.75rem;
    padding: 0.75rem 1rem;
    width: fit-content;
    background: #ffffff;
    border: 1px solid #e9ecef;
    border-radius: 1rem;
    border-bottom-left-radius: 0.25rem;
}

.typing-dots {
    display: flex;
    gap: 0.25rem;
}

.typing-dots span {
    width: 0.5rem;
    height: 0.5rem;
    background: #adb5bd;
    border-radius: 50%;
    animation: typing-bounce 1.4s infinite ease-in-out both;
}

.typing-dots span:nth-child(1) { animation-delay: -0.32s; }
.typing-dots span:nth-child(2) { animation-delay: -0.16s; }

@keyframes typing-bounce {
    0%, 80%, 100% { transform: scale(0); }
    40% { transform: scale(1); }
}

.chat-form {
    padding: 0.75rem;
    border-top: 1px solid #e9ecef;
    background: #ffffff;
    flex-shrink: 0;
}

.input-container {
    display: flex;
    gap: 0.5rem;
    margin: 0;
}

.chat-input {
    flex: 1;
    padding: 0.625rem 0.875rem;
    border: 2px solid #e9ecef;
    border-radius: 1.5rem;
    font-size: 0.9375rem;
    outline: none;
    transition: border-color 0.2s;
}

.send-btn {
    padding: 0.625rem 1.125rem;
    background: #667eea;
    color: #ffffff;
    border: none;
    border-radius: 1.5rem;
    font-weight: 600;
    cursor: pointer;
    transition: background 0.2s;
}

.send-btn:hover:not(:disabled) {
    background: #5a6fd6;
}

.send-btn:disabled {
    background: #adb5bd;
    cursor: not-allowed;
}
"#;
