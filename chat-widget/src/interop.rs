use gloo_timers::future::TimeoutFuture;
use js_sys::{Array, Date, Intl, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, Document, Element, HtmlElement};

use crate::mount::MountError;

/// Mount target. Created under `<body>` unless the host page declares it.
pub const HOST_ID: &str = "chat-widget-root";
pub const MESSAGES_ID: &str = "chatMessages";
pub const INPUT_ID: &str = "messageInput";

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

/// Find the host element, or create it and append it to `<body>`.
pub fn host_element() -> Result<Element, MountError> {
    let window = window().ok_or(MountError::NoWindow)?;
    let document = window.document().ok_or(MountError::NoDocument)?;

    if let Some(existing) = document.get_element_by_id(HOST_ID) {
        return Ok(existing);
    }

    let body = document.body().ok_or(MountError::NoBody)?;
    let host = document
        .create_element("div")
        .map_err(|e| MountError::Dom(format!("{e:?}")))?;
    host.set_id(HOST_ID);
    body.append_child(&host)
        .map_err(|e| MountError::Dom(format!("{e:?}")))?;
    Ok(host)
}

/// Attribute reader for `WidgetConfig::with_overrides`.
pub fn attribute_lookup(element: &Element) -> impl Fn(&str) -> Option<String> + '_ {
    move |name| element.get_attribute(name)
}

pub fn scroll_to_bottom(element_id: &str) {
    if let Some(element) = document().and_then(|d| d.get_element_by_id(element_id)) {
        element.set_scroll_top(element.scroll_height());
    }
}

/// Scroll once the pending render has reached the DOM.
pub fn schedule_scroll_to_bottom(element_id: &'static str) {
    wasm_bindgen_futures::spawn_local(async move {
        TimeoutFuture::new(0).await;
        scroll_to_bottom(element_id);
    });
}

pub fn focus_element(element_id: &str) {
    let Some(element) = document()
        .and_then(|d| d.get_element_by_id(element_id))
        .and_then(|e| e.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let _ = element.focus();
}

/// Two-digit hour and minute in the viewer's locale, e.g. `02:05 PM` or `14:05`.
pub fn locale_time() -> Option<String> {
    let options = Object::new();
    for field in ["hour", "minute"] {
        Reflect::set(&options, &JsValue::from_str(field), &JsValue::from_str("2-digit")).ok()?;
    }

    // An empty locale list selects the browser default.
    let formatter = Intl::DateTimeFormat::new(&Array::new(), &options);
    formatter
        .format()
        .call1(&JsValue::UNDEFINED, &Date::new_0())
        .ok()?
        .as_string()
}
