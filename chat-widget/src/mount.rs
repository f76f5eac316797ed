use dioxus::LaunchBuilder;
use dioxus_logger::tracing::info;
use thiserror::Error;

use crate::components::ChatWidgetView;
use crate::config::{install_config, is_installed, WidgetConfig};
use crate::interop::{attribute_lookup, host_element, HOST_ID};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("no global `window` exists")]
    NoWindow,

    #[error("no document on window")]
    NoDocument,

    #[error("document has no <body> to mount into")]
    NoBody,

    #[error("chat widget is already mounted")]
    AlreadyMounted,

    #[error("DOM operation failed: {0}")]
    Dom(String),
}

/// Inject the widget into the page. Succeeds at most once per page.
///
/// `data-*` attributes on a pre-declared `#chat-widget-root` element override
/// the matching fields of `config`.
pub fn mount(config: WidgetConfig) -> Result<(), MountError> {
    if is_installed() {
        return Err(MountError::AlreadyMounted);
    }

    let host = host_element()?;
    let config = config.with_overrides(attribute_lookup(&host));
    let webhook_url = config.webhook_url.clone();

    if !install_config(config) {
        return Err(MountError::AlreadyMounted);
    }

    info!("Mounting chat widget into #{} (webhook {})", HOST_ID, webhook_url);

    LaunchBuilder::new()
        .with_cfg(dioxus_web::Config::new().rootelement(host))
        .launch(ChatWidgetView);

    Ok(())
}
