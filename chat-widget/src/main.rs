use chat_widget::{mount, WidgetConfig};
use dioxus_logger::tracing::{error, Level};

fn main() {
    // Initialize logging for WASM
    dioxus_logger::init(Level::INFO).ok();

    if let Err(e) = mount(WidgetConfig::default()) {
        error!("Chat widget failed to mount: {}", e);
    }
}
