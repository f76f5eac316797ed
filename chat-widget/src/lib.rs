pub mod components;
pub mod config;
pub mod interop;
pub mod mount;
pub mod session;
pub mod transport;
pub mod view;
pub mod widget;

pub use components::*;
pub use config::*;
pub use interop::*;
pub use mount::*;
pub use session::*;
pub use transport::*;
pub use view::*;
pub use widget::*;
