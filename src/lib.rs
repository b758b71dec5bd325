//! Interactive chrome for a static blog page: mobile navigation menu,
//! smooth fragment scrolling, reveal-on-scroll, scroll-to-top and active
//! section highlighting.

pub mod app;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod model;
pub mod state;
pub mod styles;
pub mod util;

pub use app::start;
pub use config::ChromeConfig;
pub use controller::ViewStateController;
pub use error::ChromeError;
