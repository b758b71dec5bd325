pub mod active_section;
pub mod debounce;
pub mod menu;
pub mod reveal;
pub mod scroll_top;

pub use active_section::{SectionBox, current_section};
pub use debounce::Debouncer;
pub use menu::MenuState;
pub use reveal::RevealTracker;
pub use scroll_top::scroll_top_visible;
