mod content;
mod scrollbar;
mod status_bar;

pub use content::ContentWidget;
pub use scrollbar::ScrollbarWidget;
pub use status_bar::StatusBarWidget;
