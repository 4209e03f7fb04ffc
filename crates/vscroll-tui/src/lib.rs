pub mod app;
pub mod event;
pub mod input;
pub mod keymap;
pub mod theme;
pub mod widgets;

pub use app::App;
pub use event::{AppEvent, EventHandler};
pub use theme::Theme;
