pub mod config;
pub mod error;
pub mod normalize;
pub mod replay;
pub mod scroll;

pub use config::{AppConfig, ScrollConfig, ScrollbarConfig, TriggerConfig};
pub use error::{BoxError, Error, Result};
pub use normalize::{DeltaMode, NormalizedWheel, WheelEvent};
pub use scroll::{
    Condition, ScrollRange, ScrollState, ScrollbarDrag, ScrollbarGeometry, Trigger, TriggerEvent,
    TriggerId, VirtualScroll,
};
