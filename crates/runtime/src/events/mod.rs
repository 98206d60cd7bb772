//! Topic-based event bus for flexible event routing.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{Announcement, LifecycleEvent};
