pub mod messages;

pub use messages::{EventBus, LogCategory, SimEvent};
