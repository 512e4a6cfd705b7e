//! Transport-agnostic inbound updates and the outbound notifier port.

pub mod port;
pub mod throttled;
pub mod types;
