//! Domain types for Lantern Player

mod channel;
mod value;

pub use channel::Channel;
pub use value::Value;
