pub mod channel;

pub use channel::{EventChannel, ListenerId, Subscriptions, Topic};
