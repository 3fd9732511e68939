//! # waymark-reactive
//!
//! The observable value cell used by the waymark router.
//!
//! A [`Signal`] holds one value and an explicit list of subscribers. Consumers
//! read the current value, write a new one, and register or remove listeners.
//! The router builds its subscriber-count gating on top of these explicit
//! subscription handles instead of wrapping a generic primitive.

mod signal;

pub use signal::{Signal, SubscriptionId};
