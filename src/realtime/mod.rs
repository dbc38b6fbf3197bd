//! Post-commit event delivery.
//!
//! Use cases hand drained events to an [`EventPublisher`]. A [`Broadcaster`]
//! task turns each one into a [`BroadcastMessage`] for its board topic and
//! hands it to a [`MessageSink`] such as the [`TopicRegistry`]. Delivery is
//! fire-and-forget: nothing is acknowledged, retried or stored.

pub mod broadcaster;
pub mod publisher;
pub mod registry;

pub use broadcaster::{BroadcastMessage, Broadcaster, MessageSink};
pub use publisher::{ChannelPublisher, EventPublisher};
pub use registry::{Subscription, TopicRegistry};
