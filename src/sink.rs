//! Capability interfaces through which analyzers receive streamed entities.
//!
//! The traversal engine pushes each entity it fetches to every registered
//! sink. The three capabilities are independent: an analyzer implements only
//! the subsets it cares about, and a single type may implement all three.
//! Methods are fallible because some sinks perform I/O (the transcript) or
//! parse timestamps (the per-day rate analyzer, for which a malformed
//! timestamp is fatal).

use anyhow::Result;

use crate::api::types::{Channel, Message, User};

/// Observes each channel selected for traversal, in channel-name order.
pub trait ChannelSink {
    fn observe_channel(&mut self, channel: &Channel) -> Result<()>;
}

/// Observes each workspace member, in display-name order, before any
/// channel or message is streamed.
pub trait UserSink {
    fn observe_user(&mut self, user: &User) -> Result<()>;
}

/// Observes each user-authored message of a channel, in timestamp order.
/// Messages without an originating user never reach this sink.
pub trait MessageSink {
    fn observe_message(&mut self, channel_id: &str, message: &Message) -> Result<()>;
}
