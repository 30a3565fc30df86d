//! slackstat library
//!
//! Retrieves the full message history of a Slack workspace through the
//! paginated Web API and computes per-user activity statistics: raw counts,
//! @here/@channel broadcast counts, and per-day message rates, per channel
//! and aggregated across all channels.

pub mod analyzer;
pub mod api;
pub mod config;
pub mod engine;
pub mod pagination;
pub mod report;
pub mod sink;
pub mod timestamp;
pub mod transcript;

pub use analyzer::{Scope, ScopeReport, StatValue, UserMessageStats, UserStat};
pub use api::types::{Channel, Message, MessageFile, User};
pub use api::{ApiError, HttpSlackClient, Page, SlackApi};
pub use config::Config;
pub use engine::Engine;
pub use sink::{ChannelSink, MessageSink, UserSink};
pub use transcript::TranscriptSink;
