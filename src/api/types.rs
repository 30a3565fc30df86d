//! Entity snapshots returned by the Slack Web API.
//!
//! These are immutable once fetched; the pipeline never mutates them. Only
//! the fields the analyzers and the transcript need are deserialized, the
//! rest of each payload is ignored.

use serde::Deserialize;

/// A workspace member from `users.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    /// Display name, used for sorting and report output.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub is_bot: bool,
}

/// A conversation from `conversations.list` / `conversations.info`.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// True for plain public channels; false for DMs, groups, etc.
    #[serde(default)]
    pub is_channel: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub previous_names: Vec<String>,
    #[serde(default)]
    pub num_members: u64,
}

/// A message from `conversations.history`.
///
/// The originating channel is not part of the payload; the engine carries it
/// alongside each message. `user` is `None` for system messages (joins,
/// topic changes), which are excluded from all statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub user: Option<String>,
    /// Fractional-seconds timestamp string; lexicographic order is
    /// chronological order.
    pub ts: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub client_msg_id: Option<String>,
    #[serde(default)]
    pub files: Vec<MessageFile>,
}

/// A file attached to a message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub permalink: String,
}
