//! Per-user message statistics accumulated from the traversal stream.
//!
//! The original tool shipped three nearly identical processors (raw counts,
//! @here/@channel counts, per-day rates). Here they are one aggregator,
//! [`UserMessageStats`], parameterized by a keep-predicate and a value mode;
//! the three constructors recover the three variants without duplicating the
//! counting, ranking, and truncation logic.
//!
//! Counts are bucketed per channel and once more under the "all channels"
//! aggregate, so every extraction always contains the aggregate scope plus
//! one scope per channel that contributed at least one counted message.

use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

use crate::api::types::{Channel, Message, User};
use crate::sink::{ChannelSink, MessageSink, UserSink};
use crate::timestamp;

/// A counting bucket: one concrete channel, or the aggregate over all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Channel(String),
    AllChannels,
}

/// How a user's raw count is turned into the reported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueMode {
    /// Report the raw count.
    Count,
    /// Divide the count by whole days since the user's earliest message.
    PerDay,
}

/// A reported statistic: an integer count or a per-day rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Count(u64),
    PerDay(f64),
}

impl StatValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            StatValue::Count(n) => *n as f64,
            StatValue::PerDay(r) => *r,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{}", n),
            StatValue::PerDay(r) => write!(f, "{:.2}", r),
        }
    }
}

/// One ranked entry of an extraction: a user and their value within a scope.
#[derive(Debug, Clone)]
pub struct UserStat {
    pub user_id: String,
    pub name: String,
    pub real_name: String,
    pub value: StatValue,
    /// Date of the user's earliest counted message; present for the per-day
    /// rate variant only.
    pub since: Option<NaiveDate>,
}

/// Ranked results for one scope.
#[derive(Debug, Clone)]
pub struct ScopeReport {
    pub title: String,
    pub scope: Scope,
    /// Channel name (or the channel id if the name never streamed past),
    /// or "All Channels" for the aggregate.
    pub label: String,
    pub entries: Vec<UserStat>,
}

/// Streaming aggregator of per-user message statistics.
///
/// Observation only ever increments counts and moves earliest-message
/// instants backwards; ranking and rate normalization happen at extraction
/// time and never mutate the accumulated state.
pub struct UserMessageStats {
    title: &'static str,
    limit: usize,
    keep: fn(&Message) -> bool,
    mode: ValueMode,
    users: HashMap<String, User>,
    channels: HashMap<String, Channel>,
    counts: HashMap<Scope, HashMap<String, u64>>,
    earliest: HashMap<String, DateTime<Utc>>,
}

fn keep_all(_: &Message) -> bool {
    true
}

fn keep_broadcast(message: &Message) -> bool {
    message.text.contains("<!here>") || message.text.contains("<!channel>")
}

impl UserMessageStats {
    fn new(title: &'static str, limit: usize, keep: fn(&Message) -> bool, mode: ValueMode) -> Self {
        let mut counts = HashMap::new();
        // The aggregate scope exists even before any message is counted
        counts.insert(Scope::AllChannels, HashMap::new());
        Self {
            title,
            limit,
            keep,
            mode,
            users: HashMap::new(),
            channels: HashMap::new(),
            counts,
            earliest: HashMap::new(),
        }
    }

    /// Count every user-authored message.
    pub fn message_counts(limit: usize) -> Self {
        Self::new("User Messages Count", limit, keep_all, ValueMode::Count)
    }

    /// Count only messages that notify a whole channel.
    ///
    /// A message is counted when its text contains `<!here>` or `<!channel>`;
    /// ordinary messages are ignored. The reported number is therefore how
    /// often each user pinged everyone, not how much they talked.
    pub fn broadcast_counts(limit: usize) -> Self {
        Self::new(
            "User @here/@channel Messages Count",
            limit,
            keep_broadcast,
            ValueMode::Count,
        )
    }

    /// Count every user-authored message and report it as a per-day rate.
    ///
    /// Each user's count is divided by the whole days elapsed between their
    /// earliest message anywhere in the workspace and the extraction instant.
    /// Users whose earliest message is less than a day old report `0.00`.
    pub fn per_day_rates(limit: usize) -> Self {
        Self::new("User Messages Per Day Count", limit, keep_all, ValueMode::PerDay)
    }

    fn bump(&mut self, scope: Scope, user_id: &str) {
        *self
            .counts
            .entry(scope)
            .or_default()
            .entry(user_id.to_string())
            .or_insert(0) += 1;
    }

    fn scope_label(&self, scope: &Scope) -> String {
        match scope {
            Scope::AllChannels => "All Channels".to_string(),
            Scope::Channel(id) => self
                .channels
                .get(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    /// Extract ranked results using the current wall clock for rates.
    ///
    /// For the count variants this is idempotent. For the per-day variant two
    /// extractions at different times may report different rates from the
    /// same observations, since the elapsed-day divisor keeps growing.
    pub fn extract_results(&self) -> Vec<ScopeReport> {
        self.extract_results_at(Utc::now())
    }

    /// Extract ranked results, computing per-day rates against `now`.
    pub fn extract_results_at(&self, now: DateTime<Utc>) -> Vec<ScopeReport> {
        let mut scopes: Vec<&Scope> = self.counts.keys().collect();
        // Channels in name order, the aggregate last
        scopes.sort_by_key(|scope| match scope {
            Scope::Channel(_) => (0, self.scope_label(scope)),
            Scope::AllChannels => (1, String::new()),
        });

        scopes
            .into_iter()
            .map(|scope| {
                let per_user = &self.counts[scope];
                let mut entries: Vec<UserStat> = per_user
                    .iter()
                    .filter_map(|(user_id, count)| self.entry_for(user_id, *count, now))
                    .collect();
                entries.sort_by(|a, b| {
                    b.value
                        .as_f64()
                        .total_cmp(&a.value.as_f64())
                        .then_with(|| a.name.cmp(&b.name))
                });
                entries.truncate(self.limit);
                ScopeReport {
                    title: self.title.to_string(),
                    scope: scope.clone(),
                    label: self.scope_label(scope),
                    entries,
                }
            })
            .collect()
    }

    fn entry_for(&self, user_id: &str, count: u64, now: DateTime<Utc>) -> Option<UserStat> {
        let user = self.users.get(user_id)?;
        let (value, since) = match self.mode {
            ValueMode::Count => (StatValue::Count(count), None),
            ValueMode::PerDay => {
                let earliest = *self.earliest.get(user_id)?;
                let days = (now - earliest).num_days();
                let rate = if days < 1 { 0.0 } else { count as f64 / days as f64 };
                (StatValue::PerDay(rate), Some(earliest.date_naive()))
            }
        };
        Some(UserStat {
            user_id: user_id.to_string(),
            name: user.name.clone(),
            real_name: user.real_name.clone(),
            value,
            since,
        })
    }
}

impl ChannelSink for UserMessageStats {
    fn observe_channel(&mut self, channel: &Channel) -> Result<()> {
        self.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }
}

impl UserSink for UserMessageStats {
    fn observe_user(&mut self, user: &User) -> Result<()> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}

impl MessageSink for UserMessageStats {
    fn observe_message(&mut self, channel_id: &str, message: &Message) -> Result<()> {
        let Some(user_id) = message.user.as_deref() else {
            return Ok(());
        };
        if !self.users.contains_key(user_id) {
            warn!(user = user_id, channel = channel_id, "message from unknown user, skipping");
            return Ok(());
        }
        if !(self.keep)(message) {
            return Ok(());
        }

        let instant = timestamp::to_datetime(&message.ts)?;
        self.earliest
            .entry(user_id.to_string())
            .and_modify(|earliest| {
                if instant < *earliest {
                    *earliest = instant;
                }
            })
            .or_insert(instant);

        self.bump(Scope::Channel(channel_id.to_string()), user_id);
        self.bump(Scope::AllChannels, user_id);
        Ok(())
    }
}
