//! Slack Web API access.
//!
//! The traversal engine only depends on the [`SlackApi`] trait, which models
//! the four workspace read capabilities the pipeline needs. [`HttpSlackClient`]
//! is the production implementation over the HTTPS JSON API; tests substitute
//! fakes or point the client at a mock server via [`HttpSlackClient::with_base_url`].

pub mod types;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{Channel, Message, User};

/// Default endpoint prefix for the Slack Web API.
pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// One page of a paginated listing: the items plus the cursor for the next
/// page. An absent or empty cursor means the listing is exhausted.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Errors from the Slack Web API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP request itself failed (connection, status, body decode).
    #[error("{method} request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// Slack answered but reported an application-level error code
    /// (`"ok": false`), e.g. `invalid_auth` or `channel_not_found`.
    #[error("Slack rejected {method}: {code}")]
    Slack { method: &'static str, code: String },
}

/// Read capabilities of a Slack workspace, as used by the traversal engine.
///
/// All calls are blocking; the traversal is deliberately sequential so a
/// page is only requested after the previous one has been consumed.
pub trait SlackApi {
    /// One page of workspace members (`users.list`).
    fn list_users(&self, cursor: Option<&str>) -> Result<Page<User>, ApiError>;

    /// One page of public channels (`conversations.list`).
    fn list_channels(&self, cursor: Option<&str>) -> Result<Page<Channel>, ApiError>;

    /// A single channel by id (`conversations.info`); used when an explicit
    /// channel allow-list is configured.
    fn channel_info(&self, channel_id: &str) -> Result<Channel, ApiError>;

    /// One page of a channel's message history (`conversations.history`).
    fn channel_history(
        &self,
        channel_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Message>, ApiError>;
}

#[derive(Debug, Deserialize, Default)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

impl ResponseMetadata {
    fn into_cursor(self) -> Option<String> {
        if self.next_cursor.is_empty() {
            None
        } else {
            Some(self.next_cursor)
        }
    }
}

#[derive(Debug, Deserialize)]
struct UsersListResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    members: Vec<User>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ChannelsListResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ChannelInfoResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    channel: Option<Channel>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

/// Blocking HTTPS client for the Slack Web API.
pub struct HttpSlackClient {
    http: reqwest::blocking::Client,
    token: String,
    base_url: String,
}

impl HttpSlackClient {
    /// Create a client against the official API endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (mock servers in tests).
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn get<R: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, &str)],
    ) -> Result<R, ApiError> {
        let url = format!("{}/{}", self.base_url, method);
        self.http
            .get(url)
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<R>())
            .map_err(|source| ApiError::Transport { method, source })
    }
}

/// Map `"ok": false` envelopes to [`ApiError::Slack`].
fn check_ok(ok: bool, error: Option<String>, method: &'static str) -> Result<(), ApiError> {
    if ok {
        Ok(())
    } else {
        Err(ApiError::Slack {
            method,
            code: error.unwrap_or_else(|| "unknown_error".to_string()),
        })
    }
}

fn cursor_query<'a>(base: &[(&'a str, &'a str)], cursor: Option<&'a str>) -> Vec<(&'a str, &'a str)> {
    let mut query = base.to_vec();
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
        query.push(("cursor", cursor));
    }
    query
}

impl SlackApi for HttpSlackClient {
    fn list_users(&self, cursor: Option<&str>) -> Result<Page<User>, ApiError> {
        const METHOD: &str = "users.list";
        let query = cursor_query(&[], cursor);
        let resp: UsersListResponse = self.get(METHOD, &query)?;
        check_ok(resp.ok, resp.error, METHOD)?;
        Ok(Page {
            items: resp.members,
            next_cursor: resp.response_metadata.and_then(ResponseMetadata::into_cursor),
        })
    }

    fn list_channels(&self, cursor: Option<&str>) -> Result<Page<Channel>, ApiError> {
        const METHOD: &str = "conversations.list";
        let query = cursor_query(&[("types", "public_channel")], cursor);
        let resp: ChannelsListResponse = self.get(METHOD, &query)?;
        check_ok(resp.ok, resp.error, METHOD)?;
        Ok(Page {
            items: resp.channels,
            next_cursor: resp.response_metadata.and_then(ResponseMetadata::into_cursor),
        })
    }

    fn channel_info(&self, channel_id: &str) -> Result<Channel, ApiError> {
        const METHOD: &str = "conversations.info";
        let resp: ChannelInfoResponse = self.get(METHOD, &[("channel", channel_id)])?;
        check_ok(resp.ok, resp.error, METHOD)?;
        resp.channel.ok_or(ApiError::Slack {
            method: METHOD,
            code: "missing_channel".to_string(),
        })
    }

    fn channel_history(
        &self,
        channel_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Message>, ApiError> {
        const METHOD: &str = "conversations.history";
        let query = cursor_query(&[("channel", channel_id)], cursor);
        let resp: HistoryResponse = self.get(METHOD, &query)?;
        check_ok(resp.ok, resp.error, METHOD)?;
        Ok(Page {
            items: resp.messages,
            next_cursor: resp.response_metadata.and_then(ResponseMetadata::into_cursor),
        })
    }
}
