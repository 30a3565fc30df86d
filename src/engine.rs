//! Workspace traversal: fetch, sort, and fan out to registered sinks.
//!
//! One run streams the whole workspace through the sinks in a fixed order:
//! every user first (display-name order), then each selected channel
//! (name order), then that channel's messages (timestamp order). Sinks may
//! therefore assume a user is known before any message referencing it
//! arrives. Everything is single-threaded; the fan-out is a plain sequential
//! dispatch and sinks are shared via `Rc<RefCell<_>>` so one analyzer
//! instance can subscribe to all three entity streams.
//!
//! Any fetch error aborts the run and leaves whatever the sinks accumulated
//! so far untouched; there is no retry and no rollback.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use tracing::info;

use crate::api::types::Channel;
use crate::api::SlackApi;
use crate::pagination::collect_all;
use crate::sink::{ChannelSink, MessageSink, UserSink};

/// Drives the three-phase traversal of a workspace.
pub struct Engine<A: SlackApi> {
    api: A,
    /// Explicit channel ids to analyze; empty means all public channels.
    allowed_channels: Vec<String>,
    channel_sinks: Vec<Rc<RefCell<dyn ChannelSink>>>,
    user_sinks: Vec<Rc<RefCell<dyn UserSink>>>,
    message_sinks: Vec<Rc<RefCell<dyn MessageSink>>>,
}

impl<A: SlackApi> Engine<A> {
    pub fn new(api: A, allowed_channels: Vec<String>) -> Self {
        Self {
            api,
            allowed_channels,
            channel_sinks: Vec::new(),
            user_sinks: Vec::new(),
            message_sinks: Vec::new(),
        }
    }

    pub fn add_channel_sink(&mut self, sink: Rc<RefCell<dyn ChannelSink>>) {
        self.channel_sinks.push(sink);
    }

    pub fn add_user_sink(&mut self, sink: Rc<RefCell<dyn UserSink>>) {
        self.user_sinks.push(sink);
    }

    pub fn add_message_sink(&mut self, sink: Rc<RefCell<dyn MessageSink>>) {
        self.message_sinks.push(sink);
    }

    /// Traverse the workspace: users, then channels, then per-channel history.
    pub fn run(&mut self) -> Result<()> {
        self.stream_users()?;
        self.stream_channels()?;
        Ok(())
    }

    fn stream_users(&mut self) -> Result<()> {
        let mut users = collect_all(|cursor| self.api.list_users(cursor))?;
        info!(count = users.len(), "retrieved users");

        users.sort_by(|a, b| a.name.cmp(&b.name));
        for user in &users {
            for sink in &self.user_sinks {
                sink.borrow_mut().observe_user(user)?;
            }
        }
        Ok(())
    }

    fn stream_channels(&mut self) -> Result<()> {
        let mut channels: Vec<Channel> = if self.allowed_channels.is_empty() {
            collect_all(|cursor| self.api.list_channels(cursor))?
        } else {
            self.allowed_channels
                .iter()
                .map(|id| self.api.channel_info(id))
                .collect::<Result<_, _>>()?
        };
        info!(count = channels.len(), "retrieved channels");

        channels.sort_by(|a, b| a.name.cmp(&b.name));
        for channel in &channels {
            // Only plain channels, unless explicitly allow-listed
            if !channel.is_channel && !self.allowed_channels.contains(&channel.id) {
                continue;
            }
            for sink in &self.channel_sinks {
                sink.borrow_mut().observe_channel(channel)?;
            }
            self.stream_messages(&channel.id)?;
        }
        Ok(())
    }

    fn stream_messages(&mut self, channel_id: &str) -> Result<()> {
        let mut messages = collect_all(|cursor| self.api.channel_history(channel_id, cursor))?;
        info!(channel = channel_id, count = messages.len(), "retrieved messages");

        messages.sort_by(|a, b| a.ts.cmp(&b.ts));
        for message in &messages {
            if message.user.is_none() {
                continue;
            }
            for sink in &self.message_sinks {
                sink.borrow_mut().observe_message(channel_id, message)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{Message, User};
    use crate::api::{ApiError, Page};
    use std::collections::HashMap;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            real_name: name.to_string(),
            deleted: false,
            is_bot: false,
        }
    }

    fn channel(id: &str, name: &str, is_channel: bool) -> Channel {
        Channel {
            id: id.to_string(),
            name: name.to_string(),
            is_channel,
            is_archived: false,
            previous_names: Vec::new(),
            num_members: 0,
        }
    }

    fn message(user_id: Option<&str>, ts: &str) -> Message {
        Message {
            kind: "message".to_string(),
            user: user_id.map(str::to_string),
            ts: ts.to_string(),
            text: "hi".to_string(),
            client_msg_id: None,
            files: Vec::new(),
        }
    }

    fn single_page<T: Clone>(items: &[T]) -> Result<Page<T>, ApiError> {
        Ok(Page {
            items: items.to_vec(),
            next_cursor: None,
        })
    }

    /// In-memory API; panics on endpoints a test does not expect to be hit.
    struct FakeApi {
        users: Vec<User>,
        channels: Vec<Channel>,
        history: HashMap<String, Vec<Message>>,
        fail_history: bool,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                users: Vec::new(),
                channels: Vec::new(),
                history: HashMap::new(),
                fail_history: false,
            }
        }
    }

    impl SlackApi for FakeApi {
        fn list_users(&self, _cursor: Option<&str>) -> Result<Page<User>, ApiError> {
            single_page(&self.users)
        }

        fn list_channels(&self, _cursor: Option<&str>) -> Result<Page<Channel>, ApiError> {
            single_page(&self.channels)
        }

        fn channel_info(&self, channel_id: &str) -> Result<Channel, ApiError> {
            self.channels
                .iter()
                .find(|c| c.id == channel_id)
                .cloned()
                .ok_or(ApiError::Slack {
                    method: "conversations.info",
                    code: "channel_not_found".to_string(),
                })
        }

        fn channel_history(
            &self,
            channel_id: &str,
            _cursor: Option<&str>,
        ) -> Result<Page<Message>, ApiError> {
            if self.fail_history {
                return Err(ApiError::Slack {
                    method: "conversations.history",
                    code: "internal_error".to_string(),
                });
            }
            single_page(self.history.get(channel_id).map_or(&[][..], Vec::as_slice))
        }
    }

    /// Records every sink call as a line, preserving order across entity kinds.
    #[derive(Default)]
    struct RecordingSink {
        events: Vec<String>,
    }

    impl UserSink for RecordingSink {
        fn observe_user(&mut self, user: &User) -> Result<()> {
            self.events.push(format!("user:{}", user.name));
            Ok(())
        }
    }

    impl ChannelSink for RecordingSink {
        fn observe_channel(&mut self, channel: &Channel) -> Result<()> {
            self.events.push(format!("channel:{}", channel.name));
            Ok(())
        }
    }

    impl MessageSink for RecordingSink {
        fn observe_message(&mut self, channel_id: &str, message: &Message) -> Result<()> {
            self.events
                .push(format!("message:{}:{}", channel_id, message.ts));
            Ok(())
        }
    }

    fn wire(engine: &mut Engine<FakeApi>) -> Rc<RefCell<RecordingSink>> {
        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        engine.add_user_sink(sink.clone());
        engine.add_channel_sink(sink.clone());
        engine.add_message_sink(sink.clone());
        sink
    }

    #[test]
    fn users_streamed_in_display_name_order_before_channels() {
        let mut api = FakeApi::new();
        api.users = vec![user("U2", "zoe"), user("U1", "alice"), user("U3", "mia")];
        api.channels = vec![channel("C1", "general", true)];

        let mut engine = Engine::new(api, Vec::new());
        let sink = wire(&mut engine);
        engine.run().unwrap();

        let events = &sink.borrow().events;
        assert_eq!(
            events[..4],
            [
                "user:alice".to_string(),
                "user:mia".to_string(),
                "user:zoe".to_string(),
                "channel:general".to_string(),
            ]
        );
    }

    #[test]
    fn messages_streamed_in_timestamp_order_without_userless_ones() {
        let mut api = FakeApi::new();
        api.channels = vec![channel("C1", "general", true)];
        api.history.insert(
            "C1".to_string(),
            vec![
                message(Some("U1"), "1589100002.000100"),
                message(None, "1589100001.000500"),
                message(Some("U1"), "1589100000.000100"),
            ],
        );

        let mut engine = Engine::new(api, Vec::new());
        let sink = wire(&mut engine);
        engine.run().unwrap();

        let events = &sink.borrow().events;
        assert_eq!(
            events[..],
            [
                "channel:general".to_string(),
                "message:C1:1589100000.000100".to_string(),
                "message:C1:1589100002.000100".to_string(),
            ]
        );
    }

    #[test]
    fn channels_streamed_in_name_order() {
        let mut api = FakeApi::new();
        api.channels = vec![
            channel("C2", "zulu", true),
            channel("C1", "alpha", true),
        ];

        let mut engine = Engine::new(api, Vec::new());
        let sink = wire(&mut engine);
        engine.run().unwrap();

        let events = &sink.borrow().events;
        assert_eq!(
            events[..],
            ["channel:alpha".to_string(), "channel:zulu".to_string()]
        );
    }

    #[test]
    fn non_channel_conversations_are_skipped_entirely() {
        let mut api = FakeApi::new();
        api.channels = vec![
            channel("C1", "general", true),
            channel("G1", "private-group", false),
        ];
        api.history.insert(
            "G1".to_string(),
            vec![message(Some("U1"), "1589100000.000100")],
        );

        let mut engine = Engine::new(api, Vec::new());
        let sink = wire(&mut engine);
        engine.run().unwrap();

        let events = &sink.borrow().events;
        assert_eq!(events[..], ["channel:general".to_string()]);
    }

    #[test]
    fn allow_listed_non_channel_is_traversed() {
        let mut api = FakeApi::new();
        api.channels = vec![channel("G1", "private-group", false)];
        api.history.insert(
            "G1".to_string(),
            vec![message(Some("U1"), "1589100000.000100")],
        );

        let mut engine = Engine::new(api, vec!["G1".to_string()]);
        let sink = wire(&mut engine);
        engine.run().unwrap();

        let events = &sink.borrow().events;
        assert_eq!(
            events[..],
            [
                "channel:private-group".to_string(),
                "message:G1:1589100000.000100".to_string(),
            ]
        );
    }

    #[test]
    fn allow_list_fetches_only_named_channels() {
        let mut api = FakeApi::new();
        api.channels = vec![
            channel("C1", "general", true),
            channel("C2", "random", true),
        ];

        let mut engine = Engine::new(api, vec!["C2".to_string()]);
        let sink = wire(&mut engine);
        engine.run().unwrap();

        let events = &sink.borrow().events;
        assert_eq!(events[..], ["channel:random".to_string()]);
    }

    #[test]
    fn unknown_allow_listed_channel_fails_the_run() {
        let api = FakeApi::new();
        let mut engine = Engine::new(api, vec!["C404".to_string()]);
        assert!(engine.run().is_err());
    }

    #[test]
    fn history_error_aborts_the_run() {
        let mut api = FakeApi::new();
        api.channels = vec![channel("C1", "general", true)];
        api.fail_history = true;

        let mut engine = Engine::new(api, Vec::new());
        let sink = wire(&mut engine);
        assert!(engine.run().is_err());

        // The channel was already streamed before the failure; partial state
        // is left as-is
        let events = &sink.borrow().events;
        assert_eq!(events[..], ["channel:general".to_string()]);
    }
}
