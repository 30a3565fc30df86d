//! Line-per-entity transcript of a traversal.
//!
//! Optional sink that logs every streamed user, channel, and message to a
//! writer, mostly useful as a raw export of the workspace while the
//! analyzers do their counting. Enabled with `slackstat report --transcript`.

use std::io::Write;

use anyhow::Result;

use crate::api::types::{Channel, Message, User};
use crate::sink::{ChannelSink, MessageSink, UserSink};
use crate::timestamp;

/// Writes one line per observed entity.
pub struct TranscriptSink<W: Write> {
    out: W,
}

impl<W: Write> TranscriptSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Flush the underlying writer so buffered I/O errors surface to the
    /// caller instead of being dropped when the sink is torn down.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> UserSink for TranscriptSink<W> {
    fn observe_user(&mut self, user: &User) -> Result<()> {
        if user.deleted {
            writeln!(self.out, "USER: {} is deleted", user.name)?;
        } else if user.is_bot {
            writeln!(self.out, "USER: {} is a bot", user.name)?;
        } else {
            writeln!(self.out, "USER: {} - {}", user.id, user.name)?;
        }
        Ok(())
    }
}

impl<W: Write> ChannelSink for TranscriptSink<W> {
    fn observe_channel(&mut self, channel: &Channel) -> Result<()> {
        if channel.is_archived {
            writeln!(self.out, "CHANNEL: {} is archived", channel.name)?;
            return Ok(());
        }

        write!(self.out, "CHANNEL: {} - {}", channel.id, channel.name)?;
        for prev_name in &channel.previous_names {
            write!(self.out, ", {}", prev_name)?;
        }
        writeln!(self.out, " - Users: {}", channel.num_members)?;
        Ok(())
    }
}

impl<W: Write> MessageSink for TranscriptSink<W> {
    fn observe_message(&mut self, _channel_id: &str, message: &Message) -> Result<()> {
        let ts = timestamp::to_datetime(&message.ts)?;
        write!(
            self.out,
            "MESSAGE: {} - {}/{} - {} - {}",
            ts.format("%Y-%m-%d %H:%M:%S"),
            message.client_msg_id.as_deref().unwrap_or("-"),
            message.user.as_deref().unwrap_or("-"),
            message.kind,
            message.text
        )?;
        for file in &message.files {
            write!(self.out, "; File = {} - {}", file.name, file.permalink)?;
        }
        writeln!(self.out)?;
        Ok(())
    }
}
