//! Report command handler.
//!
//! Wires the traversal engine to the three analyzers (message counts,
//! per-day rates, broadcast counts), runs the single streaming pass, then
//! renders each analyzer's ranked results to stdout in that order.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter};
use std::rc::Rc;

use anyhow::{Context, Result};

use slackstat::analyzer::UserMessageStats;
use slackstat::api::HttpSlackClient;
use slackstat::engine::Engine;
use slackstat::report::render;
use slackstat::transcript::TranscriptSink;
use slackstat::Config;

/// Run the workspace traversal and print the statistics report.
pub fn handle(
    limit_override: Option<usize>,
    channel_overrides: &[String],
    transcript_path: Option<&str>,
) -> Result<()> {
    let config = Config::load()?;
    let token = config.resolve_token()?;

    let limit = limit_override.unwrap_or(config.report.limit);
    let channels = if channel_overrides.is_empty() {
        config.api.channels.clone()
    } else {
        channel_overrides.to_vec()
    };

    let mut engine = Engine::new(HttpSlackClient::new(token), channels);

    let counts = register(&mut engine, UserMessageStats::message_counts(limit));
    let rates = register(&mut engine, UserMessageStats::per_day_rates(limit));
    let broadcasts = register(&mut engine, UserMessageStats::broadcast_counts(limit));

    let transcript = match transcript_path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create transcript file: {}", path))?;
            println!("Writing transcript to {}", path);
            Some(register(&mut engine, TranscriptSink::new(BufWriter::new(file))))
        }
        None => None,
    };

    engine.run()?;

    if let Some(transcript) = &transcript {
        transcript
            .borrow_mut()
            .flush()
            .context("Failed to write transcript")?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&mut out, &counts.borrow().extract_results())?;
    render(&mut out, &rates.borrow().extract_results())?;
    render(&mut out, &broadcasts.borrow().extract_results())?;

    Ok(())
}

/// Register one sink for all three entity streams.
fn register<S, A>(engine: &mut Engine<A>, sink: S) -> Rc<RefCell<S>>
where
    S: slackstat::UserSink + slackstat::ChannelSink + slackstat::MessageSink + 'static,
    A: slackstat::SlackApi,
{
    let sink = Rc::new(RefCell::new(sink));
    engine.add_user_sink(sink.clone());
    engine.add_channel_sink(sink.clone());
    engine.add_message_sink(sink.clone());
    sink
}
