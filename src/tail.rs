use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::Result;
use crate::message::{advance, Message};
use crate::output::{print_message, OutputStyle};
use crate::pacing::{next_delay, should_sleep, MAX_DELAY};
use crate::stream::StreamDirectory;

/// Where the poll loop gets its pages from. `GraylogClient` is the real
/// implementation; tests script their own.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn search(
        &self,
        query: Option<&str>,
        stream_ids: Option<&[String]>,
    ) -> Result<Vec<Message>>;
}

/// The tail loop. Repeatedly fetches a window of messages, drops everything
/// already delivered, prints the rest, and paces itself from the arrival
/// rate. Runs until the shutdown signal fires.
pub struct Tailer<S> {
    source: S,
    streams: StreamDirectory,
    query: Option<String>,
    stream_ids: Option<Vec<String>>,
    style: OutputStyle,
    last_message_id: Option<String>,
}

impl<S: MessageSource> Tailer<S> {
    pub fn new(
        source: S,
        streams: StreamDirectory,
        query: Option<String>,
        stream_ids: Option<Vec<String>>,
        style: OutputStyle,
    ) -> Self {
        Self {
            source,
            streams,
            query,
            stream_ids,
            style,
            last_message_id: None,
        }
    }

    /// The id of the most recently delivered message.
    pub fn last_message_id(&self) -> Option<&str> {
        self.last_message_id.as_deref()
    }

    /// One fetch cycle: fetch a page, keep what is new, advance the anchor.
    /// The filters are identical every cycle; only the anchor moves.
    async fn poll_once(&mut self) -> Result<Vec<Message>> {
        let page = self
            .source
            .search(self.query.as_deref(), self.stream_ids.as_deref())
            .await?;

        let new = advance(page, self.last_message_id.as_deref());
        if let Some(last) = new.last() {
            self.last_message_id = Some(last.id.clone());
        }
        Ok(new)
    }

    /// Run until `shutdown` fires. Recoverable fetch failures are reported
    /// and retried after the maximum delay with unchanged state; anything
    /// else ends the loop by propagating.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            if *shutdown.borrow() {
                return Ok(());
            }

            match self.poll_once().await {
                Ok(new) => {
                    for message in &new {
                        print_message(message, &self.streams, self.style);
                    }
                    debug!(count = new.len(), "poll cycle complete");

                    let delay = next_delay(new.last().map(|m| m.timestamp), Utc::now());
                    if should_sleep(delay) && !pause(&mut shutdown, delay).await {
                        return Ok(());
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "fetch failed, retrying");
                    eprintln!("{}", e);
                    if !pause(&mut shutdown, MAX_DELAY).await {
                        return Ok(());
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Sleep for `delay`, racing the shutdown signal. Returns false when
/// shutdown won.
async fn pause(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.changed() => false,
    }
}
