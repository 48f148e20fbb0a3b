use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Graylog timestamps arrive as e.g. "2024-03-01T12:34:56.789Z".
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// One log entry as returned by the search API. Immutable once parsed;
/// printed and then dropped.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Short body text, always present.
    pub message: String,
    /// Long-form body; preferred over `message` for display when present.
    pub full_message: Option<String>,
    pub facility: Option<String>,
    pub level: Option<i64>,
    pub source: Option<String>,
    pub logger_name: Option<String>,
    /// Ids of the streams this message was routed to.
    pub stream_ids: Vec<String>,
}

impl Message {
    /// The text to display: the full message when the server stored one,
    /// otherwise the short form.
    pub fn body(&self) -> &str {
        self.full_message.as_deref().unwrap_or(&self.message)
    }
}

/// Parse a timestamp in the server's fixed wire format.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::Parse(format!("bad timestamp '{}': {}", raw, e)))
}

/// Given a freshly fetched page (sorted ascending by timestamp) and the id of
/// the last message already delivered, return only the genuinely new
/// messages, in order.
///
/// A `None` anchor means no history yet: the whole page is new. If the anchor
/// is present in the page, everything strictly after its first occurrence is
/// new. If the anchor is absent (it aged out of the search window), the whole
/// page is returned; a message could in theory be re-delivered across a gap
/// longer than the window, but the anchor is otherwise always inside the
/// window of the next fetch.
pub fn advance(page: Vec<Message>, last_message_id: Option<&str>) -> Vec<Message> {
    let anchor = match last_message_id {
        Some(id) => id,
        None => return page,
    };

    match page.iter().position(|m| m.id == anchor) {
        Some(index) => page.into_iter().skip(index + 1).collect(),
        None => page,
    }
}
