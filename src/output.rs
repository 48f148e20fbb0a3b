use std::io::{stdout, IsTerminal};

use crossterm::style::Stylize;

use crate::message::Message;
use crate::stream::StreamDirectory;

/// Whether output gets ANSI styling. Passed explicitly into the formatting
/// routines; there is no process-wide styling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Styled,
    Plain,
}

impl OutputStyle {
    /// Style when stdout is a terminal, unless the user opted out.
    pub fn detect(no_color: bool) -> Self {
        if no_color || !stdout().is_terminal() {
            OutputStyle::Plain
        } else {
            OutputStyle::Styled
        }
    }

    fn bold(&self, text: &str) -> String {
        match self {
            OutputStyle::Styled => text.bold().to_string(),
            OutputStyle::Plain => text.to_string(),
        }
    }
}

/// Render one message as a header line plus its body. The header carries the
/// timestamp, the titles of the streams the message belongs to, and whatever
/// of facility, level, source and logger name the record has.
pub fn format_message(message: &Message, streams: &StreamDirectory, style: OutputStyle) -> String {
    let mut parts: Vec<String> = Vec::new();

    parts.push(message.timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string());

    if !message.stream_ids.is_empty() {
        let titles: Vec<&str> = message
            .stream_ids
            .iter()
            .filter_map(|id| streams.get(id))
            .map(|s| s.title.as_str())
            .collect();
        if !titles.is_empty() {
            parts.push(format!("[{}]", titles.join(", ")));
        }
    }

    if let Some(facility) = &message.facility {
        parts.push(facility.clone());
    }
    if let Some(level) = message.level {
        parts.push(level.to_string());
    }
    if let Some(source) = &message.source {
        parts.push(source.clone());
    }
    if let Some(logger_name) = &message.logger_name {
        parts.push(logger_name.clone());
    }

    format!("{}\n{}", style.bold(&parts.join(" ")), message.body())
}

pub fn print_message(message: &Message, streams: &StreamDirectory, style: OutputStyle) {
    println!("{}", format_message(message, streams, style));
}

/// Render the stream listing, one stream per line, sorted by title.
pub fn format_stream_listing(streams: &StreamDirectory, style: OutputStyle) -> String {
    let mut lines: Vec<String> = Vec::new();
    for stream in streams.sorted() {
        match &stream.description {
            Some(description) => {
                lines.push(format!("{} - {}", style.bold(&stream.title), description))
            }
            None => lines.push(style.bold(&stream.title)),
        }
    }
    lines.join("\n")
}

pub fn print_stream_listing(streams: &StreamDirectory, style: OutputStyle) {
    println!("{}", format_stream_listing(streams, style));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Stream;
    use chrono::TimeZone;

    fn streams() -> StreamDirectory {
        StreamDirectory::new(vec![
            Stream {
                id: "s1".to_string(),
                title: "Web Errors".to_string(),
                description: Some("5xx responses".to_string()),
            },
            Stream {
                id: "s2".to_string(),
                title: "API".to_string(),
                description: None,
            },
        ])
    }

    fn message() -> Message {
        Message {
            id: "m1".to_string(),
            timestamp: chrono::Utc
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 5)
                .unwrap(),
            message: "request failed".to_string(),
            full_message: None,
            facility: Some("nginx".to_string()),
            level: Some(3),
            source: Some("web-1".to_string()),
            logger_name: None,
            stream_ids: vec!["s1".to_string()],
        }
    }

    #[test]
    fn test_format_message_plain() {
        let rendered = format_message(&message(), &streams(), OutputStyle::Plain);
        assert_eq!(
            rendered,
            "2024-03-01 12:00:05.000 [Web Errors] nginx 3 web-1\nrequest failed"
        );
    }

    #[test]
    fn test_format_message_omits_absent_fields() {
        let mut m = message();
        m.facility = None;
        m.level = None;
        m.source = None;
        m.stream_ids.clear();
        let rendered = format_message(&m, &streams(), OutputStyle::Plain);
        assert_eq!(rendered, "2024-03-01 12:00:05.000\nrequest failed");
    }

    #[test]
    fn test_format_message_prefers_full_message_body() {
        let mut m = message();
        m.full_message = Some("request failed\nstack trace follows".to_string());
        let rendered = format_message(&m, &streams(), OutputStyle::Plain);
        assert!(rendered.ends_with("request failed\nstack trace follows"));
    }

    #[test]
    fn test_format_message_skips_unknown_stream_ids() {
        let mut m = message();
        m.stream_ids = vec!["gone".to_string()];
        let rendered = format_message(&m, &streams(), OutputStyle::Plain);
        assert!(!rendered.contains('['));
    }

    #[test]
    fn test_format_message_styled_wraps_header_only() {
        let rendered = format_message(&message(), &streams(), OutputStyle::Styled);
        let (header, body) = rendered.split_once('\n').unwrap();
        assert!(header.starts_with("\u{1b}["));
        assert_eq!(body, "request failed");
    }

    #[test]
    fn test_format_stream_listing() {
        let rendered = format_stream_listing(&streams(), OutputStyle::Plain);
        assert_eq!(rendered, "API\nWeb Errors - 5xx responses");
    }
}
