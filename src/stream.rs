use std::collections::HashMap;

use crate::error::{Error, Result};

/// A server-side named log channel. Read-only snapshot, fetched once per run.
#[derive(Debug, Clone)]
pub struct Stream {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

/// The set of active streams, indexed by server-assigned id.
#[derive(Debug, Clone, Default)]
pub struct StreamDirectory {
    streams: HashMap<String, Stream>,
}

impl StreamDirectory {
    pub fn new(streams: Vec<Stream>) -> Self {
        let streams = streams.into_iter().map(|s| (s.id.clone(), s)).collect();
        Self { streams }
    }

    pub fn get(&self, id: &str) -> Option<&Stream> {
        self.streams.get(id)
    }

    /// All streams ordered by title for listing, case-insensitively.
    pub fn sorted(&self) -> Vec<&Stream> {
        let mut streams: Vec<&Stream> = self.streams.values().collect();
        streams.sort_by_key(|s| s.title.to_lowercase());
        streams
    }

    /// Resolve a user-supplied name to a stream id.
    ///
    /// Matching is a case-insensitive prefix match on titles. When the prefix
    /// is ambiguous, only streams whose title equals the input exactly
    /// survive. No survivors is an error; several exact survivors (duplicate
    /// titles on the server) resolve to whichever comes first.
    pub fn resolve(&self, name: &str) -> Result<&str> {
        let needle = name.to_lowercase();
        let mut candidates: Vec<&Stream> = self
            .sorted()
            .into_iter()
            .filter(|s| s.title.to_lowercase().starts_with(&needle))
            .collect();

        if candidates.len() > 1 {
            candidates.retain(|s| s.title == name);
        }

        match candidates.first() {
            Some(stream) => Ok(&stream.id),
            None => Err(Error::StreamNotFound(name.to_string())),
        }
    }

    /// Resolve each name in input order, failing on the first unknown name.
    pub fn resolve_all(&self, names: &[String]) -> Result<Vec<String>> {
        names
            .iter()
            .map(|name| self.resolve(name).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StreamDirectory {
        StreamDirectory::new(vec![
            Stream {
                id: "id-errors".to_string(),
                title: "Web Errors".to_string(),
                description: Some("5xx responses".to_string()),
            },
            Stream {
                id: "id-access".to_string(),
                title: "Web Access".to_string(),
                description: None,
            },
            Stream {
                id: "id-api".to_string(),
                title: "API".to_string(),
                description: None,
            },
        ])
    }

    #[test]
    fn test_resolve_unique_prefix() {
        assert_eq!(directory().resolve("api").unwrap(), "id-api");
    }

    #[test]
    fn test_resolve_ambiguous_prefix_without_exact_match_fails() {
        let err = directory().resolve("web").unwrap_err();
        match err {
            Error::StreamNotFound(name) => assert_eq!(name, "web"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_ambiguous_prefix_narrowed_by_exact_title() {
        assert_eq!(directory().resolve("Web Errors").unwrap(), "id-errors");
    }

    #[test]
    fn test_resolve_exact_match_is_case_sensitive() {
        // "web errors" prefix-matches only one stream, so it resolves even
        // though the case differs; "web a" likewise.
        assert_eq!(directory().resolve("web errors").unwrap(), "id-errors");
        // But when the prefix is ambiguous, narrowing requires exact case.
        assert!(directory().resolve("WEB").is_err());
    }

    #[test]
    fn test_resolve_unknown_name_fails() {
        assert!(directory().resolve("syslog").is_err());
    }

    #[test]
    fn test_resolve_all_preserves_input_order() {
        let ids = directory()
            .resolve_all(&["api".to_string(), "Web Access".to_string()])
            .unwrap();
        assert_eq!(ids, vec!["id-api", "id-access"]);
    }

    #[test]
    fn test_resolve_all_stops_at_first_failure() {
        let err = directory()
            .resolve_all(&["api".to_string(), "nope".to_string(), "web".to_string()])
            .unwrap_err();
        match err {
            Error::StreamNotFound(name) => assert_eq!(name, "nope"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_sorted_orders_by_lowercased_title() {
        let directory = directory();
        let titles: Vec<&str> = directory.sorted().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["API", "Web Access", "Web Errors"]);
    }
}
