use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::message::{parse_timestamp, Message};
use crate::stream::{Stream, StreamDirectory};
use crate::tail::MessageSource;

/// Relative search window, in seconds. Wide enough that the previous cycle's
/// anchor is still inside it after any realistic polling gap.
const WINDOW_SECS: u64 = 7200;

/// Upper bound on results per search call.
const PAGE_LIMIT: u64 = 100;

/// Request timeout on the shared client. The API answers search calls in
/// well under a second; anything past this is a dead server.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the Graylog REST API.
pub struct GraylogClient {
    base_uri: String,
    credentials: Option<(String, String)>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct StreamsResponse {
    streams: Vec<ApiStream>,
}

#[derive(Debug, Deserialize)]
struct ApiStream {
    id: String,
    title: String,
    description: Option<String>,
    disabled: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    messages: Vec<SearchHit>,
}

/// Each search result wraps the actual record in a "message" envelope.
#[derive(Debug, Deserialize)]
struct SearchHit {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(rename = "_id")]
    id: String,
    timestamp: String,
    message: String,
    full_message: Option<String>,
    facility: Option<String>,
    level: Option<i64>,
    source: Option<String>,
    #[serde(rename = "loggerName")]
    logger_name: Option<String>,
    #[serde(default)]
    streams: Vec<String>,
}

impl GraylogClient {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        let credentials = match (&server.username, &server.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            base_uri: server.uri.clone(),
            credentials,
            client,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!(url, "fetching");
        let mut request = self.client.get(url);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }
        Ok(response)
    }

    /// Fetch the set of active streams and index them by id.
    pub async fn fetch_streams(&self) -> Result<StreamDirectory> {
        let url = format!("{}/streams", self.base_uri);
        let response = self.get(&url).await?;

        let parsed: StreamsResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let streams = parsed
            .streams
            .into_iter()
            .filter(|s| !s.disabled)
            .map(|s| Stream {
                id: s.id,
                title: s.title,
                description: s.description.filter(|d| !d.is_empty()),
            })
            .collect();

        Ok(StreamDirectory::new(streams))
    }
}

#[async_trait]
impl MessageSource for GraylogClient {
    /// Issue one windowed search and return the page sorted by timestamp
    /// ascending. The server's ordering is not trusted.
    async fn search(
        &self,
        query: Option<&str>,
        stream_ids: Option<&[String]>,
    ) -> Result<Vec<Message>> {
        let url = search_url(&self.base_uri, query, stream_ids);
        let response = self.get(&url).await?;

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let mut messages = parsed
            .messages
            .into_iter()
            .map(|hit| {
                let m = hit.message;
                Ok(Message {
                    timestamp: parse_timestamp(&m.timestamp)?,
                    id: m.id,
                    message: m.message,
                    full_message: m.full_message,
                    facility: m.facility,
                    level: m.level,
                    source: m.source,
                    logger_name: m.logger_name,
                    stream_ids: m.streams,
                })
            })
            .collect::<Result<Vec<Message>>>()?;

        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }
}

/// Build the relative-search URL for one poll cycle. No query terms means
/// match everything; stream ids are OR-ed together in the filter.
fn search_url(base_uri: &str, query: Option<&str>, stream_ids: Option<&[String]>) -> String {
    let mut url = format!(
        "{}/search/universal/relative?range={}&limit={}",
        base_uri, WINDOW_SECS, PAGE_LIMIT
    );

    match query {
        Some(q) => {
            url.push_str("&query=");
            url.push_str(&urlencoding::encode(q));
        }
        None => url.push_str("&query=*"),
    }

    if let Some(ids) = stream_ids {
        if !ids.is_empty() {
            let filter: Vec<String> = ids
                .iter()
                .map(|id| format!("streams:{}", urlencoding::encode(id)))
                .collect();
            url.push_str("&filter=");
            url.push_str(&filter.join("%20OR%20"));
        }
    }

    url
}
