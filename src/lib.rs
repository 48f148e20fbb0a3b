//! Tail logs from a Graylog server, like `tail -f` over HTTP.
//!
//! The library is organized around the poll loop in [`tail`]: the
//! [`client::GraylogClient`] fetches time-windowed pages from the search
//! API, [`message::advance`] drops everything already delivered, and
//! [`pacing`] decides how long to wait before the next cycle.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod output;
pub mod pacing;
pub mod stream;
pub mod tail;
