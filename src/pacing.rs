use chrono::{DateTime, Utc};
use std::time::Duration;

/// Longest pause between poll cycles.
pub const MAX_DELAY: Duration = Duration::from_secs(10);

/// Delays at or under this are treated as "poll again immediately".
pub const DEBOUNCE: Duration = Duration::from_secs(2);

/// Pick the pause before the next poll cycle from the timestamp of the most
/// recently delivered message.
///
/// No delivery this cycle means the stream is quiet: wait the full
/// `MAX_DELAY`. Otherwise wait roughly as long as the stream is lagging
/// behind real time, capped at `MAX_DELAY` — messages arriving near real
/// time keep the polling tight, a lagging stream backs off instead of
/// hammering the server with stale-window queries.
pub fn next_delay(last_delivered: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    let last = match last_delivered {
        Some(ts) => ts,
        None => return MAX_DELAY,
    };

    let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
    elapsed.min(MAX_DELAY)
}

/// Whether the computed delay is worth sleeping for.
pub fn should_sleep(delay: Duration) -> bool {
    delay > DEBOUNCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_delivery_waits_max_delay() {
        assert_eq!(next_delay(None, now()), MAX_DELAY);
    }

    #[test]
    fn test_far_behind_clamps_to_max_delay() {
        let last = now() - chrono::Duration::seconds(45);
        assert_eq!(next_delay(Some(last), now()), MAX_DELAY);
    }

    #[test]
    fn test_lagging_stream_waits_its_lag() {
        let last = now() - chrono::Duration::seconds(7);
        let delay = next_delay(Some(last), now());
        assert_eq!(delay, Duration::from_secs(7));
        assert!(should_sleep(delay));
    }

    #[test]
    fn test_near_real_time_does_not_sleep() {
        let last = now() - chrono::Duration::seconds(1);
        let delay = next_delay(Some(last), now());
        assert_eq!(delay, Duration::from_secs(1));
        assert!(!should_sleep(delay));
    }

    #[test]
    fn test_exactly_at_debounce_does_not_sleep() {
        assert!(!should_sleep(DEBOUNCE));
    }

    #[test]
    fn test_future_timestamp_clamps_to_zero() {
        // Clock skew: a message stamped ahead of our clock.
        let last = now() + chrono::Duration::seconds(30);
        assert_eq!(next_delay(Some(last), now()), Duration::ZERO);
    }
}
