//! Timestamp helpers for frame TTL checks.
//!
//! Frame timestamps are 32-bit epoch seconds on the wire, so everything
//! here speaks `u32` seconds rather than `Duration`.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as seconds since the Unix epoch.
///
/// A pre-epoch clock collapses to 0, which receivers treat as "unchecked";
/// a broken clock therefore disables TTL rejection instead of panicking.
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_now_is_sane() {
        let now = unix_now();
        // 2023-11-15; anything earlier means the clock math is wrong.
        assert!(now > 1_700_000_000);
    }
}
