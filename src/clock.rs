//! Time sources and timestamp formatting.

use chrono::{Local, TimeZone, Utc};
use std::cell::Cell;
use std::fmt::Display;
use std::rc::Rc;

/// Source of epoch-millisecond timestamps.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> i64 {
        (**self).now_ms()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock for tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<i64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Format an epoch-millisecond timestamp as `HH:MM:SS` (24-hour, local time).
pub fn format_hhmmss(ts_ms: i64) -> String {
    format_hhmmss_in(ts_ms, &Local)
}

pub fn format_hhmmss_in<Tz>(ts_ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(ts_ms).earliest() {
        Some(dt) => dt.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn shared_clock_sees_updates() {
        let clock = Rc::new(ManualClock::new(0));
        let handle = Rc::clone(&clock);
        clock.advance(90_000);
        assert_eq!(handle.now_ms(), 90_000);
    }

    #[test]
    fn formats_24_hour_time() {
        // 2024-01-01T13:05:09Z
        let ts = 1_704_114_309_000;
        assert_eq!(format_hhmmss_in(ts, &Utc), "13:05:09");
    }

    #[test]
    fn formats_midnight_with_padding() {
        assert_eq!(format_hhmmss_in(0, &Utc), "00:00:00");
    }

    #[test]
    fn local_format_has_fixed_shape() {
        let s = format_hhmmss(SystemClock.now_ms());
        assert_eq!(s.len(), 8);
        assert_eq!(s.chars().filter(|c| *c == ':').count(), 2);
    }
}
