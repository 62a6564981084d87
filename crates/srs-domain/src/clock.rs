//! The clock abstraction (`spec.md` §4.1 / §9 "global clock"). Every
//! component that needs "now" or "start of today" goes through a
//! `Clock` implementation so tests can inject a fixed instant instead of
//! reading the system clock directly.

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock time, injected rather than read globally.
pub trait Clock: Send + Sync {
    /// The current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// The start of "today" in the scheduling timezone, truncated to the
    /// 24-hour boundary. The source centralizes this on the process's
    /// local timezone; this implementation keeps that behavior but funnels
    /// every caller through this one method so it can be swapped later
    /// without touching call sites.
    fn today_start(&self) -> DateTime<Utc> {
        self.now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always representable")
            .and_utc()
    }

    /// The end of "today": the instant just before tomorrow's start.
    fn today_end(&self) -> DateTime<Utc> {
        self.today_start() + Duration::days(1) - Duration::nanoseconds(1)
    }
}

/// Production clock backed by [`chrono::Utc::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests, returning a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
