//! Monotonic instant arithmetic.
//!
//! A [`TimeSpec`] is a `(seconds, nanoseconds)` pair measured on the
//! monotonic clock from a process-wide epoch.  The epoch is fixed the first
//! time any clock function runs (the scheduler touches it on construction),
//! so every task in the process shares the same reference "zero".
//!
//! Instants are always normalised so that `0 <= nsec < 1_000_000_000`, which
//! makes the derived lexicographic ordering on `(sec, nsec)` the correct
//! time ordering.
//!
//! # Example
//!
//! ```rust
//! use conesim_kernel::clock::TimeSpec;
//!
//! let t = TimeSpec::new(1, 999_000_000).add_ms(1);
//! assert_eq!(t, TimeSpec::new(2, 0));
//! assert!(t > TimeSpec::new(1, 999_999_999));
//! ```

use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: i64 = 1_000_000_000;

const NANOS_PER_MILLI: i64 = 1_000_000;

static EPOCH: OnceLock<Instant> = OnceLock::new();

fn epoch() -> Instant {
    *EPOCH.get_or_init(Instant::now)
}

// ────────────────────────────────────────────────────────────────────────────
// TimeSpec
// ────────────────────────────────────────────────────────────────────────────

/// A monotonic instant, relative to the process clock epoch.
///
/// Field order matters: the derived `Ord` compares `sec` first, then `nsec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeSpec {
    sec: i64,
    nsec: i64,
}

impl TimeSpec {
    /// Build an instant, carrying any nanosecond overflow (or underflow) into
    /// the seconds field.
    pub fn new(sec: i64, nsec: i64) -> Self {
        Self {
            sec: sec + nsec.div_euclid(NANOS_PER_SEC),
            nsec: nsec.rem_euclid(NANOS_PER_SEC),
        }
    }

    /// The current monotonic instant.
    pub fn now() -> Self {
        Self::from_elapsed(epoch().elapsed())
    }

    fn from_elapsed(d: Duration) -> Self {
        Self::new(d.as_secs() as i64, i64::from(d.subsec_nanos()))
    }

    pub fn sec(self) -> i64 {
        self.sec
    }

    pub fn nsec(self) -> i64 {
        self.nsec
    }

    /// Return `self` shifted by `ms` milliseconds (may be negative).
    pub fn add_ms(self, ms: i64) -> Self {
        Self::new(
            self.sec + ms.div_euclid(1000),
            self.nsec + ms.rem_euclid(1000) * NANOS_PER_MILLI,
        )
    }

    /// Total nanoseconds since the epoch.
    pub fn as_nanos(self) -> i64 {
        self.sec * NANOS_PER_SEC + self.nsec
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Self) -> Duration {
        let delta = self.as_nanos() - earlier.as_nanos();
        if delta <= 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(delta as u64)
        }
    }

    /// The [`Instant`] this value denotes. Instants before the epoch clamp
    /// to the epoch.
    pub fn to_instant(self) -> Instant {
        epoch() + self.saturating_since(TimeSpec::default())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Free functions
// ────────────────────────────────────────────────────────────────────────────

/// Block the calling thread until the absolute instant `target`.
///
/// Returns immediately when `target` is already in the past.  The remaining
/// time is recomputed from the absolute target after every wake-up, so an
/// early or late wake never shifts later targets.
pub fn sleep_until(target: TimeSpec) {
    let deadline = target.to_instant();
    loop {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        thread::sleep(deadline - now);
    }
}

/// Milliseconds elapsed since the clock epoch.
pub fn systime_ms() -> u64 {
    epoch().elapsed().as_millis() as u64
}

/// Microseconds elapsed since the clock epoch.
pub fn systime_us() -> u64 {
    epoch().elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalises_nanosecond_overflow() {
        let t = TimeSpec::new(0, 2_500_000_000);
        assert_eq!(t.sec(), 2);
        assert_eq!(t.nsec(), 500_000_000);
    }

    #[test]
    fn new_normalises_negative_nanoseconds() {
        let t = TimeSpec::new(3, -1);
        assert_eq!(t.sec(), 2);
        assert_eq!(t.nsec(), 999_999_999);
    }

    #[test]
    fn add_ms_carries_exactly_at_one_second() {
        // 999 ms + 1 ms must land on exactly 1 s, never on (0, 1e9).
        let t = TimeSpec::new(0, 999_000_000).add_ms(1);
        assert_eq!(t, TimeSpec::new(1, 0));
        assert_eq!(t.nsec(), 0);
    }

    #[test]
    fn add_ms_handles_whole_seconds_and_remainder() {
        let t = TimeSpec::new(10, 100).add_ms(2_050);
        assert_eq!(t.sec(), 12);
        assert_eq!(t.nsec(), 50_000_100);
    }

    #[test]
    fn add_negative_ms_moves_backwards() {
        let t = TimeSpec::new(5, 0).add_ms(-1);
        assert_eq!(t, TimeSpec::new(4, 999_000_000));
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(TimeSpec::new(1, 0) > TimeSpec::new(0, 999_999_999));
        assert!(TimeSpec::new(1, 5) > TimeSpec::new(1, 4));
        assert_eq!(TimeSpec::new(2, 0).cmp(&TimeSpec::new(2, 0)), std::cmp::Ordering::Equal);
    }

    #[test]
    fn now_is_monotonic() {
        let a = TimeSpec::now();
        let b = TimeSpec::now();
        assert!(b >= a);
    }

    #[test]
    fn saturating_since_clamps_to_zero() {
        let early = TimeSpec::new(1, 0);
        let late = TimeSpec::new(1, 500);
        assert_eq!(late.saturating_since(early), Duration::from_nanos(500));
        assert_eq!(early.saturating_since(late), Duration::ZERO);
    }

    #[test]
    fn sleep_until_reaches_target() {
        let target = TimeSpec::now().add_ms(15);
        sleep_until(target);
        assert!(TimeSpec::now() >= target);
    }

    #[test]
    fn sleep_until_past_target_returns_immediately() {
        let start = Instant::now();
        sleep_until(TimeSpec::now().add_ms(-100));
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
