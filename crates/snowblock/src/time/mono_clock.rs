use core::time::Duration;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::time::{TWITTER_EPOCH, TimeSource};

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// This avoids wall-clock adjustments (e.g., NTP slew or manual steps) while
/// still aligning timestamps to a fixed origin.
///
/// The wall clock is read exactly once, at construction, to compute how far
/// the process start is from the epoch. Every later reading adds the elapsed
/// [`Instant`] time to that offset, so readings never go backward within the
/// process.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    epoch: Duration,
    epoch_offset: i64, // in milliseconds
}

impl Default for MonotonicClock {
    /// Constructs a monotonic clock aligned to [`TWITTER_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(TWITTER_EPOCH)
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin (t = 0).
    ///
    /// An epoch later than the current wall-clock time is accepted; readings
    /// are then negative until the epoch is reached.
    ///
    /// # Example
    ///
    /// ```
    /// use snowblock::{MonotonicClock, TimeSource};
    /// use std::time::{Duration, SystemTime, UNIX_EPOCH};
    ///
    /// let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    /// let clock = MonotonicClock::with_epoch(now);
    ///
    /// std::thread::sleep(Duration::from_millis(5));
    ///
    /// // Never goes backward, and is close to the 5ms slept.
    /// assert!(clock.current_millis() >= 5);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        let start = Instant::now();
        let epoch_ms = i128::try_from(epoch.as_millis()).unwrap_or(i128::MAX);
        let epoch_offset = saturating_i64(unix_millis_now() - epoch_ms);
        Self {
            start,
            epoch,
            epoch_offset,
        }
    }

    /// The epoch this clock counts from.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.start.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_offset.saturating_add(elapsed)
    }
}

/// Signed milliseconds since the UNIX epoch; negative if the system clock is
/// set before 1970.
fn unix_millis_now() -> i128 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(since) => i128::try_from(since.as_millis()).unwrap_or(i128::MAX),
        Err(before) => -i128::try_from(before.duration().as_millis()).unwrap_or(i128::MAX),
    }
}

fn saturating_i64(ms: i128) -> i64 {
    i64::try_from(ms).unwrap_or(if ms < 0 { i64::MIN } else { i64::MAX })
}
