use core::time::Duration;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::trace;

/// How far a generator has run ahead of its clock.
///
/// Batch reservations may hand out IDs from future milliseconds, up to the
/// configured `max_overflow_ms`. This value records how far ahead the
/// generator was when it was measured, so callers can wait for real time to
/// catch up before asking for more.
///
/// The zero value ([`Overflow::is_zero`]) means there is no overflow.
///
/// Waiting is best-effort: if other callers keep reserving from the same
/// generator while you wait, it may still be ahead afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overflow {
    observed_at: Option<Instant>,
    ms_ahead: i64,
    sequence: i64,
}

impl Overflow {
    pub(crate) const fn new(observed_at: Instant, ms_ahead: i64, sequence: i64) -> Self {
        Self {
            observed_at: Some(observed_at),
            ms_ahead,
            sequence,
        }
    }

    /// Measures the overflow of a generator whose last used millisecond and
    /// sequence are `last_ms`/`last_sequence`, at clock reading `now`.
    pub(crate) fn measure(last_ms: i64, last_sequence: i64, now: i64) -> Self {
        if last_ms <= now {
            return Self::default();
        }
        Self::new(Instant::now(), last_ms.saturating_sub(now), last_sequence)
    }

    /// `true` if there is no overflow.
    pub const fn is_zero(&self) -> bool {
        self.ms_ahead == 0
    }

    /// When the overflow was measured. `None` for the zero value.
    pub const fn observed_at(&self) -> Option<Instant> {
        self.observed_at
    }

    /// Milliseconds the generator was ahead of its clock.
    pub const fn ms_ahead(&self) -> i64 {
        self.ms_ahead
    }

    /// The generator's last used sequence at the time of measurement.
    ///
    /// Together with [`Overflow::ms_ahead`] this pins down exactly how many
    /// IDs were handed out ahead of time.
    pub const fn sequence_at_overflow(&self) -> i64 {
        self.sequence
    }

    /// The overflow as a duration; zero if there is none.
    pub fn duration(&self) -> Duration {
        if self.is_zero() {
            return Duration::ZERO;
        }
        Duration::from_millis(self.ms_ahead.unsigned_abs())
    }

    /// What is left of [`Overflow::duration`] once the time elapsed since the
    /// measurement is taken off, floored at zero.
    ///
    /// Returns zero if the measurement appears to be in the future.
    pub fn duration_to_clear(&self) -> Duration {
        let duration = self.duration();
        if duration.is_zero() {
            return Duration::ZERO;
        }

        let Some(observed_at) = self.observed_at else {
            return Duration::ZERO;
        };
        Instant::now()
            .checked_duration_since(observed_at)
            .map_or(Duration::ZERO, |elapsed| duration.saturating_sub(elapsed))
    }

    /// Blocks the current thread for [`Overflow::duration_to_clear`].
    ///
    /// The generator is not re-checked afterwards.
    pub fn wait_until_cleared(&self) {
        let remaining = self.duration_to_clear();
        if remaining.is_zero() {
            return;
        }

        #[cfg(feature = "tracing")]
        trace!(?remaining, ms_ahead = self.ms_ahead, "waiting for overflow to clear");

        std::thread::sleep(remaining);
    }
}
