use core::{cmp::Ordering, time::Duration};

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace};

use crate::{
    config::Config,
    error::ConfigError,
    generator::{Block, Mutex, MutexGuard, Overflow, lock},
    id::{Layout, SnowflakeId},
    time::{MonotonicClock, TimeSource},
};

/// Mutable generator state, only ever touched under the node's lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeState {
    /// Last timestamp offset handed out.
    pub(crate) last_ms: i64,
    /// Last sequence handed out within `last_ms`.
    pub(crate) last_sequence: i64,
}

impl NodeState {
    /// Sorts before any real clock reading, so the first generation always
    /// starts a new millisecond.
    pub(crate) const NEVER_USED: i64 = i64::MIN;

    pub(crate) const fn new() -> Self {
        Self {
            last_ms: Self::NEVER_USED,
            last_sequence: 0,
        }
    }

    /// How many IDs can be reserved right now without running more than
    /// `max_overflow_ms` milliseconds ahead of `now`, or past `time_max`.
    pub(crate) fn max_block_size(
        &self,
        now: i64,
        sequence_mask: i64,
        max_overflow_ms: i64,
        time_max: i64,
    ) -> i64 {
        self.overflow_room(now, sequence_mask, max_overflow_ms)
            .min(self.time_room(now, sequence_mask, time_max))
    }

    fn overflow_room(&self, now: i64, sequence_mask: i64, max_overflow_ms: i64) -> i64 {
        let capacity = sequence_mask + 1;
        match self.last_ms.cmp(&now) {
            Ordering::Less => max_overflow_ms.saturating_add(1).saturating_mul(capacity),
            Ordering::Equal => max_overflow_ms
                .saturating_mul(capacity)
                .saturating_add(sequence_mask - self.last_sequence),
            Ordering::Greater => {
                let ahead = self.last_ms.saturating_sub(now);
                if ahead > max_overflow_ms {
                    return 0;
                }
                (max_overflow_ms - ahead)
                    .saturating_mul(capacity)
                    .saturating_add(sequence_mask - self.last_sequence)
            }
        }
    }

    /// Slots left from the next free one up to the last sequence of `time_max`.
    fn time_room(&self, now: i64, sequence_mask: i64, time_max: i64) -> i64 {
        let capacity = sequence_mask + 1;
        let room = if self.last_ms < now {
            time_max
                .saturating_sub(now)
                .saturating_add(1)
                .saturating_mul(capacity)
        } else {
            time_max
                .saturating_sub(self.last_ms)
                .saturating_mul(capacity)
                .saturating_add(sequence_mask - self.last_sequence)
        };
        room.max(0)
    }

    /// The slot right after the last one handed out, never earlier than `now`.
    const fn next_slot(&self, now: i64, sequence_mask: i64) -> (i64, i64) {
        if self.last_ms < now {
            (now, 0)
        } else if self.last_sequence < sequence_mask {
            (self.last_ms, self.last_sequence + 1)
        } else {
            (self.last_ms.saturating_add(1), 0)
        }
    }
}

#[cfg(feature = "cache-padded")]
type StateCell = crossbeam_utils::CachePadded<Mutex<NodeState>>;
#[cfg(not(feature = "cache-padded"))]
type StateCell = Mutex<NodeState>;

fn state_cell(state: NodeState) -> StateCell {
    #[cfg(feature = "cache-padded")]
    {
        crossbeam_utils::CachePadded::new(Mutex::new(state))
    }
    #[cfg(not(feature = "cache-padded"))]
    {
        Mutex::new(state)
    }
}

/// A lock-based Snowflake generator for one node identity.
///
/// Every ID packs the milliseconds elapsed since the configured epoch, the
/// node identifier and a per-millisecond sequence (see [`Layout`]). All
/// mutable state sits behind one mutex, so a node can be shared freely across
/// threads (wrap it in an [`Arc`](std::sync::Arc)).
///
/// Two access patterns are supported:
/// - [`SnowflakeNode::generate`] hands out one ID at a time and waits
///   (spinning) when a millisecond's sequence is exhausted.
/// - [`SnowflakeNode::generate_batch`] reserves a contiguous [`Block`] in one
///   step, never blocks, and may run up to `max_overflow_ms` milliseconds
///   ahead of the clock.
///
/// Mixing both patterns on one node works, but single generation then waits
/// for any batch overflow to clear first. Serve bulk and single callers from
/// different nodes.
///
/// IDs from one node are strictly increasing as long as the clock does not
/// go backward. Uniqueness across nodes relies on every node having a
/// distinct identifier.
///
/// # Example
///
/// ```
/// use snowblock::{Config, SnowflakeNode};
///
/// let node = SnowflakeNode::with_config(1, Config::default().with_max_overflow_ms(2)).unwrap();
///
/// let a = node.generate();
/// let b = node.generate();
/// assert!(a < b);
///
/// let (block, overflow) = node.generate_batch(10_000);
/// assert!(!block.is_empty());
/// assert!(block.first() > b);
/// # let _ = overflow;
/// ```
pub struct SnowflakeNode<T = MonotonicClock>
where
    T: TimeSource,
{
    state: StateCell,
    layout: Layout,
    node: i64,
    epoch: Duration,
    max_overflow_ms: i64,
    time: T,
}

impl SnowflakeNode<MonotonicClock> {
    /// Creates a node with the default [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NodeOutOfRange`] if `node` is outside
    /// `[0, 1023]`.
    pub fn new(node: i64) -> Result<Self, ConfigError> {
        Self::with_config(node, Config::default())
    }

    /// Creates a node using `config`, measuring time with a
    /// [`MonotonicClock`] anchored at `config.epoch`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails [`Config::validate`] for
    /// `node`.
    pub fn with_config(node: i64, config: Config) -> Result<Self, ConfigError> {
        Self::with_time(node, config, MonotonicClock::with_epoch(config.epoch))
    }
}

impl<T> SnowflakeNode<T>
where
    T: TimeSource,
{
    /// Creates a node using `config` and a caller-supplied time source.
    ///
    /// `time` must already count milliseconds from `config.epoch`; the epoch is
    /// only recorded so IDs can be turned back into wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `config` fails [`Config::validate`] for
    /// `node`.
    pub fn with_time(node: i64, config: Config, time: T) -> Result<Self, ConfigError> {
        let layout = config.validate(node)?;

        #[cfg(feature = "tracing")]
        debug!(
            node,
            node_bits = layout.node_bits(),
            sequence_bits = layout.sequence_bits(),
            max_overflow_ms = config.max_overflow_ms,
            epoch = ?config.epoch,
            "created snowflake node"
        );

        Ok(Self {
            state: state_cell(NodeState::new()),
            layout,
            node,
            epoch: config.epoch,
            max_overflow_ms: config.max_overflow_ms,
            time,
        })
    }

    /// Generates the next ID.
    ///
    /// If `max_overflow_ms > 0` and a batch reservation has pushed this node
    /// ahead of the clock, the calling thread first sleeps until the overflow
    /// has cleared. The sleep happens without holding the lock.
    ///
    /// When the current millisecond's sequence is exhausted, this spins on the
    /// clock, holding the lock, until the next millisecond starts. That burns
    /// CPU and stalls other callers of this node for up to a millisecond,
    /// keeping per-node ordering strict and latency low.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(node = self.node)))]
    pub fn generate(&self) -> SnowflakeId {
        if self.max_overflow_ms > 0 {
            self.overflow().wait_until_cleared();
        }
        self.generate_now()
    }

    /// The generation step proper, without any overflow wait.
    pub(crate) fn generate_now(&self) -> SnowflakeId {
        let mut state = self.lock_state();
        let mask = self.layout.sequence_mask();
        let mut now = self.time.current_millis();

        match now.cmp(&state.last_ms) {
            Ordering::Greater => {
                state.last_sequence = 0;
            }
            Ordering::Equal | Ordering::Less => {
                if now < state.last_ms {
                    Self::cold_clock_behind(now, state.last_ms);
                }

                // The stored millisecond is authoritative; never move it back.
                now = state.last_ms;
                state.last_sequence = (state.last_sequence + 1) & mask;
                if state.last_sequence == 0 {
                    now = self.spin_until_after(state.last_ms);
                }
            }
        }

        state.last_ms = now;
        self.layout.encode(state.last_ms, self.node, state.last_sequence)
    }

    /// Reserves up to `count` contiguous IDs.
    ///
    /// Never blocks. The block is clamped to what fits without the node running
    /// more than `max_overflow_ms` ahead of the clock or past the largest
    /// timestamp the layout can encode, and is empty when nothing fits. The returned [`Overflow`] reflects the node after the reservation;
    /// wait on it before asking again if the block came back short or empty.
    ///
    /// A `count` below 1 returns an empty block and a zero overflow without
    /// touching the node.
    ///
    /// Iterating the block yields the same IDs sequential
    /// [`SnowflakeNode::generate`] calls would have produced.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(node = self.node)))]
    pub fn generate_batch(&self, count: i64) -> (Block, Overflow) {
        if count < 1 {
            return (Block::default(), Overflow::default());
        }

        let mut state = self.lock_state();
        let now = self.time.current_millis();
        let mask = self.layout.sequence_mask();

        let available = state.max_block_size(now, mask, self.max_overflow_ms, self.layout.time_max());

        #[cfg(feature = "tracing")]
        if count > available {
            trace!(requested = count, available, "block clamped to available capacity");
        }

        let count = count.min(available);

        let block = if count == 0 {
            Block::default()
        } else {
            let (first_ms, first_sequence) = state.next_slot(now, mask);
            let first = self.layout.encode(first_ms, self.node, first_sequence);

            // Land on the last reserved slot in one step.
            let capacity = self.layout.capacity();
            let last_slot = first_sequence.saturating_add(count - 1);
            state.last_ms = first_ms.saturating_add(last_slot / capacity);
            state.last_sequence = last_slot % capacity;

            Block::new(first, count, self.layout.node_mask(), mask)
        };

        let overflow = Overflow::measure(state.last_ms, state.last_sequence, now);
        (block, overflow)
    }

    /// How far this node is currently ahead of its clock.
    pub fn overflow(&self) -> Overflow {
        let state = self.lock_state();
        Overflow::measure(state.last_ms, state.last_sequence, self.time.current_millis())
    }

    /// The node identifier embedded in every ID.
    pub const fn node(&self) -> i64 {
        self.node
    }

    /// The bit layout IDs are encoded with.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The epoch timestamps count from.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    pub const fn max_overflow_ms(&self) -> i64 {
        self.max_overflow_ms
    }

    /// The time source this node reads.
    pub const fn time_source(&self) -> &T {
        &self.time
    }

    fn lock_state(&self) -> MutexGuard<'_, NodeState> {
        let mutex: &Mutex<NodeState> = &self.state;
        lock(mutex)
    }

    /// Busy-waits until the clock reads past `last_ms` and returns that
    /// reading.
    fn spin_until_after(&self, last_ms: i64) -> i64 {
        loop {
            let now = self.time.current_millis();
            if now > last_ms {
                return now;
            }
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn cold_clock_behind(now: i64, last_ms: i64) {
        #[cfg(feature = "tracing")]
        debug!(now, last_ms, behind_ms = last_ms - now, "clock behind last used millisecond");
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> NodeState {
        *self.lock_state()
    }
}

impl<T> core::fmt::Debug for SnowflakeNode<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnowflakeNode")
            .field("node", &self.node)
            .field("layout", &self.layout)
            .field("epoch", &self.epoch)
            .field("max_overflow_ms", &self.max_overflow_ms)
            .finish_non_exhaustive()
    }
}
