use crate::{error::ConfigError, id::SnowflakeId};

/// Number of low bits shared between the node and sequence fields.
///
/// Whatever is left of the 64 bits above them holds the timestamp offset.
pub const SHARED_BITS: u8 = 22;

/// A runtime bit layout for Snowflake IDs.
///
/// The 22 low bits are split between the node identifier and the
/// per-millisecond sequence; the timestamp offset takes the remaining high
/// bits.
///
/// ```text
///  Bit Index:  63                 22 21                   S S-1            0
///              +--------------------+---------------------+----------------+
///  Field:      | timestamp (42)     | node (22 - S)       | sequence (S)   |
///              +--------------------+---------------------+----------------+
///              |<------ MSB --------------- 64 bits ------------- LSB ---->|
/// ```
///
/// The codec performs no range checks: `node` must already fit in
/// [`Layout::node_max`] and `sequence` in [`Layout::sequence_mask`], otherwise
/// neighbouring fields are silently corrupted. Validation happens once, when a
/// [`SnowflakeNode`] is built.
///
/// # Example
///
/// ```
/// use snowblock::Layout;
///
/// let layout = Layout::new(10, 12).unwrap();
/// let id = layout.encode(1000, 2, 1);
/// assert_eq!(layout.decode_time(id), 1000);
/// assert_eq!(layout.decode_node(id), 2);
/// assert_eq!(layout.decode_sequence(id), 1);
/// ```
///
/// [`SnowflakeNode`]: crate::SnowflakeNode
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    node_bits: u8,
    sequence_bits: u8,
    node_max: i64,
    node_mask: i64,
    sequence_mask: i64,
    time_shift: u8,
    node_shift: u8,
}

impl Default for Layout {
    /// The Twitter split: 10 node bits and 12 sequence bits.
    fn default() -> Self {
        Self::TWITTER
    }
}

impl Layout {
    /// 10 node bits, 12 sequence bits.
    pub const TWITTER: Self = Self::from_bits(10, 12);

    /// Builds a layout, validating the node/sequence split.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroNodeBits`] if `node_bits == 0`
    /// - [`ConfigError::ZeroSequenceBits`] if `sequence_bits == 0`
    /// - [`ConfigError::InvalidBitSplit`] if the two do not add up to
    ///   [`SHARED_BITS`]
    pub fn new(node_bits: u8, sequence_bits: u8) -> Result<Self, ConfigError> {
        if node_bits == 0 {
            return Err(ConfigError::ZeroNodeBits);
        }
        if sequence_bits == 0 {
            return Err(ConfigError::ZeroSequenceBits);
        }
        if u16::from(node_bits) + u16::from(sequence_bits) != u16::from(SHARED_BITS) {
            return Err(ConfigError::InvalidBitSplit {
                node_bits,
                sequence_bits,
            });
        }
        Ok(Self::from_bits(node_bits, sequence_bits))
    }

    const fn from_bits(node_bits: u8, sequence_bits: u8) -> Self {
        let node_max = !(-1_i64 << node_bits);
        Self {
            node_bits,
            sequence_bits,
            node_max,
            node_mask: node_max << sequence_bits,
            sequence_mask: !(-1_i64 << sequence_bits),
            time_shift: node_bits + sequence_bits,
            node_shift: sequence_bits,
        }
    }

    /// Packs the three fields into an ID.
    #[inline]
    pub const fn encode(&self, time: i64, node: i64, sequence: i64) -> SnowflakeId {
        SnowflakeId::from_raw((time << self.time_shift) | (node << self.node_shift) | sequence)
    }

    /// Milliseconds since the epoch stored in `id`.
    #[inline]
    pub const fn decode_time(&self, id: SnowflakeId) -> i64 {
        id.to_raw() >> self.time_shift
    }

    /// Node identifier stored in `id`.
    #[inline]
    pub const fn decode_node(&self, id: SnowflakeId) -> i64 {
        (id.to_raw() & self.node_mask) >> self.node_shift
    }

    /// Sequence number stored in `id`.
    #[inline]
    pub const fn decode_sequence(&self, id: SnowflakeId) -> i64 {
        id.to_raw() & self.sequence_mask
    }

    pub const fn node_bits(&self) -> u8 {
        self.node_bits
    }

    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Largest node identifier this layout can hold (`2^node_bits - 1`).
    pub const fn node_max(&self) -> i64 {
        self.node_max
    }

    /// Node field mask, already shifted into place.
    pub const fn node_mask(&self) -> i64 {
        self.node_mask
    }

    /// Sequence field mask (`2^sequence_bits - 1`).
    pub const fn sequence_mask(&self) -> i64 {
        self.sequence_mask
    }

    pub const fn time_shift(&self) -> u8 {
        self.time_shift
    }

    pub const fn node_shift(&self) -> u8 {
        self.node_shift
    }

    /// IDs available per millisecond (`sequence_mask + 1`).
    pub const fn capacity(&self) -> i64 {
        self.sequence_mask + 1
    }

    /// Largest timestamp offset that encodes to a non-negative ID.
    pub const fn time_max(&self) -> i64 {
        i64::MAX >> self.time_shift
    }
}
