//! Error types for `snowblock`.
//!
//! Only two things can fail in this crate:
//! - building a generator or layout from an invalid configuration
//!   ([`ConfigError`]), and
//! - parsing one of the textual or binary ID renderings back into a
//!   [`SnowflakeId`] ([`ParseIdError`]).
//!
//! Generation itself is infallible once a [`SnowflakeNode`] exists.
//!
//! [`SnowflakeId`]: crate::SnowflakeId
//! [`SnowflakeNode`]: crate::SnowflakeNode

/// A result type defaulting to the crate-level [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors `snowblock` can produce.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A generator or layout was configured with invalid parameters.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An ID rendering could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseIdError),
}

/// Construction-time validation failures.
///
/// These are only ever returned while building a [`Layout`] or a
/// [`SnowflakeNode`]; nothing after construction returns them.
///
/// [`Layout`]: crate::Layout
/// [`SnowflakeNode`]: crate::SnowflakeNode
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// `node_bits` was zero.
    #[error("invalid config; node bits cannot be 0")]
    ZeroNodeBits,

    /// `sequence_bits` was zero.
    #[error("invalid config; sequence bits cannot be 0")]
    ZeroSequenceBits,

    /// `node_bits + sequence_bits` did not add up to the shared field width.
    #[error("invalid config; node bits + sequence bits must be 22, got {node_bits} + {sequence_bits}")]
    InvalidBitSplit {
        /// Configured node bits.
        node_bits: u8,
        /// Configured sequence bits.
        sequence_bits: u8,
    },

    /// `max_overflow_ms` was negative.
    #[error("invalid config; max overflow cannot be less than 0, got {0}")]
    NegativeMaxOverflow(i64),

    /// The node identifier does not fit in the configured node bits.
    #[error("node number must be between 0 and {max}, got {node}")]
    NodeOutOfRange {
        /// The rejected node identifier.
        node: i64,
        /// The largest node identifier the layout can hold.
        max: i64,
    },
}

/// Failures while parsing an ID from one of its external renderings.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseIdError {
    /// The input was not a valid integer in the expected radix.
    #[error("invalid base{radix} id: {source}")]
    Int {
        /// Radix the input was parsed in.
        radix: u32,
        /// Underlying integer parse failure.
        #[source]
        source: core::num::ParseIntError,
    },

    /// The input was not valid standard base64.
    #[error("invalid base64 id: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The base64 payload did not decode to ASCII decimal digits.
    #[error("base64 id payload is not valid utf-8")]
    Utf8(#[from] core::str::Utf8Error),
}

impl ParseIdError {
    pub(crate) const fn int(radix: u32, source: core::num::ParseIntError) -> Self {
        Self::Int { radix, source }
    }
}
