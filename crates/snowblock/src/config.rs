use core::time::Duration;

use crate::{error::ConfigError, id::Layout, time::TWITTER_EPOCH};

/// Parameters for a [`SnowflakeNode`].
///
/// The defaults reproduce the classic Twitter scheme: [`TWITTER_EPOCH`], 10
/// node bits, 12 sequence bits and no overflow.
///
/// # Example
///
/// ```
/// use snowblock::{Config, DISCORD_EPOCH};
///
/// let config = Config::default()
///     .with_epoch(DISCORD_EPOCH)
///     .with_bits(12, 10)
///     .with_max_overflow_ms(5);
/// assert!(config.validate(4095).is_ok());
/// ```
///
/// [`SnowflakeNode`]: crate::SnowflakeNode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    /// Origin of the timestamp field, as a duration since the UNIX epoch.
    pub epoch: Duration,

    /// Bits reserved for the node identifier. Shares 22 bits with
    /// `sequence_bits`.
    pub node_bits: u8,

    /// Bits reserved for the per-millisecond sequence. Shares 22 bits with
    /// `node_bits`.
    pub sequence_bits: u8,

    /// How many milliseconds a batch reservation may run ahead of the clock.
    /// `0` disables overflow.
    pub max_overflow_ms: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epoch: TWITTER_EPOCH,
            node_bits: 10,
            sequence_bits: 12,
            max_overflow_ms: 0,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn with_epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    #[must_use]
    pub const fn with_bits(mut self, node_bits: u8, sequence_bits: u8) -> Self {
        self.node_bits = node_bits;
        self.sequence_bits = sequence_bits;
        self
    }

    #[must_use]
    pub const fn with_max_overflow_ms(mut self, max_overflow_ms: i64) -> Self {
        self.max_overflow_ms = max_overflow_ms;
        self
    }

    /// Checks this configuration for use by `node` and returns the resulting
    /// layout.
    ///
    /// # Errors
    ///
    /// Fails, in this order, when `node_bits` is 0, `sequence_bits` is 0, the
    /// two do not sum to 22, `max_overflow_ms` is negative, or `node` is
    /// outside `[0, 2^node_bits - 1]`.
    pub fn validate(&self, node: i64) -> Result<Layout, ConfigError> {
        let layout = Layout::new(self.node_bits, self.sequence_bits)?;

        if self.max_overflow_ms < 0 {
            return Err(ConfigError::NegativeMaxOverflow(self.max_overflow_ms));
        }

        if !(0..=layout.node_max()).contains(&node) {
            return Err(ConfigError::NodeOutOfRange {
                node,
                max: layout.node_max(),
            });
        }

        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_twitter() {
        let config = Config::default();
        assert_eq!(config.epoch, TWITTER_EPOCH);
        assert_eq!(config.validate(0), Ok(Layout::TWITTER));
        assert_eq!(config.validate(1023), Ok(Layout::TWITTER));
    }

    #[test]
    fn validation_table() {
        let cases = [
            ("valid config", 0, Config::default(), None),
            (
                "invalid node",
                -1,
                Config::default(),
                Some(ConfigError::NodeOutOfRange { node: -1, max: 1023 }),
            ),
            (
                "node above max",
                1024,
                Config::default(),
                Some(ConfigError::NodeOutOfRange {
                    node: 1024,
                    max: 1023,
                }),
            ),
            (
                "node bits should be > 0",
                -1,
                Config::default().with_bits(0, 12),
                Some(ConfigError::ZeroNodeBits),
            ),
            (
                "sequence bits should be > 0",
                -1,
                Config::default().with_bits(10, 0),
                Some(ConfigError::ZeroSequenceBits),
            ),
            (
                "bits cannot be more than 22",
                -1,
                Config::default().with_bits(10, 20),
                Some(ConfigError::InvalidBitSplit {
                    node_bits: 10,
                    sequence_bits: 20,
                }),
            ),
            (
                "bits cannot be less than 22",
                -1,
                Config::default().with_bits(13, 2),
                Some(ConfigError::InvalidBitSplit {
                    node_bits: 13,
                    sequence_bits: 2,
                }),
            ),
            (
                "max overflow should be 0 or more",
                -1,
                Config::default().with_bits(12, 10).with_max_overflow_ms(-1),
                Some(ConfigError::NegativeMaxOverflow(-1)),
            ),
        ];

        for (name, node, config, want) in cases {
            assert_eq!(config.validate(node).err(), want, "{name}");
        }
    }

    #[test]
    fn every_split_accepts_its_node_range() {
        for node_bits in 1..22 {
            let config = Config::default().with_bits(node_bits, 22 - node_bits);
            let max = (1_i64 << node_bits) - 1;
            assert!(config.validate(0).is_ok());
            assert!(config.validate(max).is_ok());
            assert!(config.validate(max + 1).is_err());
        }
    }

    #[test]
    fn bit_split_sum_does_not_wrap() {
        let config = Config::default().with_bits(200, 78);
        assert!(matches!(
            config.validate(0),
            Err(ConfigError::InvalidBitSplit { .. })
        ));
    }
}
