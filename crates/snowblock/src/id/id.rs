use base64::{Engine as _, engine::general_purpose::STANDARD};
use core::{fmt, str::FromStr, time::Duration};

use crate::{error::ParseIdError, id::Layout};

/// A 64-bit Snowflake ID.
///
/// The raw value is a signed integer; how it splits into timestamp, node and
/// sequence depends on the [`Layout`] of the generator that produced it, so
/// field access goes through the layout.
///
/// The external renderings mirror the formats downstream marshalling code
/// expects: decimal, base-2, base-36, base-64 of the decimal digits, and an
/// 8-byte big-endian integer.
///
/// # Example
///
/// ```
/// use snowblock::SnowflakeId;
///
/// let id = SnowflakeId::from_raw(1_234_567);
/// assert_eq!(id.to_string(), "1234567");
/// assert_eq!(id.to_base36(), "qglj");
/// assert_eq!(SnowflakeId::parse_base36("qglj").unwrap(), id);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId(i64);

impl SnowflakeId {
    /// Wraps a raw integer.
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer.
    #[inline]
    pub const fn to_raw(self) -> i64 {
        self.0
    }

    /// Wall-clock time the ID was generated at, as a duration since the UNIX
    /// epoch, given the layout and epoch of the generator that produced it.
    ///
    /// Returns `None` if the ID predates the UNIX epoch.
    pub fn unix_time(self, layout: &Layout, epoch: Duration) -> Option<Duration> {
        let offset = layout.decode_time(self);
        if offset >= 0 {
            epoch.checked_add(Duration::from_millis(offset.unsigned_abs()))
        } else {
            epoch.checked_sub(Duration::from_millis(offset.unsigned_abs()))
        }
    }

    /// Base-2 rendering, with a leading `-` for negative IDs.
    pub fn to_base2(self) -> String {
        format_radix(self.0, 2)
    }

    /// Base-36 rendering (`0-9a-z`), with a leading `-` for negative IDs.
    pub fn to_base36(self) -> String {
        format_radix(self.0, 36)
    }

    /// Standard base64 of the decimal-string bytes.
    pub fn to_base64(self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// The decimal-string bytes.
    pub fn to_bytes(self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }

    /// The integer as 8 big-endian bytes.
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Inverse of [`SnowflakeId::to_be_bytes`].
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(i64::from_be_bytes(bytes))
    }

    /// Parses a base-2 rendering.
    ///
    /// # Errors
    ///
    /// Returns [`ParseIdError::Int`] if `s` is not a base-2 `i64`.
    pub fn parse_base2(s: &str) -> Result<Self, ParseIdError> {
        parse_radix(s, 2)
    }

    /// Parses a base-36 rendering. Upper and lower case are both accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ParseIdError::Int`] if `s` is not a base-36 `i64`.
    pub fn parse_base36(s: &str) -> Result<Self, ParseIdError> {
        parse_radix(s, 36)
    }

    /// Parses a base-64 rendering produced by [`SnowflakeId::to_base64`].
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not valid base64, or if the payload is not
    /// a decimal `i64`.
    pub fn parse_base64(s: &str) -> Result<Self, ParseIdError> {
        let bytes = STANDARD.decode(s)?;
        let digits = core::str::from_utf8(&bytes)?;
        parse_radix(digits, 10)
    }
}

fn parse_radix(s: &str, radix: u32) -> Result<SnowflakeId, ParseIdError> {
    i64::from_str_radix(s, radix)
        .map(SnowflakeId)
        .map_err(|e| ParseIdError::int(radix, e))
}

fn format_radix(value: i64, radix: u32) -> String {
    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        return "0".to_owned();
    }

    // 64 digits for base 2 plus the sign.
    let mut buf = [0_u8; 65];
    let mut pos = buf.len();
    while magnitude > 0 {
        pos -= 1;
        let digit = (magnitude % u64::from(radix)) as u32;
        buf[pos] = char::from_digit(digit, radix).map_or(b'?', |c| c as u8);
        magnitude /= u64::from(radix);
    }
    if value < 0 {
        pos -= 1;
        buf[pos] = b'-';
    }
    String::from_utf8_lossy(&buf[pos..]).into_owned()
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_radix(s, 10)
    }
}

impl From<i64> for SnowflakeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<SnowflakeId> for i64 {
    fn from(id: SnowflakeId) -> Self {
        id.0
    }
}
