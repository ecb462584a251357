//! Human-readable order serial numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderSerial`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// The serial does not start with the `ORD` prefix.
    #[error("serial must start with {prefix}")]
    MissingPrefix {
        /// Expected prefix.
        prefix: &'static str,
    },
    /// The part after the prefix is not all digits or is too short.
    #[error("serial must be followed by at least {min} digits")]
    BadDigits {
        /// Minimum digit count.
        min: usize,
    },
    /// The serial is longer than the storage column.
    #[error("serial must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Externally visible order identifier, e.g. `ORD1760745600123456`.
///
/// Layout: the `ORD` prefix, the creation time in whole seconds since the Unix
/// epoch, then a zero-padded six digit sub-second suffix.
///
/// ```
/// use tee_studio_core::OrderSerial;
///
/// let serial = OrderSerial::from_parts(1_760_745_600, 42);
/// assert_eq!(serial.as_str(), "ORD1760745600000042");
/// assert_eq!(OrderSerial::parse("ORD1760745600000042"), Ok(serial));
/// assert!(OrderSerial::parse("INV123").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct OrderSerial(String);

impl OrderSerial {
    /// Prefix shared by every serial.
    pub const PREFIX: &'static str = "ORD";
    /// Number of digits in the sub-second suffix.
    pub const SUFFIX_DIGITS: usize = 6;
    /// Exclusive upper bound of the suffix.
    pub const SUFFIX_RANGE: u64 = 1_000_000;
    /// Maximum length (storage column width).
    pub const MAX_LENGTH: usize = 64;

    /// Build a serial from epoch seconds and a sub-second suffix.
    ///
    /// Suffixes at or above [`Self::SUFFIX_RANGE`] are reduced modulo the range.
    #[must_use]
    pub fn from_parts(epoch_secs: u64, suffix: u64) -> Self {
        let suffix = suffix % Self::SUFFIX_RANGE;
        Self(format!(
            "{}{epoch_secs}{suffix:0width$}",
            Self::PREFIX,
            width = Self::SUFFIX_DIGITS
        ))
    }

    /// Parse and validate a serial.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix is missing, the remainder is not at least
    /// seven digits, or the value exceeds the storage column width.
    pub fn parse(s: &str) -> Result<Self, SerialError> {
        if s.len() > Self::MAX_LENGTH {
            return Err(SerialError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let digits = s.strip_prefix(Self::PREFIX).ok_or(SerialError::MissingPrefix {
            prefix: Self::PREFIX,
        })?;

        let min = Self::SUFFIX_DIGITS + 1;
        if digits.len() < min || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SerialError::BadDigits { min });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the serial as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the serial and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for OrderSerial {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for OrderSerial {
    type Error = SerialError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<OrderSerial> for String {
    fn from(serial: OrderSerial) -> Self {
        serial.0
    }
}

impl AsRef<str> for OrderSerial {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderSerial {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderSerial {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderSerial {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_validates() {
        let serial: OrderSerial = serde_json::from_str("\"ORD1700000000000007\"").unwrap();
        assert_eq!(serial, OrderSerial::from_parts(1_700_000_000, 7));
        assert_eq!(
            serde_json::to_string(&serial).unwrap(),
            "\"ORD1700000000000007\""
        );

        assert!(serde_json::from_str::<OrderSerial>("\"INV1700000000000007\"").is_err());
        assert!(serde_json::from_str::<OrderSerial>("\"ORD12\"").is_err());
    }

    #[test]
    fn test_from_parts_pads_suffix() {
        let serial = OrderSerial::from_parts(1_700_000_000, 7);
        assert_eq!(serial.as_str(), "ORD1700000000000007");
    }

    #[test]
    fn test_from_parts_wraps_suffix() {
        let serial = OrderSerial::from_parts(1_700_000_000, 1_000_123);
        assert_eq!(serial.as_str(), "ORD1700000000000123");
    }

    #[test]
    fn test_parse_round_trip() {
        let serial = OrderSerial::from_parts(1_700_000_000, 999_999);
        assert_eq!(OrderSerial::parse(serial.as_str()), Ok(serial));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            OrderSerial::parse("1700000000000007"),
            Err(SerialError::MissingPrefix { .. })
        ));
        assert!(matches!(
            OrderSerial::parse("ORD12345"),
            Err(SerialError::BadDigits { .. })
        ));
        assert!(matches!(
            OrderSerial::parse("ORD17000000000x0007"),
            Err(SerialError::BadDigits { .. })
        ));
        assert!(matches!(
            OrderSerial::parse(&format!("ORD{}", "1".repeat(64))),
            Err(SerialError::TooLong { .. })
        ));
    }
}
