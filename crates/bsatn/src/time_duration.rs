//! The `TimeDuration` special product: a signed span of time in
//! microseconds, serialized as its `i64` payload only.

use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::time::Duration;

use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::ser::Serialize;
use crate::typespace::TypespaceBuilder;
use crate::SpacetimeType;

/// A signed duration, counted in microseconds.
///
/// Unlike [`std::time::Duration`] this can be negative, so subtracting
/// timestamps is total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeDuration {
    __time_duration_micros__: i64,
}

impl TimeDuration {
    pub const ZERO: Self = Self::from_micros(0);

    pub const fn from_micros(micros: i64) -> Self {
        Self {
            __time_duration_micros__: micros,
        }
    }

    pub const fn to_micros(self) -> i64 {
        self.__time_duration_micros__
    }

    /// Converts from a [`Duration`], saturating at `i64::MAX` microseconds
    /// (about 292 millennia).
    pub fn from_duration(duration: Duration) -> Self {
        Self::from_micros(duration.as_micros().try_into().unwrap_or(i64::MAX))
    }

    /// Converts to a [`Duration`]: `Ok` with the magnitude when
    /// non-negative, `Err` with the magnitude when negative.
    pub fn to_duration(self) -> Result<Duration, Duration> {
        let micros = self.to_micros();
        let abs = Duration::from_micros(micros.unsigned_abs());
        if micros >= 0 {
            Ok(abs)
        } else {
            Err(abs)
        }
    }

    /// The absolute value as an unsigned [`Duration`].
    pub fn abs(self) -> Duration {
        Duration::from_micros(self.to_micros().unsigned_abs())
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.to_micros().checked_add(other.to_micros()).map(Self::from_micros)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.to_micros().checked_sub(other.to_micros()).map(Self::from_micros)
    }

    pub fn get_type() -> AlgebraicType {
        AlgebraicType::time_duration()
    }
}

impl fmt::Display for TimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.to_micros() < 0 { "-" } else { "+" };
        let abs = self.abs();
        write!(f, "{sign}{}.{:06}", abs.as_secs(), abs.subsec_micros())
    }
}

impl From<Duration> for TimeDuration {
    fn from(duration: Duration) -> Self {
        Self::from_duration(duration)
    }
}

impl Add for TimeDuration {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(other).expect("overflow when adding time durations")
    }
}

impl Sub for TimeDuration {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(other).expect("overflow when subtracting time durations")
    }
}

impl Neg for TimeDuration {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_micros(-self.to_micros())
    }
}

impl Serialize for TimeDuration {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_i64(self.__time_duration_micros__);
    }
}

impl<'de> Deserialize<'de> for TimeDuration {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        reader.get_i64().map(Self::from_micros)
    }
}

impl SpacetimeType for TimeDuration {
    fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
        AlgebraicType::time_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_signed_micros() {
        let dur = TimeDuration::from_micros(-2);
        let mut out = Vec::new();
        dur.serialize(&mut out);
        assert_eq!(out, [0xfe, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(TimeDuration::deserialize(&mut out.as_slice()).unwrap(), dur);
    }

    #[test]
    fn duration_conversions_are_sign_aware() {
        assert_eq!(
            TimeDuration::from_micros(1_500_000).to_duration(),
            Ok(Duration::from_millis(1500))
        );
        assert_eq!(
            TimeDuration::from_micros(-250).to_duration(),
            Err(Duration::from_micros(250))
        );
        assert_eq!(TimeDuration::from_duration(Duration::from_secs(2)).to_micros(), 2_000_000);
    }

    #[test]
    fn arithmetic() {
        let a = TimeDuration::from_micros(100);
        let b = TimeDuration::from_micros(-40);
        assert_eq!((a + b).to_micros(), 60);
        assert_eq!((a - b).to_micros(), 140);
        assert_eq!((-a).to_micros(), -100);
        assert_eq!(TimeDuration::from_micros(i64::MAX).checked_add(a), None);
    }

    #[test]
    fn type_is_the_special_product() {
        assert!(TimeDuration::get_type().is_time_duration());
        assert!(TimeDuration::get_type().is_inline());
    }
}
