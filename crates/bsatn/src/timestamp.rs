//! The `Timestamp` special product: a point in time as signed microseconds
//! since the Unix epoch, serialized as its `i64` payload only.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::ser::Serialize;
use crate::time_duration::TimeDuration;
use crate::typespace::TypespaceBuilder;
use crate::SpacetimeType;

/// A timestamp, measured in microseconds since the Unix epoch.
///
/// Negative values are points before 1970.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    __timestamp_micros_since_unix_epoch__: i64,
}

impl Timestamp {
    /// The timestamp 0 microseconds since the Unix epoch.
    pub const UNIX_EPOCH: Self = Self::from_micros_since_unix_epoch(0);

    pub const fn from_micros_since_unix_epoch(micros: i64) -> Self {
        Self {
            __timestamp_micros_since_unix_epoch__: micros,
        }
    }

    pub const fn to_micros_since_unix_epoch(self) -> i64 {
        self.__timestamp_micros_since_unix_epoch__
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// The signed offset from `earlier` to `self`; negative when `earlier`
    /// is actually later.
    pub fn duration_since(self, earlier: Timestamp) -> TimeDuration {
        TimeDuration::from_micros(
            self.to_micros_since_unix_epoch()
                .wrapping_sub(earlier.to_micros_since_unix_epoch()),
        )
    }

    pub fn checked_add(self, duration: TimeDuration) -> Option<Self> {
        self.to_micros_since_unix_epoch()
            .checked_add(duration.to_micros())
            .map(Self::from_micros_since_unix_epoch)
    }

    pub fn checked_sub(self, duration: TimeDuration) -> Option<Self> {
        self.to_micros_since_unix_epoch()
            .checked_sub(duration.to_micros())
            .map(Self::from_micros_since_unix_epoch)
    }

    /// This timestamp as calendar time; `None` outside chrono's range.
    pub fn to_chrono(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_micros(self.to_micros_since_unix_epoch())
    }

    /// Truncates `datetime` to microsecond precision.
    pub fn from_chrono(datetime: DateTime<Utc>) -> Self {
        Self::from_micros_since_unix_epoch(datetime.timestamp_micros())
    }

    pub fn get_type() -> AlgebraicType {
        AlgebraicType::timestamp()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_chrono() {
            Some(datetime) => f.write_str(&datetime.to_rfc3339()),
            // Out of chrono's range; fall back to the raw count.
            None => write!(f, "{:+}us", self.to_micros_since_unix_epoch()),
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        let micros = match time.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => after.as_micros().try_into().unwrap_or(i64::MAX),
            Err(before) => {
                let micros: i64 = before.duration().as_micros().try_into().unwrap_or(i64::MAX);
                -micros
            }
        };
        Self::from_micros_since_unix_epoch(micros)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_chrono(datetime)
    }
}

impl Add<TimeDuration> for Timestamp {
    type Output = Timestamp;

    fn add(self, duration: TimeDuration) -> Timestamp {
        self.checked_add(duration)
            .expect("overflow when adding duration to timestamp")
    }
}

impl Sub<TimeDuration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, duration: TimeDuration) -> Timestamp {
        self.checked_sub(duration)
            .expect("overflow when subtracting duration from timestamp")
    }
}

impl Sub for Timestamp {
    type Output = TimeDuration;

    fn sub(self, earlier: Timestamp) -> TimeDuration {
        self.duration_since(earlier)
    }
}

impl Serialize for Timestamp {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        writer.put_i64(self.__timestamp_micros_since_unix_epoch__);
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        reader.get_i64().map(Self::from_micros_since_unix_epoch)
    }
}

impl SpacetimeType for Timestamp {
    fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
        AlgebraicType::timestamp()
    }
}
