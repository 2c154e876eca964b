//! `ScheduleAt`: when a scheduled reducer should run.
//!
//! A sum of `Interval(TimeDuration)` at tag 0 and `Time(Timestamp)` at
//! tag 1. Like the special products it is built from, the sum is always
//! inlined at the use site and never registered.

use std::time::Duration;

use crate::algebraic_type::AlgebraicType;
use crate::buffer::{BufReader, BufWriter, DecodeError};
use crate::de::Deserialize;
use crate::ser::Serialize;
use crate::time_duration::TimeDuration;
use crate::timestamp::Timestamp;
use crate::typespace::TypespaceBuilder;
use crate::SpacetimeType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScheduleAt {
    /// Run repeatedly, this long apart.
    Interval(TimeDuration),
    /// Run once, at this time.
    Time(Timestamp),
}

impl ScheduleAt {
    pub fn as_interval(&self) -> Option<&TimeDuration> {
        match self {
            Self::Interval(interval) => Some(interval),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&Timestamp> {
        match self {
            Self::Time(time) => Some(time),
            _ => None,
        }
    }

    pub fn get_type() -> AlgebraicType {
        AlgebraicType::schedule_at()
    }
}

impl From<TimeDuration> for ScheduleAt {
    fn from(interval: TimeDuration) -> Self {
        Self::Interval(interval)
    }
}

impl From<Timestamp> for ScheduleAt {
    fn from(time: Timestamp) -> Self {
        Self::Time(time)
    }
}

impl From<Duration> for ScheduleAt {
    fn from(interval: Duration) -> Self {
        Self::Interval(interval.into())
    }
}

impl Serialize for ScheduleAt {
    fn serialize<W: BufWriter>(&self, writer: &mut W) {
        match self {
            Self::Interval(interval) => {
                writer.put_u8(0);
                interval.serialize(writer);
            }
            Self::Time(time) => {
                writer.put_u8(1);
                time.serialize(writer);
            }
        }
    }
}

impl<'de> Deserialize<'de> for ScheduleAt {
    fn deserialize<R: BufReader<'de>>(reader: &mut R) -> Result<Self, DecodeError> {
        match reader.get_u8()? {
            0 => TimeDuration::deserialize(reader).map(Self::Interval),
            1 => Timestamp::deserialize(reader).map(Self::Time),
            tag => Err(DecodeError::InvalidSumTag { tag, arity: 2 }),
        }
    }
}

impl SpacetimeType for ScheduleAt {
    fn make_type<S: TypespaceBuilder>(_ts: &mut S) -> AlgebraicType {
        AlgebraicType::schedule_at()
    }
}
