//! Signed Unix-time codec for [`SystemTime`].
//!
//! A time is split into whole seconds (negative before 1970) and a
//! nanosecond part always in `0..1_000_000_000`. Usable as a serde `with`
//! module: `#[serde(with = "feedcache_core::unix_time")]`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Split `time` into `(secs, nanos)` relative to the Unix epoch, or `None`
/// if the seconds do not fit in an `i64`.
pub fn to_parts(time: SystemTime) -> Option<(i64, u32)> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => Some((i64::try_from(after.as_secs()).ok()?, after.subsec_nanos())),
        Err(err) => {
            let before = err.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => Some((-secs, 0)),
                nanos => Some((-secs - 1, NANOS_PER_SEC - nanos)),
            }
        }
    }
}

/// Inverse of [`to_parts`]. `None` if `nanos` is out of range or the time is
/// not representable on this platform.
pub fn from_parts(secs: i64, nanos: u32) -> Option<SystemTime> {
    if nanos >= NANOS_PER_SEC {
        return None;
    }
    if secs >= 0 {
        UNIX_EPOCH.checked_add(Duration::new(secs.unsigned_abs(), nanos))
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(secs.unsigned_abs()))?
            .checked_add(Duration::from_nanos(u64::from(nanos)))
    }
}

#[derive(Serialize, Deserialize)]
struct UnixTime {
    secs: i64,
    nanos: u32,
}

pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
    let (secs, nanos) =
        to_parts(*time).ok_or_else(|| ser::Error::custom("timestamp out of range"))?;
    UnixTime { secs, nanos }.serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
    let UnixTime { secs, nanos } = UnixTime::deserialize(deserializer)?;
    from_parts(secs, nanos).ok_or_else(|| de::Error::custom("timestamp out of range"))
}
