//! # Transaction Timestamps
//!
//! The ledger hands every transaction a timestamp that all replicas agree on.
//! Hosts report seconds and nanoseconds either as plain integers or as a
//! split high/low word pair; both shapes normalize to the same ISO-8601
//! string.
//!
//! Wall-clock reads are never made here.

use crate::domain::errors::RegistryError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const NANOS_PER_MILLI: u32 = 1_000_000;
const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// An integer as reported by a ledger host.
///
/// `Split` carries the two's-complement halves of a 64-bit value. In JSON it
/// is either a number or `{ "low": .., "high": .. }` with `high` optional.
/// Hosts send `low` signed (`-1294967296`) or unsigned (`3000000000`); only
/// its low 32 bits count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WideInt {
    Plain(i64),
    Split {
        low: i64,
        #[serde(default)]
        high: i32,
    },
}

impl WideInt {
    /// Reduce to a single 64-bit value.
    pub fn to_i64(self) -> i64 {
        match self {
            WideInt::Plain(value) => value,
            WideInt::Split { low, high } => (i64::from(high) << 32) | i64::from(low as u32),
        }
    }

    /// Split a 64-bit value into its high/low words, `low` signed.
    pub fn split(value: i64) -> Self {
        WideInt::Split {
            low: i64::from(value as i32),
            high: (value >> 32) as i32,
        }
    }
}

impl From<i64> for WideInt {
    fn from(value: i64) -> Self {
        WideInt::Plain(value)
    }
}

/// Deterministic timestamp of one ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTimestamp {
    pub seconds: WideInt,
    pub nanos: WideInt,
}

impl TxTimestamp {
    pub fn new(seconds: i64, nanos: u32) -> Self {
        Self {
            seconds: WideInt::Plain(seconds),
            nanos: WideInt::Plain(i64::from(nanos)),
        }
    }

    /// Timestamp exactly as a host reported it.
    pub fn from_wide(seconds: WideInt, nanos: WideInt) -> Self {
        Self { seconds, nanos }
    }

    /// Stamp from a wall-clock reading. Only hosts call this, before the
    /// transaction executes.
    pub fn from_system_time(time: SystemTime) -> Self {
        let (seconds, nanos) = match time.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => (elapsed.as_secs() as i64, elapsed.subsec_nanos()),
            Err(before) => {
                let behind = before.duration();
                let mut seconds = -(behind.as_secs() as i64);
                let mut nanos = behind.subsec_nanos();
                if nanos > 0 {
                    seconds -= 1;
                    nanos = NANOS_PER_SECOND - nanos;
                }
                (seconds, nanos)
            }
        };
        Self::new(seconds, nanos)
    }

    pub fn to_iso8601(&self) -> Result<String, RegistryError> {
        normalize_timestamp(self.seconds, self.nanos)
    }
}

/// Normalize a `(seconds, nanos)` pair to an ISO-8601 UTC instant with
/// millisecond precision, e.g. `2023-11-14T22:13:20.500Z`.
///
/// Sub-millisecond digits are truncated.
pub fn normalize_timestamp(seconds: WideInt, nanos: WideInt) -> Result<String, RegistryError> {
    let seconds = seconds.to_i64();
    let raw_nanos = nanos.to_i64();
    let nanos = u32::try_from(raw_nanos).map_err(|_| RegistryError::InvalidTimestamp {
        reason: format!("nanos {} outside 32-bit unsigned range", raw_nanos),
    })?;

    let millis = seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(i64::from(nanos / NANOS_PER_MILLI)))
        .ok_or_else(|| RegistryError::InvalidTimestamp {
            reason: format!("{}s + {}ns overflows milliseconds", seconds, nanos),
        })?;

    let instant = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        RegistryError::InvalidTimestamp {
            reason: format!("{}ms is outside the representable range", millis),
        }
    })?;

    Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
}
