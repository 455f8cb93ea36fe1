use crate::domain::timestamp::TxTimestamp;
use crate::ports::outbound::TimeSource;

/// Stamps transactions from the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> TxTimestamp {
        TxTimestamp::from_system_time(std::time::SystemTime::now())
    }
}

/// Stamps every transaction with the same timestamp (tests, replay).
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub TxTimestamp);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> TxTimestamp {
        self.0
    }
}
