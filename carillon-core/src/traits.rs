//! Collaborator traits
//!
//! The control subsystem consumes wall-clock time and persisted alarms
//! through these seams. Real deployments plug in an RTC and a durable store;
//! tests plug in fixed clocks and in-memory fixtures.

use heapless::Vec;

use crate::alarm::{Alarm, AlarmId, MAX_ALARMS};
use crate::time::WallTime;

/// Source of wall-clock time.
pub trait WallClock {
    type Error: core::fmt::Debug;

    /// Current wall-clock time. May fail (e.g. RTC not running).
    fn now(&mut self) -> Result<WallTime, Self::Error>;
}

/// Narrow query/update interface onto alarm persistence.
///
/// The scheduler never creates or deletes alarms - that belongs to the API
/// layer behind this trait.
#[allow(async_fn_in_trait)]
pub trait AlarmStore {
    type Error: core::fmt::Debug;

    /// Fill `out` with every enabled alarm. Called fresh once per tick;
    /// implementations must not assume a stable set between calls.
    async fn enabled_alarms(
        &mut self,
        out: &mut Vec<Alarm, MAX_ALARMS>,
    ) -> Result<(), Self::Error>;

    /// Record that an alarm fired at `at`.
    async fn mark_triggered(&mut self, id: AlarmId, at: WallTime) -> Result<(), Self::Error>;

    /// Disable the alarm if its day filter is `Once`; no-op otherwise.
    async fn disable_if_once(&mut self, id: AlarmId) -> Result<(), Self::Error>;
}
