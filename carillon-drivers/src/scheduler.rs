//! Alarm scheduler tick.
//!
//! The scheduler task wakes once per wall-clock second and runs one
//! [`scheduler_tick`]: query the enabled alarms fresh, fire the ones whose
//! time matches, then expire any auto-off deadlines that have passed. All
//! motor commands go through the shared controller mutex, so a concurrent
//! stop request always stays coherent with a firing alarm.
//!
//! The tick takes the current wall time and a monotonic millisecond stamp
//! from its caller, which keeps it free of clock dependencies and fully
//! host-testable.

use heapless::Vec;

use carillon_core::{Alarm, AutoOffRegistry, DaySpec, WallTime, MAX_ALARMS};
use carillon_core::AlarmStore;
use carillon_hal::GpioBackend;

use crate::motor::{ControlError, SharedController};

/// Errors out of one scheduler tick.
#[derive(Debug, PartialEq)]
pub enum TickError<SE, GE> {
    /// The alarm store failed.
    Store(SE),
    /// A motor command failed.
    Control(ControlError<GE>),
}

/// Runs one scheduler pass for the given wall-clock second.
///
/// A latched stop skips a matching alarm entirely: the alarm is not marked
/// triggered and fires again normally once the latch is cleared. `Once`
/// alarms are disabled after their first successful firing. A firing with a
/// non-zero duration schedules (or replaces) that alarm's auto-off deadline
/// at `now_ms + duration`.
pub async fn scheduler_tick<B, S>(
    controller: &SharedController<'_, B>,
    store: &mut S,
    registry: &mut AutoOffRegistry,
    now: WallTime,
    now_ms: u64,
) -> Result<(), TickError<S::Error, B::Error>>
where
    B: GpioBackend,
    S: AlarmStore,
{
    let mut alarms: Vec<Alarm, MAX_ALARMS> = Vec::new();
    store.enabled_alarms(&mut alarms).await.map_err(TickError::Store)?;

    for alarm in &alarms {
        if !alarm.matches(&now) {
            continue;
        }
        match controller.lock().await.turn_on(alarm.clock) {
            Ok(()) => {}
            Err(ControlError::StopLatched) => continue,
            Err(e) => return Err(TickError::Control(e)),
        }
        store
            .mark_triggered(alarm.id, now)
            .await
            .map_err(TickError::Store)?;
        if alarm.days == DaySpec::Once {
            store.disable_if_once(alarm.id).await.map_err(TickError::Store)?;
        }
        if alarm.duration_s > 0 {
            // A full registry drops the auto-off; the clock then runs until
            // stopped by hand, which beats dropping the firing itself.
            let _ = registry.schedule(alarm.id, alarm.clock, now_ms, alarm.duration_s);
        }
    }

    for (_, clock) in registry.take_due(now_ms) {
        controller
            .lock()
            .await
            .turn_off(clock)
            .map_err(TickError::Control)?;
    }

    Ok(())
}
