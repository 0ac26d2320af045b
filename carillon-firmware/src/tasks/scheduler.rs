//! Alarm scheduler task
//!
//! Runs one scheduler pass per wall-clock second, phase-aligned to second
//! boundaries so an alarm set for 07:30:00 fires within that second. RTC or
//! store failures log and back off for a second; the loop never terminates.

use defmt::*;
use embassy_time::{Instant, Timer};

use carillon_core::{
    Alarm, AutoOffRegistry, ClockId, DaySpec, MemoryAlarmStore, WallClock,
};
use carillon_drivers::{scheduler_tick, SharedController, TickError};

use crate::clock::RtcClock;
use crate::gpio::BoardGpio;

/// Boot-time schedule: both clocks chime daily at 07:00 for 30 seconds.
// TODO: replace the seed with alarms loaded over the serial config interface
// once that lands.
fn seed_alarms(store: &mut MemoryAlarmStore) {
    for clock in ClockId::ALL {
        let mut name = heapless::String::new();
        let _ = name.push_str("morning chime");
        let alarm = Alarm {
            id: 0,
            name,
            hour: 7,
            minute: 0,
            second: 0,
            clock,
            enabled: true,
            days: DaySpec::Daily,
            duration_s: 30,
        };
        if store.add(alarm).is_err() {
            warn!("Alarm store full, seed alarm dropped");
        }
    }
}

#[embassy_executor::task]
pub async fn scheduler_task(
    controller: &'static SharedController<'static, BoardGpio>,
    mut clock: RtcClock,
) {
    info!("Alarm scheduler started");

    let mut store = MemoryAlarmStore::new();
    seed_alarms(&mut store);
    let mut registry = AutoOffRegistry::new();

    loop {
        let now = match clock.now() {
            Ok(now) => now,
            Err(_) => {
                warn!("RTC read failed, retrying in 1 s");
                Timer::after_secs(1).await;
                continue;
            }
        };
        let now_ms = Instant::now().as_millis();

        if let Err(e) = scheduler_tick(controller, &mut store, &mut registry, now, now_ms).await {
            match e {
                TickError::Store(_) => warn!("Alarm store query failed"),
                TickError::Control(_) => warn!("Motor command failed during tick"),
            }
            Timer::after_secs(1).await;
            continue;
        }

        // Sleep to the next second boundary; fall back to a whole second if
        // the RTC refuses a second reading.
        let sleep_ms = clock
            .now()
            .map(|t| u64::from(t.ms_to_next_second()))
            .unwrap_or(1000);
        Timer::after_millis(sleep_ms).await;
    }
}
