//! PWM channel task
//!
//! Advances one channel's software PWM waveform. Each iteration takes the
//! controller lock for a single pin transition, then sleeps for the interval
//! the engine asked for. A kick from the controller cuts the sleep short, so
//! a stop or restart takes effect immediately instead of after the pending
//! waveform leg.

use defmt::*;
use embassy_futures::select::select;
use embassy_time::Timer;

use carillon_core::ClockId;
use carillon_drivers::{PwmKicks, PwmStep, SharedController};

use crate::gpio::BoardGpio;

#[embassy_executor::task(pool_size = 2)]
pub async fn pwm_task(
    controller: &'static SharedController<'static, BoardGpio>,
    clock: ClockId,
    kicks: &'static PwmKicks,
) {
    info!("PWM task started for clock {}", clock.number());

    loop {
        let step = controller.lock().await.pwm_step(clock);
        match step {
            Ok(PwmStep::Sleep(interval)) => {
                select(Timer::after(interval), kicks.wait(clock)).await;
            }
            Ok(PwmStep::Park) => kicks.wait(clock).await,
            Err(_) => {
                warn!("PWM pin write failed, parking channel {}", clock.number());
                kicks.wait(clock).await;
            }
        }
    }
}
