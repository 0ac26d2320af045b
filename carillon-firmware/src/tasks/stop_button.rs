//! Stop-button monitor task
//!
//! Polls the stop line at the debounce interval and triggers an emergency
//! stop on each press edge. Read failures back off for a second so a broken
//! line cannot spin the executor.

use defmt::*;
use embassy_time::Timer;

use carillon_drivers::{EdgeDetector, SharedController};

use crate::gpio::BoardGpio;

#[embassy_executor::task]
pub async fn stop_button_task(controller: &'static SharedController<'static, BoardGpio>) {
    let debounce_ms = u64::from(controller.lock().await.config().debounce_ms);
    info!("Stop button monitor started ({} ms poll)", debounce_ms);

    let mut edge = EdgeDetector::new();
    loop {
        let pressed = controller.lock().await.read_stop_button();
        match pressed {
            Ok(pressed) => {
                if edge.update(pressed) {
                    warn!("Stop button pressed, stopping both clocks");
                    if controller.lock().await.trigger_stop().is_err() {
                        error!("Emergency stop could not drive all pins low");
                    }
                }
                Timer::after_millis(debounce_ms).await;
            }
            Err(_) => {
                warn!("Stop button read failed, retrying in 1 s");
                Timer::after_secs(1).await;
            }
        }
    }
}
