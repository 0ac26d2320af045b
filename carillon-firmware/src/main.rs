//! Carillon - firmware for a two-clock chime controller
//!
//! Drives two motorized mechanical clocks through an L298N H-bridge:
//! software PWM on the enable lines, a hardware stop button and a wall-clock
//! alarm scheduler running off the on-chip RTC. Named after the carillon,
//! the tower instrument that strikes bells on a clockwork schedule.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::AnyPin;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc};
use embassy_rp::Peri;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use carillon_core::{ClockId, ControllerConfig};
use carillon_drivers::{MotorController, PwmKicks, SharedController};

use crate::clock::RtcClock;
use crate::gpio::BoardGpio;

mod clock;
mod gpio;
mod tasks;

static KICKS: PwmKicks = PwmKicks::new();
static CONTROLLER: StaticCell<SharedController<'static, BoardGpio>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Carillon firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = ControllerConfig::default();

    // Register the wired pins by GPIO number. The list must cover every
    // number in `config.pins`.
    let mut board = BoardGpio::new();
    let wired: [(u8, Peri<'static, AnyPin>); 7] = [
        (2, p.PIN_2.into()),   // ENA
        (5, p.PIN_5.into()),   // IN1
        (6, p.PIN_6.into()),   // stop button
        (7, p.PIN_7.into()),   // IN2
        (8, p.PIN_8.into()),   // IN3
        (13, p.PIN_13.into()), // IN4
        (16, p.PIN_16.into()), // ENB
    ];
    for (number, pin) in wired {
        if board.register(number, pin).is_err() {
            defmt::panic!("GPIO {} could not be registered", number);
        }
    }

    let mut controller = MotorController::new(board, config, &KICKS);
    if let Err(e) = controller.initialize() {
        defmt::panic!("Controller initialization failed: {}", Debug2Format(&e));
    }
    info!("Motor controller initialized, both clocks off");

    let controller: &'static SharedController<'static, BoardGpio> =
        CONTROLLER.init(Mutex::new(controller));

    let mut rtc = Rtc::new(p.RTC);
    if !rtc.is_running() {
        // Cold boot: the RTC needs some date to count from. Alarms only look
        // at time-of-day and weekday, so any consistent seed works until the
        // clock is set properly.
        info!("RTC not running, seeding default date/time");
        let seed = DateTime {
            year: 2026,
            month: 1,
            day: 5,
            day_of_week: DayOfWeek::Monday,
            hour: 0,
            minute: 0,
            second: 0,
        };
        if rtc.set_datetime(seed).is_err() {
            warn!("RTC seed rejected, scheduler will back off until set");
        }
    }
    let wall_clock = RtcClock::new(rtc);

    spawner.must_spawn(tasks::pwm::pwm_task(controller, ClockId::Clock1, &KICKS));
    spawner.must_spawn(tasks::pwm::pwm_task(controller, ClockId::Clock2, &KICKS));
    spawner.must_spawn(tasks::stop_button::stop_button_task(controller));
    spawner.must_spawn(tasks::scheduler::scheduler_task(controller, wall_clock));

    info!("All tasks running");
}
