//! Software PWM for motor enable pins.
//!
//! The L298N enable inputs are driven from ordinary GPIO, so duty cycles
//! between the rails are produced by bit-banging the pin from an async task.
//! [`SoftPwm`] holds the waveform state and performs exactly one pin
//! transition per [`step`](SoftPwm::step) call; the owning task sleeps for
//! whatever interval the step returns. Keeping the engine lock-step like
//! this means the pin is only ever touched while the controller mutex is
//! held, and the full waveform logic runs under host tests without an
//! executor.

use carillon_hal::{GpioBackend, Level};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use carillon_core::ClockId;

/// Highest PWM frequency the bit-banged engine will attempt.
///
/// Above a few kHz the timer granularity dominates the period and the
/// output collapses into jitter, so requests are clamped.
pub const MAX_FREQUENCY_HZ: u32 = 10_000;

/// What the owning task should do after a call to [`SoftPwm::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmStep {
    /// The engine is stopped. Wait for a kick before stepping again.
    Park,
    /// A transition was made. Sleep this long, then step again.
    Sleep(Duration),
}

/// Waveform phase. `Start` produces the rising edge of the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    OnDone { off: Duration },
}

/// Bit-banged PWM state for a single enable pin.
pub struct SoftPwm {
    pin: u8,
    frequency_hz: u32,
    duty: u8,
    running: bool,
    phase: Phase,
}

impl SoftPwm {
    pub fn new(pin: u8, frequency_hz: u32, duty: u8) -> Self {
        Self {
            pin,
            frequency_hz: frequency_hz.clamp(1, MAX_FREQUENCY_HZ),
            duty: duty.min(100),
            running: false,
            phase: Phase::Start,
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Current duty cycle in percent, 0..=100.
    pub fn duty(&self) -> u8 {
        self.duty
    }

    /// Updates the duty cycle. Takes effect from the next cycle boundary.
    pub fn set_duty(&mut self, duty: u8) {
        self.duty = duty.min(100);
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn set_frequency(&mut self, frequency_hz: u32) {
        self.frequency_hz = frequency_hz.clamp(1, MAX_FREQUENCY_HZ);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Marks the engine as running. Returns `false` if it already was, in
    /// which case the existing waveform carries on and no kick is needed.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.phase = Phase::Start;
        true
    }

    /// Stops the engine and forces the pin low.
    ///
    /// The owning task observes `running == false` at the top of its next
    /// step and parks, so the low level written here is final.
    pub fn stop<B: GpioBackend>(&mut self, backend: &mut B) -> Result<(), B::Error> {
        self.running = false;
        self.phase = Phase::Start;
        backend.write(self.pin, Level::Low)
    }

    /// Advances the waveform by one transition.
    ///
    /// Re-checks `running` first: a stop that landed between steps wins and
    /// the engine parks without touching the pin again. A failed pin write
    /// stops the engine and propagates the error.
    pub fn step<B: GpioBackend>(&mut self, backend: &mut B) -> Result<PwmStep, B::Error> {
        if !self.running {
            return Ok(PwmStep::Park);
        }

        let period_us = 1_000_000 / u64::from(self.frequency_hz);
        let period = Duration::from_micros(period_us);

        let result = if self.duty == 0 {
            // Degenerate cycle: hold low for a full period.
            backend.write(self.pin, Level::Low).map(|()| PwmStep::Sleep(period))
        } else if self.duty >= 100 {
            backend.write(self.pin, Level::High).map(|()| PwmStep::Sleep(period))
        } else {
            let on_us = period_us * u64::from(self.duty) / 100;
            match self.phase {
                Phase::Start => backend.write(self.pin, Level::High).map(|()| {
                    self.phase = Phase::OnDone {
                        off: Duration::from_micros(period_us - on_us),
                    };
                    PwmStep::Sleep(Duration::from_micros(on_us))
                }),
                Phase::OnDone { off } => backend.write(self.pin, Level::Low).map(|()| {
                    self.phase = Phase::Start;
                    PwmStep::Sleep(off)
                }),
            }
        };

        if result.is_err() {
            self.running = false;
            self.phase = Phase::Start;
        }
        result
    }
}

/// Wakeup signals for the two PWM tasks.
///
/// Each channel task sleeps on its own [`Signal`] while parked or between
/// waveform transitions. The controller kicks the matching signal whenever
/// it starts or stops an engine, so a parked task wakes promptly instead of
/// finishing out a stale sleep.
pub struct PwmKicks {
    signals: [Signal<CriticalSectionRawMutex, ()>; 2],
}

impl PwmKicks {
    pub const fn new() -> Self {
        Self {
            signals: [Signal::new(), Signal::new()],
        }
    }

    pub fn kick(&self, clock: ClockId) {
        self.signals[clock.index()].signal(());
    }

    pub async fn wait(&self, clock: ClockId) {
        self.signals[clock.index()].wait().await;
    }
}

impl Default for PwmKicks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carillon_hal::MockGpio;

    #[test]
    fn parked_until_started() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 50);
        assert_eq!(pwm.step(&mut gpio).unwrap(), PwmStep::Park);
        assert!(gpio.writes().is_empty());
    }

    #[test]
    fn start_is_idempotent() {
        let mut pwm = SoftPwm::new(2, 500, 50);
        assert!(pwm.start());
        assert!(!pwm.start());
        assert!(pwm.is_running());
    }

    #[test]
    fn waveform_alternates_with_duty_split() {
        let mut gpio = MockGpio::new();
        // 500 Hz -> 2000 us period; 25% duty -> 500 us on, 1500 us off.
        let mut pwm = SoftPwm::new(2, 500, 25);
        pwm.start();

        assert_eq!(
            pwm.step(&mut gpio).unwrap(),
            PwmStep::Sleep(Duration::from_micros(500))
        );
        assert_eq!(
            pwm.step(&mut gpio).unwrap(),
            PwmStep::Sleep(Duration::from_micros(1500))
        );
        assert_eq!(
            pwm.step(&mut gpio).unwrap(),
            PwmStep::Sleep(Duration::from_micros(500))
        );
        assert_eq!(
            gpio.writes(),
            &[(2, Level::High), (2, Level::Low), (2, Level::High)]
        );
    }

    #[test]
    fn zero_duty_holds_low_for_full_periods() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 0);
        pwm.start();
        for _ in 0..3 {
            assert_eq!(
                pwm.step(&mut gpio).unwrap(),
                PwmStep::Sleep(Duration::from_micros(2000))
            );
        }
        assert!(gpio.writes().iter().all(|&(_, l)| l == Level::Low));
    }

    #[test]
    fn full_duty_holds_high() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 100);
        pwm.start();
        pwm.step(&mut gpio).unwrap();
        assert_eq!(gpio.writes(), &[(2, Level::High)]);
    }

    #[test]
    fn stop_writes_low_and_parks_next_step() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 50);
        pwm.start();
        pwm.step(&mut gpio).unwrap();

        pwm.stop(&mut gpio).unwrap();
        assert!(!pwm.is_running());
        assert_eq!(gpio.writes().last(), Some(&(2, Level::Low)));
        assert_eq!(pwm.step(&mut gpio).unwrap(), PwmStep::Park);
    }

    #[test]
    fn stop_between_steps_wins_over_pending_cycle() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 50);
        pwm.start();
        pwm.step(&mut gpio).unwrap();
        gpio.clear_writes();

        // Stop lands while the task is asleep mid-cycle.
        pwm.stop(&mut gpio).unwrap();
        assert_eq!(pwm.step(&mut gpio).unwrap(), PwmStep::Park);
        // Only the stop's low write, nothing from the aborted cycle.
        assert_eq!(gpio.writes(), &[(2, Level::Low)]);
    }

    #[test]
    fn write_error_stops_the_engine() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 50);
        pwm.start();

        gpio.fail_next();
        assert!(pwm.step(&mut gpio).is_err());
        assert!(!pwm.is_running());
        assert_eq!(pwm.step(&mut gpio).unwrap(), PwmStep::Park);
    }

    #[test]
    fn frequency_and_duty_are_clamped() {
        let mut pwm = SoftPwm::new(2, 0, 250);
        assert_eq!(pwm.frequency_hz(), 1);
        assert_eq!(pwm.duty(), 100);
        pwm.set_frequency(1_000_000);
        assert_eq!(pwm.frequency_hz(), MAX_FREQUENCY_HZ);
        pwm.set_duty(101);
        assert_eq!(pwm.duty(), 100);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // Stored duty is always min(d, 100), for construction and
            // updates alike.
            #[test]
            fn duty_is_clamped_for_all_inputs(initial: u8, updated: u8) {
                let mut pwm = SoftPwm::new(2, 500, initial);
                prop_assert_eq!(pwm.duty(), initial.min(100));
                pwm.set_duty(updated);
                prop_assert_eq!(pwm.duty(), updated.min(100));
            }
        }
    }

    #[test]
    fn duty_change_applies_on_next_cycle() {
        let mut gpio = MockGpio::new();
        let mut pwm = SoftPwm::new(2, 500, 50);
        pwm.start();
        pwm.step(&mut gpio).unwrap(); // high, 1000 us
        pwm.set_duty(25);
        // Off leg of the old cycle still uses the old split.
        assert_eq!(
            pwm.step(&mut gpio).unwrap(),
            PwmStep::Sleep(Duration::from_micros(1000))
        );
        // New cycle picks up the new duty.
        assert_eq!(
            pwm.step(&mut gpio).unwrap(),
            PwmStep::Sleep(Duration::from_micros(500))
        );
    }
}
