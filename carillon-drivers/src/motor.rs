//! Motor controller for the two clock channels.
//!
//! One [`MotorController`] owns the GPIO backend and every pin the
//! controller touches. All mutation happens through a shared
//! [`SharedController`] mutex, so a stop request, a scheduler firing and a
//! PWM transition can never interleave on the pins: whichever holds the
//! lock completes its pin writes before the next caller observes the new
//! state.

use carillon_hal::{GpioBackend, Level};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use carillon_core::{ClockId, ControllerConfig, MotorPolarity};

use crate::pwm::{PwmKicks, PwmStep, SoftPwm};

/// Controller shared between the firmware tasks.
pub type SharedController<'a, B> = Mutex<CriticalSectionRawMutex, MotorController<'a, B>>;

/// Errors from controller operations.
#[derive(Debug, PartialEq, Eq)]
pub enum ControlError<E> {
    /// `initialize` has not run yet.
    NotInitialized,
    /// A stop is latched; motion commands are refused until it is cleared.
    StopLatched,
    /// The GPIO backend failed.
    Gpio(E),
}

/// Snapshot of one channel for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStatus {
    pub enabled: bool,
    pub duty: u8,
    pub pwm_running: bool,
}

/// Snapshot of the whole controller.
///
/// `stop_button_pressed` is `None` before initialization or when the read
/// fails, never a stale boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerStatus {
    pub initialized: bool,
    pub stop_latched: bool,
    pub stop_button_pressed: Option<bool>,
    pub channels: [ChannelStatus; 2],
}

struct Channel {
    pwm: SoftPwm,
    enabled: bool,
}

pub struct MotorController<'a, B: GpioBackend> {
    backend: B,
    config: ControllerConfig,
    channels: [Channel; 2],
    kicks: &'a PwmKicks,
    initialized: bool,
    stop_latched: bool,
}

impl<'a, B: GpioBackend> MotorController<'a, B> {
    pub fn new(backend: B, config: ControllerConfig, kicks: &'a PwmKicks) -> Self {
        let freq = u32::from(config.pwm_frequency_hz);
        let channels = [
            Channel {
                pwm: SoftPwm::new(config.pins.ena, freq, config.default_duty),
                enabled: false,
            },
            Channel {
                pwm: SoftPwm::new(config.pins.enb, freq, config.default_duty),
                enabled: false,
            },
        ];
        Self {
            backend,
            config,
            channels,
            kicks,
            initialized: false,
            stop_latched: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Claims the pins and drives everything to a safe idle state.
    ///
    /// Idempotent: a second call returns without touching the hardware.
    pub fn initialize(&mut self) -> Result<(), ControlError<B::Error>> {
        if self.initialized {
            return Ok(());
        }
        let pins = self.config.pins;
        for pin in [pins.ena, pins.in1, pins.in2, pins.enb, pins.in3, pins.in4] {
            self.backend.setup_output(pin).map_err(ControlError::Gpio)?;
        }
        self.backend
            .setup_input_pullup(pins.stop_button)
            .map_err(ControlError::Gpio)?;

        // Enables low before direction pins so a motor never sees a
        // half-written direction while powered.
        self.backend.write(pins.ena, Level::Low).map_err(ControlError::Gpio)?;
        self.backend.write(pins.enb, Level::Low).map_err(ControlError::Gpio)?;
        Self::write_direction(&mut self.backend, pins.in1, pins.in2, self.config.motor1_direction)?;
        Self::write_direction(&mut self.backend, pins.in3, pins.in4, self.config.motor2_direction)?;

        self.initialized = true;
        Ok(())
    }

    fn write_direction(
        backend: &mut B,
        first: u8,
        second: u8,
        polarity: MotorPolarity,
    ) -> Result<(), ControlError<B::Error>> {
        backend
            .write(first, Level::from(polarity.in_first))
            .map_err(ControlError::Gpio)?;
        backend
            .write(second, Level::from(polarity.in_second))
            .map_err(ControlError::Gpio)
    }

    fn ensure_initialized(&self) -> Result<(), ControlError<B::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(ControlError::NotInitialized)
        }
    }

    fn ensure_not_latched(&self) -> Result<(), ControlError<B::Error>> {
        if self.stop_latched {
            Err(ControlError::StopLatched)
        } else {
            Ok(())
        }
    }

    /// Turns a clock on at its stored duty cycle.
    ///
    /// Duty 100 drives the enable pin solid high with no PWM engine; duty 0
    /// leaves the channel off; anything between starts the PWM engine.
    pub fn turn_on(&mut self, clock: ClockId) -> Result<(), ControlError<B::Error>> {
        self.ensure_initialized()?;
        self.ensure_not_latched()?;

        let Self { backend, channels, kicks, .. } = self;
        let channel = &mut channels[clock.index()];
        let duty = channel.pwm.duty();
        if duty == 0 {
            channel.enabled = false;
            return Ok(());
        }
        if duty >= 100 {
            if channel.pwm.is_running() {
                channel.pwm.stop(backend).map_err(ControlError::Gpio)?;
                kicks.kick(clock);
            }
            backend
                .write(channel.pwm.pin(), Level::High)
                .map_err(ControlError::Gpio)?;
            channel.enabled = true;
            return Ok(());
        }
        channel.enabled = true;
        if channel.pwm.start() {
            kicks.kick(clock);
        }
        Ok(())
    }

    /// Turns a clock off. Idempotent, allowed even while a stop is latched.
    pub fn turn_off(&mut self, clock: ClockId) -> Result<(), ControlError<B::Error>> {
        self.ensure_initialized()?;
        let Self { backend, channels, kicks, .. } = self;
        let channel = &mut channels[clock.index()];
        channel.enabled = false;
        channel.pwm.stop(backend).map_err(ControlError::Gpio)?;
        kicks.kick(clock);
        Ok(())
    }

    /// Forces both channels off.
    ///
    /// Runs regardless of initialization state and always attempts both
    /// channels; the first backend error is returned after both tries.
    pub fn all_off(&mut self) -> Result<(), ControlError<B::Error>> {
        let Self { backend, channels, kicks, .. } = self;
        let mut first_err = None;
        for (channel, clock) in channels.iter_mut().zip(ClockId::ALL) {
            channel.enabled = false;
            if let Err(e) = channel.pwm.stop(backend) {
                first_err.get_or_insert(e);
            }
            kicks.kick(clock);
        }
        match first_err {
            Some(e) => Err(ControlError::Gpio(e)),
            None => Ok(()),
        }
    }

    /// Updates a channel's duty cycle, transitioning an enabled channel
    /// directly to the new state.
    pub fn set_duty(&mut self, clock: ClockId, duty: u8) -> Result<(), ControlError<B::Error>> {
        self.ensure_initialized()?;
        let duty = duty.min(100);
        if duty > 0 {
            self.ensure_not_latched()?;
        }

        let Self { backend, channels, kicks, .. } = self;
        let channel = &mut channels[clock.index()];
        channel.pwm.set_duty(duty);
        if !channel.enabled {
            return Ok(());
        }
        if duty == 0 {
            channel.enabled = false;
            channel.pwm.stop(backend).map_err(ControlError::Gpio)?;
            kicks.kick(clock);
        } else if duty >= 100 {
            if channel.pwm.is_running() {
                channel.pwm.stop(backend).map_err(ControlError::Gpio)?;
                kicks.kick(clock);
            }
            backend
                .write(channel.pwm.pin(), Level::High)
                .map_err(ControlError::Gpio)?;
        } else if channel.pwm.start() {
            kicks.kick(clock);
        }
        Ok(())
    }

    /// Reads the stop button. Active low: pressed means the line reads low.
    pub fn read_stop_button(&mut self) -> Result<bool, ControlError<B::Error>> {
        self.ensure_initialized()?;
        let level = self
            .backend
            .read(self.config.pins.stop_button)
            .map_err(ControlError::Gpio)?;
        Ok(level == Level::Low)
    }

    /// Emergency stop: both channels off, then latch if configured.
    pub fn trigger_stop(&mut self) -> Result<(), ControlError<B::Error>> {
        let result = self.all_off();
        if self.config.stop_latch {
            self.stop_latched = true;
        }
        result
    }

    pub fn clear_stop_latch(&mut self) {
        self.stop_latched = false;
    }

    pub fn is_stop_latched(&self) -> bool {
        self.stop_latched
    }

    pub fn status(&mut self) -> ControllerStatus {
        let stop_button_pressed = if self.initialized {
            self.read_stop_button().ok()
        } else {
            None
        };
        let channel_status = |c: &Channel| ChannelStatus {
            enabled: c.enabled,
            duty: c.pwm.duty(),
            pwm_running: c.pwm.is_running(),
        };
        ControllerStatus {
            initialized: self.initialized,
            stop_latched: self.stop_latched,
            stop_button_pressed,
            channels: [
                channel_status(&self.channels[0]),
                channel_status(&self.channels[1]),
            ],
        }
    }

    /// Shuts the controller down: motors off, pins released.
    pub fn cleanup(&mut self) -> Result<(), ControlError<B::Error>> {
        if self.initialized {
            self.all_off()?;
            self.initialized = false;
        }
        Ok(())
    }

    /// Advances one channel's PWM waveform by a single transition.
    ///
    /// Called by the channel task with the controller lock held. Before
    /// initialization the engines are parked.
    pub fn pwm_step(&mut self, clock: ClockId) -> Result<PwmStep, B::Error> {
        if !self.initialized {
            return Ok(PwmStep::Park);
        }
        let Self { backend, channels, .. } = self;
        channels[clock.index()].pwm.step(backend)
    }
}
