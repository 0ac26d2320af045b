//! Drivers for the Carillon clock controller.
//!
//! The crate is board-agnostic: everything is generic over
//! [`carillon_hal::GpioBackend`] and carries no executor dependency, so the
//! whole motor path runs under host tests against the mock backend. The
//! firmware crate owns the embassy tasks that keep these components moving.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod monitor;
pub mod motor;
pub mod pwm;
pub mod scheduler;

pub use monitor::EdgeDetector;
pub use motor::{ChannelStatus, ControlError, ControllerStatus, MotorController, SharedController};
pub use pwm::{PwmKicks, PwmStep, SoftPwm};
pub use scheduler::{scheduler_tick, TickError};
