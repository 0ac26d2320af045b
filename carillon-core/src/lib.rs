//! Board-agnostic core logic for the Carillon clock controller
//!
//! This crate contains all application logic that does not depend on
//! timers or hardware backends:
//!
//! - Wall-clock time and weekday types
//! - Alarm model and time matching
//! - Pending auto-off registry
//! - Configuration type definitions
//! - Collaborator traits (wall clock, alarm store)
//! - In-memory reference alarm store

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod alarm;
pub mod autooff;
pub mod config;
pub mod store;
pub mod time;
pub mod traits;

pub use alarm::{Alarm, AlarmId, ClockId, DaySpec, InvalidClockId, WeekdaySet, MAX_ALARMS};
pub use autooff::AutoOffRegistry;
pub use config::{ControllerConfig, MotorPolarity, PinAssignment};
pub use store::{MemoryAlarmStore, StoreError};
pub use time::{WallTime, Weekday};
pub use traits::{AlarmStore, WallClock};
