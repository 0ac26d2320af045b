//! Carillon Hardware Abstraction Layer
//!
//! This crate defines the digital-pin capability the control subsystem is
//! built on. Chip- or board-specific backends (RP2040 GPIO, a CLI-driven
//! expander, a mock) implement [`GpioBackend`]; everything above it only
//! speaks pin numbers and [`Level`]s.
//!
//! The backend is assumed to have bounded but non-trivial latency (it may
//! dispatch a driver command per call), so callers must not hammer it from
//! tight non-yielding loops.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod mock;

pub use gpio::{GpioBackend, Level};
pub use mock::{MockError, MockGpio};
