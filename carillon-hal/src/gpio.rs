//! Digital pin backend abstraction
//!
//! Pins are addressed by number, matching how motor-driver wiring is usually
//! documented. A backend owns every line it was given; configuration and I/O
//! are all fallible because the underlying driver may be missing or time out.

/// Logic level on a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Whether this is the high level.
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Numbered digital pin backend.
///
/// Implementations must surface failures as a distinguishable error, never
/// silently substitute a default level.
pub trait GpioBackend {
    /// Backend-specific error type.
    type Error: core::fmt::Debug;

    /// Configure a pin as a push-pull output.
    fn setup_output(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Configure a pin as an input with the internal pull-up enabled.
    fn setup_input_pullup(&mut self, pin: u8) -> Result<(), Self::Error>;

    /// Drive an output pin to a level.
    fn write(&mut self, pin: u8, level: Level) -> Result<(), Self::Error>;

    /// Read the current level of a pin.
    fn read(&mut self, pin: u8) -> Result<Level, Self::Error>;
}
