//! Mock GPIO backend for development and testing without hardware
//!
//! Tracks pin modes and levels in memory and keeps a log of every write so
//! tests can assert on the exact pin traffic. Unconfigured inputs read high,
//! matching a pulled-up line with nothing attached.

use heapless::{FnvIndexMap, Vec};

use crate::gpio::{GpioBackend, Level};

/// Maximum number of distinct pins the mock tracks.
pub const MAX_PINS: usize = 16;

/// Maximum number of writes kept in the log. Older entries are dropped once
/// the log is full; tests that care about counts stay well below this.
pub const WRITE_LOG_LEN: usize = 128;

/// Mock backend failure, injected via [`MockGpio::fail_next`] or permanent
/// [`MockGpio::set_failing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MockError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Output,
    InputPullup,
}

/// In-memory GPIO backend.
#[derive(Debug, Default)]
pub struct MockGpio {
    modes: FnvIndexMap<u8, Mode, MAX_PINS>,
    levels: FnvIndexMap<u8, Level, MAX_PINS>,
    writes: Vec<(u8, Level), WRITE_LOG_LEN>,
    failing: bool,
    fail_next: bool,
}

impl MockGpio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail until cleared.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Make only the next operation fail.
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// Current level of a pin as last written (or forced by a test).
    pub fn level(&self, pin: u8) -> Level {
        *self.levels.get(&pin).unwrap_or(&Level::High)
    }

    /// Force an input level, e.g. to simulate a button press (active low).
    pub fn set_input_level(&mut self, pin: u8, level: Level) {
        let _ = self.levels.insert(pin, level);
    }

    /// All writes observed so far, oldest first.
    pub fn writes(&self) -> &[(u8, Level)] {
        &self.writes
    }

    /// Number of writes made to one pin.
    pub fn write_count(&self, pin: u8) -> usize {
        self.writes.iter().filter(|(p, _)| *p == pin).count()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn check_failure(&mut self) -> Result<(), MockError> {
        if self.failing || core::mem::take(&mut self.fail_next) {
            return Err(MockError);
        }
        Ok(())
    }
}

impl GpioBackend for MockGpio {
    type Error = MockError;

    fn setup_output(&mut self, pin: u8) -> Result<(), MockError> {
        self.check_failure()?;
        let _ = self.modes.insert(pin, Mode::Output);
        let _ = self.levels.insert(pin, Level::Low);
        Ok(())
    }

    fn setup_input_pullup(&mut self, pin: u8) -> Result<(), MockError> {
        self.check_failure()?;
        let _ = self.modes.insert(pin, Mode::InputPullup);
        // Pull-up means the line idles high
        let _ = self.levels.insert(pin, Level::High);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), MockError> {
        self.check_failure()?;
        let _ = self.levels.insert(pin, level);
        if self.writes.is_full() {
            self.writes.remove(0);
        }
        let _ = self.writes.push((pin, level));
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, MockError> {
        self.check_failure()?;
        Ok(self.level(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_pin_reads_high() {
        let mut gpio = MockGpio::new();
        assert_eq!(gpio.read(9), Ok(Level::High));
    }

    #[test]
    fn output_setup_drives_low() {
        let mut gpio = MockGpio::new();
        gpio.setup_output(4).unwrap();
        assert_eq!(gpio.level(4), Level::Low);
    }

    #[test]
    fn write_log_records_traffic() {
        let mut gpio = MockGpio::new();
        gpio.setup_output(4).unwrap();
        gpio.write(4, Level::High).unwrap();
        gpio.write(4, Level::Low).unwrap();
        assert_eq!(gpio.writes(), &[(4, Level::High), (4, Level::Low)]);
        assert_eq!(gpio.write_count(4), 2);
    }

    #[test]
    fn injected_failure_hits_once() {
        let mut gpio = MockGpio::new();
        gpio.fail_next();
        assert_eq!(gpio.read(1), Err(MockError));
        assert!(gpio.read(1).is_ok());
    }
}
