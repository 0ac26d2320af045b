//! RP2040 GPIO backend
//!
//! Maps the numbered-pin interface onto embassy-rp `Flex` pins. Pins are
//! registered by number at startup; the controller configuration then refers
//! to them the same way the wiring documentation does.

use embassy_rp::gpio::{AnyPin, Flex, Level as RpLevel, Pull};
use embassy_rp::Peri;
use heapless::FnvIndexMap;

use carillon_hal::{GpioBackend, Level};

/// Maximum pins the backend can hold. Power of two for the index map.
pub const MAX_BOARD_PINS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardGpioError {
    /// No pin registered under this number.
    UnknownPin(u8),
    /// The backend is out of pin slots.
    Capacity,
}

/// GPIO backend over registered RP2040 pins.
pub struct BoardGpio {
    pins: FnvIndexMap<u8, Flex<'static>, MAX_BOARD_PINS>,
}

impl BoardGpio {
    pub fn new() -> Self {
        Self {
            pins: FnvIndexMap::new(),
        }
    }

    /// Registers a pin under its GPIO number.
    pub fn register(
        &mut self,
        number: u8,
        pin: Peri<'static, AnyPin>,
    ) -> Result<(), BoardGpioError> {
        self.pins
            .insert(number, Flex::new(pin))
            .map_err(|_| BoardGpioError::Capacity)?;
        Ok(())
    }

    fn pin(&mut self, number: u8) -> Result<&mut Flex<'static>, BoardGpioError> {
        self.pins
            .get_mut(&number)
            .ok_or(BoardGpioError::UnknownPin(number))
    }
}

impl Default for BoardGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBackend for BoardGpio {
    type Error = BoardGpioError;

    fn setup_output(&mut self, pin: u8) -> Result<(), BoardGpioError> {
        let pin = self.pin(pin)?;
        // Low before the direction flips so the line never glitches high.
        pin.set_low();
        pin.set_as_output();
        Ok(())
    }

    fn setup_input_pullup(&mut self, pin: u8) -> Result<(), BoardGpioError> {
        let pin = self.pin(pin)?;
        pin.set_as_input();
        pin.set_pull(Pull::Up);
        Ok(())
    }

    fn write(&mut self, pin: u8, level: Level) -> Result<(), BoardGpioError> {
        let rp_level = match level {
            Level::High => RpLevel::High,
            Level::Low => RpLevel::Low,
        };
        self.pin(pin)?.set_level(rp_level);
        Ok(())
    }

    fn read(&mut self, pin: u8) -> Result<Level, BoardGpioError> {
        let high = self.pin(pin)?.is_high();
        Ok(Level::from(high))
    }
}
