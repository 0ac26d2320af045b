//! Configuration type definitions
//!
//! Static wiring and policy for one controller, read once at startup. Pin
//! numbers follow the motor driver wiring: ENA/ENB gate current to each
//! motor (and carry the software PWM), IN1..IN4 fix direction, and the stop
//! button is an active-low input on its own line.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pin numbers for the H-bridge and the stop button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignment {
    /// Enable / PWM line for clock 1.
    pub ena: u8,
    /// Direction pair for clock 1.
    pub in1: u8,
    pub in2: u8,
    /// Enable / PWM line for clock 2.
    pub enb: u8,
    /// Direction pair for clock 2.
    pub in3: u8,
    pub in4: u8,
    /// Stop button input, active low with pull-up.
    pub stop_button: u8,
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            ena: 2,
            in1: 5,
            in2: 7,
            enb: 16,
            in3: 8,
            in4: 13,
            stop_button: 6,
        }
    }
}

/// Fixed direction polarity for one motor: the levels written to its IN
/// pair at initialization (true = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorPolarity {
    pub in_first: bool,
    pub in_second: bool,
}

impl Default for MotorPolarity {
    fn default() -> Self {
        // Forward for both clocks as wired
        Self {
            in_first: true,
            in_second: false,
        }
    }
}

/// Complete controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    pub pins: PinAssignment,
    /// Direction polarity for clock 1 (IN1, IN2).
    pub motor1_direction: MotorPolarity,
    /// Direction polarity for clock 2 (IN3, IN4).
    pub motor2_direction: MotorPolarity,
    /// Duty cycle a channel starts with before any `set_duty`, percent.
    pub default_duty: u8,
    /// Software PWM frequency in Hz, clamped to 1..=10000 on use.
    pub pwm_frequency_hz: u16,
    /// Stop button poll interval in milliseconds.
    pub debounce_ms: u16,
    /// Whether a triggered stop latches until explicitly cleared.
    pub stop_latch: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pins: PinAssignment::default(),
            motor1_direction: MotorPolarity::default(),
            motor2_direction: MotorPolarity::default(),
            default_duty: 100,
            pwm_frequency_hz: 500,
            debounce_ms: 50,
            stop_latch: true,
        }
    }
}
