//! Embassy tasks
//!
//! One PWM task per clock channel, the stop-button monitor and the alarm
//! scheduler. All of them drive the shared motor controller; none of them
//! ever terminates.

pub mod pwm;
pub mod scheduler;
pub mod stop_button;
