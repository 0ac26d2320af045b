//! Wall-clock time types
//!
//! The scheduler matches alarms against wall-clock time with second
//! precision; the millisecond field only exists so loops can phase-align
//! their sleeps to second boundaries. Clock sources with coarser resolution
//! may approximate it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All weekdays, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Index with Monday = 0 .. Sunday = 6.
    pub const fn index(self) -> u8 {
        match self {
            Weekday::Mon => 0,
            Weekday::Tue => 1,
            Weekday::Wed => 2,
            Weekday::Thu => 3,
            Weekday::Fri => 4,
            Weekday::Sat => 5,
            Weekday::Sun => 6,
        }
    }

    /// Lowercase three-letter token, as used by the API day lists.
    pub const fn token(self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }

    /// Parse a three-letter token, ignoring ASCII case and surrounding
    /// whitespace.
    pub fn parse(token: &str) -> Option<Weekday> {
        let token = token.trim();
        Weekday::ALL
            .into_iter()
            .find(|d| d.token().eq_ignore_ascii_case(token))
    }
}

/// A point in wall-clock time, date-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WallTime {
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
    /// Millisecond within the second, 0-999. Best effort, see module docs.
    pub millisecond: u16,
    /// Day of the week.
    pub weekday: Weekday,
}

impl WallTime {
    /// Construct a time at the top of a second.
    pub const fn new(hour: u8, minute: u8, second: u8, weekday: Weekday) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond: 0,
            weekday,
        }
    }

    /// Milliseconds remaining until the next second boundary, at least 1.
    pub const fn ms_to_next_second(&self) -> u16 {
        let remaining = 1000u16.saturating_sub(self.millisecond);
        if remaining == 0 {
            1
        } else {
            remaining
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_tokens_round_trip() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::parse(day.token()), Some(day));
        }
        assert_eq!(Weekday::parse(" WED "), Some(Weekday::Wed));
        assert_eq!(Weekday::parse("wednesday"), None);
    }

    #[test]
    fn boundary_sleep_never_zero() {
        let mut t = WallTime::new(12, 0, 0, Weekday::Mon);
        assert_eq!(t.ms_to_next_second(), 1000);
        t.millisecond = 999;
        assert_eq!(t.ms_to_next_second(), 1);
        t.millisecond = 1000;
        assert_eq!(t.ms_to_next_second(), 1);
    }
}
