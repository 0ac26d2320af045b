//! Alarm model and time matching
//!
//! Alarms are owned by the persistence collaborator; the scheduler sees them
//! by value once per tick. Matching is exact-second: an alarm fires when the
//! current hour, minute and second all equal its fields and the day filter
//! admits today. A tick that runs late can therefore miss a trigger - that is
//! an accepted property of the one-second cadence, not something matching
//! papers over.

use heapless::String;

use crate::time::{WallTime, Weekday};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable alarm identifier, assigned by the store at creation.
pub type AlarmId = u32;

/// Maximum number of alarms a store query returns per tick.
pub const MAX_ALARMS: usize = 16;

/// Maximum alarm name length in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Which clock motor an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClockId {
    Clock1,
    Clock2,
}

/// Raw clock id outside {1, 2} - a caller contract violation, rejected at
/// the boundary rather than clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidClockId(pub u8);

impl ClockId {
    /// Both clocks, in numbering order.
    pub const ALL: [ClockId; 2] = [ClockId::Clock1, ClockId::Clock2];

    /// Zero-based channel index.
    pub const fn index(self) -> usize {
        match self {
            ClockId::Clock1 => 0,
            ClockId::Clock2 => 1,
        }
    }

    /// One-based clock number as used by the API.
    pub const fn number(self) -> u8 {
        match self {
            ClockId::Clock1 => 1,
            ClockId::Clock2 => 2,
        }
    }
}

impl TryFrom<u8> for ClockId {
    type Error = InvalidClockId;

    fn try_from(raw: u8) -> Result<Self, InvalidClockId> {
        match raw {
            1 => Ok(ClockId::Clock1),
            2 => Ok(ClockId::Clock2),
            other => Err(InvalidClockId(other)),
        }
    }
}

/// Set of weekdays, one bit per day (Monday = bit 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);

    /// Build a set from a list of days.
    pub fn from_days(days: &[Weekday]) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in days {
            set.insert(*day);
        }
        set
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.index();
    }

    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Day filter for an alarm.
///
/// Mirrors the wire format the API layer uses: the literal `"daily"`, the
/// literal `"once"`, or a comma-separated weekday token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DaySpec {
    /// Fires every day.
    Daily,
    /// Fires on the next time match, then the store disables it.
    Once,
    /// Fires only on the listed weekdays.
    Days(WeekdaySet),
}

/// Invalid day specification string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DaySpecParseError {
    /// A token was not a weekday abbreviation.
    UnknownToken,
    /// The weekday list was empty.
    Empty,
}

impl DaySpec {
    /// Whether an alarm with this filter may fire on `day`.
    ///
    /// `Once` always admits the day; the store disables the alarm after the
    /// first trigger.
    pub const fn applies_on(self, day: Weekday) -> bool {
        match self {
            DaySpec::Daily | DaySpec::Once => true,
            DaySpec::Days(set) => set.contains(day),
        }
    }

    /// Parse the API wire format: `"daily"`, `"once"` or `"mon,wed,fri"`.
    pub fn parse(spec: &str) -> Result<DaySpec, DaySpecParseError> {
        let spec = spec.trim();
        if spec.eq_ignore_ascii_case("daily") {
            return Ok(DaySpec::Daily);
        }
        if spec.eq_ignore_ascii_case("once") {
            return Ok(DaySpec::Once);
        }

        let mut set = WeekdaySet::EMPTY;
        for token in spec.split(',') {
            if token.trim().is_empty() {
                continue;
            }
            match Weekday::parse(token) {
                Some(day) => set.insert(day),
                None => return Err(DaySpecParseError::UnknownToken),
            }
        }
        if set.is_empty() {
            return Err(DaySpecParseError::Empty);
        }
        Ok(DaySpec::Days(set))
    }
}

/// One alarm definition, as read from the store each tick.
///
/// Creation and last-trigger timestamps are persistence metadata and stay
/// with the store; the scheduler reports trigger instants back through
/// [`crate::traits::AlarmStore::mark_triggered`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Alarm {
    pub id: AlarmId,
    pub name: String<MAX_NAME_LEN>,
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
    /// Clock motor to ring.
    pub clock: ClockId,
    pub enabled: bool,
    pub days: DaySpec,
    /// Ring duration in seconds; 0 means manual-off only.
    pub duration_s: u32,
}

impl Alarm {
    /// Whether this alarm should fire at `now`.
    pub fn matches(&self, now: &WallTime) -> bool {
        if !self.enabled {
            return false;
        }
        if now.hour != self.hour || now.minute != self.minute || now.second != self.second {
            return false;
        }
        self.days.applies_on(now.weekday)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarm(hour: u8, minute: u8, second: u8, days: DaySpec) -> Alarm {
        let mut name = String::new();
        let _ = name.push_str("wake");
        Alarm {
            id: 1,
            name,
            hour,
            minute,
            second,
            clock: ClockId::Clock1,
            enabled: true,
            days,
            duration_s: 30,
        }
    }

    #[test]
    fn once_alarm_matches_exact_second_only() {
        let a = alarm(7, 30, 0, DaySpec::Once);
        let at = WallTime::new(7, 30, 0, Weekday::Tue);
        assert!(a.matches(&at));

        let late = WallTime::new(7, 30, 1, Weekday::Tue);
        assert!(!a.matches(&late));
    }

    #[test]
    fn disabled_alarm_never_matches() {
        let mut a = alarm(7, 30, 0, DaySpec::Once);
        a.enabled = false;
        assert!(!a.matches(&WallTime::new(7, 30, 0, Weekday::Tue)));
    }

    #[test]
    fn day_set_filters_weekdays() {
        let days = DaySpec::parse("mon,wed,fri").unwrap();
        let a = alarm(6, 15, 30, days);

        for day in Weekday::ALL {
            let now = WallTime::new(6, 15, 30, day);
            let expected = matches!(day, Weekday::Mon | Weekday::Wed | Weekday::Fri);
            assert_eq!(a.matches(&now), expected, "day {:?}", day);
        }

        // Right day, wrong second
        assert!(!a.matches(&WallTime::new(6, 15, 31, Weekday::Mon)));
    }

    #[test]
    fn daily_matches_every_weekday() {
        let a = alarm(23, 59, 59, DaySpec::Daily);
        for day in Weekday::ALL {
            assert!(a.matches(&WallTime::new(23, 59, 59, day)));
        }
    }

    #[test]
    fn day_spec_parsing() {
        assert_eq!(DaySpec::parse("daily"), Ok(DaySpec::Daily));
        assert_eq!(DaySpec::parse(" Once "), Ok(DaySpec::Once));
        assert_eq!(
            DaySpec::parse("sat, sun"),
            Ok(DaySpec::Days(WeekdaySet::from_days(&[
                Weekday::Sat,
                Weekday::Sun
            ])))
        );
        assert_eq!(
            DaySpec::parse("mon,funday"),
            Err(DaySpecParseError::UnknownToken)
        );
        assert_eq!(DaySpec::parse(""), Err(DaySpecParseError::Empty));
        assert_eq!(DaySpec::parse(","), Err(DaySpecParseError::Empty));
    }

    #[test]
    fn clock_id_boundary() {
        assert_eq!(ClockId::try_from(1), Ok(ClockId::Clock1));
        assert_eq!(ClockId::try_from(2), Ok(ClockId::Clock2));
        assert_eq!(ClockId::try_from(0), Err(InvalidClockId(0)));
        assert_eq!(ClockId::try_from(3), Err(InvalidClockId(3)));
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // Matching requires exact equality on all three time fields.
            #[test]
            fn match_implies_field_equality(
                ah in 0u8..24, am in 0u8..60, asec in 0u8..60,
                nh in 0u8..24, nm in 0u8..60, ns in 0u8..60,
                day in 0usize..7,
            ) {
                let a = alarm(ah, am, asec, DaySpec::Daily);
                let now = WallTime::new(nh, nm, ns, Weekday::ALL[day]);
                let matched = a.matches(&now);
                prop_assert_eq!(
                    matched,
                    ah == nh && am == nm && asec == ns
                );
            }
        }
    }
}
