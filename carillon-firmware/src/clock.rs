//! Wall-clock source backed by the RP2040 RTC.
//!
//! The hardware RTC ticks in whole seconds. Sub-second phase, which the
//! scheduler uses to align its ticks to second boundaries, is reconstructed
//! from the monotonic clock by timing how long ago the RTC second last
//! rolled over.

use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DayOfWeek, Rtc, RtcError};
use embassy_time::Instant;

use carillon_core::{WallClock, WallTime, Weekday};

pub struct RtcClock {
    rtc: Rtc<'static, RTC>,
    last_stamp: Option<(u8, u8, u8)>,
    second_started: Instant,
}

impl RtcClock {
    pub fn new(rtc: Rtc<'static, RTC>) -> Self {
        Self {
            rtc,
            last_stamp: None,
            second_started: Instant::now(),
        }
    }
}

fn weekday_from(day: DayOfWeek) -> Weekday {
    match day {
        DayOfWeek::Monday => Weekday::Mon,
        DayOfWeek::Tuesday => Weekday::Tue,
        DayOfWeek::Wednesday => Weekday::Wed,
        DayOfWeek::Thursday => Weekday::Thu,
        DayOfWeek::Friday => Weekday::Fri,
        DayOfWeek::Saturday => Weekday::Sat,
        DayOfWeek::Sunday => Weekday::Sun,
    }
}

impl WallClock for RtcClock {
    type Error = RtcError;

    fn now(&mut self) -> Result<WallTime, RtcError> {
        let dt = self.rtc.now()?;
        let stamp = (dt.hour, dt.minute, dt.second);
        if self.last_stamp != Some(stamp) {
            self.last_stamp = Some(stamp);
            self.second_started = Instant::now();
        }
        let millisecond = self.second_started.elapsed().as_millis().min(999) as u16;
        Ok(WallTime {
            hour: dt.hour,
            minute: dt.minute,
            second: dt.second,
            millisecond,
            weekday: weekday_from(dt.day_of_week),
        })
    }
}
