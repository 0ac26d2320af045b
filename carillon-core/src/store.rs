//! In-memory reference alarm store
//!
//! Keeps alarms plus their trigger metadata in RAM. Serves as the default
//! store for firmware builds without external persistence and as the fixture
//! for scheduler tests. Queries behave like the durable store: a fresh
//! snapshot per call, trigger marks persisted immediately.

use heapless::Vec;

use crate::alarm::{Alarm, AlarmId, DaySpec, MAX_ALARMS};
use crate::time::WallTime;
use crate::traits::AlarmStore;

/// Store error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// No alarm with the given id.
    NotFound,
    /// Store is at capacity.
    Full,
}

#[derive(Debug, Clone)]
struct StoredAlarm {
    alarm: Alarm,
    last_triggered: Option<WallTime>,
}

/// RAM-backed alarm store.
#[derive(Debug, Default)]
pub struct MemoryAlarmStore {
    alarms: Vec<StoredAlarm, MAX_ALARMS>,
    next_id: AlarmId,
}

impl MemoryAlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an alarm, assigning it a fresh id. Returns the id.
    pub fn add(&mut self, mut alarm: Alarm) -> Result<AlarmId, StoreError> {
        self.next_id += 1;
        alarm.id = self.next_id;
        let id = alarm.id;
        self.alarms
            .push(StoredAlarm {
                alarm,
                last_triggered: None,
            })
            .map_err(|_| StoreError::Full)?;
        Ok(id)
    }

    pub fn remove(&mut self, id: AlarmId) -> Result<(), StoreError> {
        let idx = self.index_of(id).ok_or(StoreError::NotFound)?;
        self.alarms.swap_remove(idx);
        Ok(())
    }

    pub fn set_enabled(&mut self, id: AlarmId, enabled: bool) -> Result<(), StoreError> {
        let idx = self.index_of(id).ok_or(StoreError::NotFound)?;
        self.alarms[idx].alarm.enabled = enabled;
        Ok(())
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.index_of(id).map(|i| &self.alarms[i].alarm)
    }

    /// When the alarm last fired, if ever.
    pub fn last_triggered(&self, id: AlarmId) -> Option<WallTime> {
        self.index_of(id).and_then(|i| self.alarms[i].last_triggered)
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    fn index_of(&self, id: AlarmId) -> Option<usize> {
        self.alarms.iter().position(|s| s.alarm.id == id)
    }
}

impl AlarmStore for MemoryAlarmStore {
    type Error = StoreError;

    async fn enabled_alarms(
        &mut self,
        out: &mut Vec<Alarm, MAX_ALARMS>,
    ) -> Result<(), StoreError> {
        out.clear();
        for stored in self.alarms.iter().filter(|s| s.alarm.enabled) {
            // Capacity matches, push cannot fail
            let _ = out.push(stored.alarm.clone());
        }
        Ok(())
    }

    async fn mark_triggered(&mut self, id: AlarmId, at: WallTime) -> Result<(), StoreError> {
        let idx = self.index_of(id).ok_or(StoreError::NotFound)?;
        self.alarms[idx].last_triggered = Some(at);
        Ok(())
    }

    async fn disable_if_once(&mut self, id: AlarmId) -> Result<(), StoreError> {
        let idx = self.index_of(id).ok_or(StoreError::NotFound)?;
        let stored = &mut self.alarms[idx];
        if stored.alarm.days == DaySpec::Once {
            stored.alarm.enabled = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};

    use crate::alarm::ClockId;
    use crate::time::Weekday;

    use super::*;

    // The store's async methods never actually suspend; a single poll with a
    // no-op waker resolves them.
    fn poll_once<F: Future>(fut: F) -> F::Output {
        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);
        match pin!(fut).poll(&mut cx) {
            Poll::Ready(out) => out,
            Poll::Pending => unreachable!("store futures resolve immediately"),
        }
    }

    fn alarm(days: DaySpec) -> Alarm {
        let mut name = heapless::String::new();
        let _ = name.push_str("test");
        Alarm {
            id: 0,
            name,
            hour: 7,
            minute: 0,
            second: 0,
            clock: ClockId::Clock1,
            enabled: true,
            days,
            duration_s: 10,
        }
    }

    #[test]
    fn enabled_query_skips_disabled() {
        let mut store = MemoryAlarmStore::new();
        let a = store.add(alarm(DaySpec::Daily)).unwrap();
        let b = store.add(alarm(DaySpec::Daily)).unwrap();
        store.set_enabled(b, false).unwrap();

        let mut out = Vec::new();
        poll_once(store.enabled_alarms(&mut out)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, a);
    }

    #[test]
    fn mark_triggered_records_time() {
        let mut store = MemoryAlarmStore::new();
        let id = store.add(alarm(DaySpec::Daily)).unwrap();
        assert_eq!(store.last_triggered(id), None);

        let at = WallTime::new(7, 0, 0, Weekday::Fri);
        poll_once(store.mark_triggered(id, at)).unwrap();
        assert_eq!(store.last_triggered(id), Some(at));
    }

    #[test]
    fn disable_if_once_only_touches_once_alarms() {
        let mut store = MemoryAlarmStore::new();
        let once = store.add(alarm(DaySpec::Once)).unwrap();
        let daily = store.add(alarm(DaySpec::Daily)).unwrap();

        poll_once(store.disable_if_once(once)).unwrap();
        poll_once(store.disable_if_once(daily)).unwrap();

        assert!(!store.get(once).unwrap().enabled);
        assert!(store.get(daily).unwrap().enabled);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = MemoryAlarmStore::new();
        assert_eq!(
            poll_once(store.mark_triggered(42, WallTime::new(0, 0, 0, Weekday::Mon))),
            Err(StoreError::NotFound)
        );
    }
}
