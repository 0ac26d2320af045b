//! Pending auto-off registry
//!
//! When an alarm with a non-zero duration fires, the scheduler records a
//! deadline here instead of spawning a task per alarm. Re-firing the same
//! alarm replaces its entry, which cancels the superseded deadline - a late
//! stray off-command for an earlier firing can therefore never land after a
//! more recent one. Dropping the registry cancels everything without running
//! any of it.
//!
//! Deadlines are monotonic milliseconds supplied by the caller, so the
//! registry itself needs no timer and is testable as plain state.

use heapless::FnvIndexMap;

use crate::alarm::{AlarmId, ClockId, MAX_ALARMS};

/// One scheduled auto-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingOff {
    /// Clock to turn off when the deadline passes.
    pub clock: ClockId,
    /// Monotonic deadline in milliseconds.
    pub deadline_ms: u64,
}

/// Registry of pending auto-offs, keyed by alarm id.
#[derive(Debug, Default)]
pub struct AutoOffRegistry {
    entries: FnvIndexMap<AlarmId, PendingOff, MAX_ALARMS>,
}

impl AutoOffRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deadline currently pending for an alarm, if any.
    pub fn pending(&self, id: AlarmId) -> Option<PendingOff> {
        self.entries.get(&id).copied()
    }

    /// Schedule an auto-off `duration_s` after `now_ms`, replacing (and so
    /// cancelling) any entry the same alarm already has.
    ///
    /// Returns `false` if the registry is full and the alarm had no entry to
    /// replace; the caller is expected to log and carry on.
    pub fn schedule(&mut self, id: AlarmId, clock: ClockId, now_ms: u64, duration_s: u32) -> bool {
        let entry = PendingOff {
            clock,
            deadline_ms: now_ms + u64::from(duration_s) * 1000,
        };
        self.entries.insert(id, entry).is_ok()
    }

    /// Cancel one pending auto-off without running it.
    pub fn cancel(&mut self, id: AlarmId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Remove and return every entry whose deadline has passed.
    pub fn take_due(&mut self, now_ms: u64) -> heapless::Vec<(AlarmId, ClockId), MAX_ALARMS> {
        let mut due = heapless::Vec::new();
        for (id, entry) in self.entries.iter() {
            if entry.deadline_ms <= now_ms {
                let _ = due.push((*id, entry.clock));
            }
        }
        for (id, _) in due.iter() {
            self.entries.remove(id);
        }
        due
    }

    /// Cancel everything, e.g. on shutdown.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_at_deadline() {
        let mut reg = AutoOffRegistry::new();
        assert!(reg.schedule(7, ClockId::Clock1, 1_000, 5));

        assert!(reg.take_due(5_999).is_empty());
        let due = reg.take_due(6_000);
        assert_eq!(due.as_slice(), &[(7, ClockId::Clock1)]);
        assert!(reg.is_empty());

        // Taken entries do not fire twice
        assert!(reg.take_due(10_000).is_empty());
    }

    #[test]
    fn refire_replaces_pending_deadline() {
        let mut reg = AutoOffRegistry::new();
        reg.schedule(7, ClockId::Clock1, 0, 5);

        // Re-fires 2s later; the old 5s deadline is superseded
        reg.schedule(7, ClockId::Clock1, 2_000, 5);
        assert_eq!(reg.len(), 1);

        // Nothing due at the original deadline
        assert!(reg.take_due(5_000).is_empty());

        // Due only 5s after the latest firing
        assert_eq!(
            reg.take_due(7_000).as_slice(),
            &[(7, ClockId::Clock1)]
        );
    }

    #[test]
    fn cancel_removes_without_running() {
        let mut reg = AutoOffRegistry::new();
        reg.schedule(3, ClockId::Clock2, 0, 1);
        assert!(reg.cancel(3));
        assert!(!reg.cancel(3));
        assert!(reg.take_due(u64::MAX).is_empty());
    }

    #[test]
    fn full_registry_still_replaces_existing() {
        let mut reg = AutoOffRegistry::new();
        for id in 0..MAX_ALARMS as AlarmId {
            assert!(reg.schedule(id, ClockId::Clock1, 0, 60));
        }
        // New key is refused once full
        assert!(!reg.schedule(999, ClockId::Clock2, 0, 60));
        // Known key still replaces
        assert!(reg.schedule(0, ClockId::Clock2, 0, 120));
        assert_eq!(reg.pending(0).unwrap().deadline_ms, 120_000);
    }

    #[test]
    fn clear_cancels_all() {
        let mut reg = AutoOffRegistry::new();
        reg.schedule(1, ClockId::Clock1, 0, 1);
        reg.schedule(2, ClockId::Clock2, 0, 1);
        reg.clear();
        assert!(reg.is_empty());
    }
}
