//! Virtual-time timer queue
//!
//! Drives the periodic tick and the one-shot clears of transient display
//! flags. Time only moves when the host advances it, so tests can step it
//! exactly. Entries fire in due order; equal due times fire in scheduling
//! order.

/// What a timer does when it fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Run one simulation tick
    Tick,
    /// Clear a body's shake flag
    ClearShake { id: String },
    /// Clear the special body's bounce flag
    ClearBounced { id: String },
}

/// Handle for cancelling a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    due_ms: u64,
    /// Scheduling order, for stable ties
    seq: u64,
    /// Re-arm interval for periodic timers
    period_ms: Option<u64>,
    event: TimerEvent,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now_ms: u64,
    entries: Vec<Entry>,
    next_handle: u64,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, due_ms: u64, period_ms: Option<u64>, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry {
            handle,
            due_ms,
            seq,
            period_ms,
            event,
        });
        handle
    }

    /// Fire once after `delay_ms`.
    ///
    /// A flag clear replaces any pending clear for the same body and flag, so
    /// a re-set flag lives for the full delay again.
    pub fn after(&mut self, event: TimerEvent, delay_ms: u64) -> TimerHandle {
        if event != TimerEvent::Tick {
            self.entries
                .retain(|e| e.period_ms.is_some() || e.event != event);
        }
        self.push(self.now_ms + delay_ms, None, event)
    }

    /// Fire every `interval_ms`, first after one interval
    pub fn every(&mut self, event: TimerEvent, interval_ms: u64) -> TimerHandle {
        let interval_ms = interval_ms.max(1);
        self.push(self.now_ms + interval_ms, Some(interval_ms), event)
    }

    /// Remove a timer; unknown or already fired handles are ignored
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    /// Drop every pending timer; the clock keeps its time
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Pop the next timer due at or before `until_ms`, moving the clock to it.
    ///
    /// Periodic timers are re-armed before returning, so the caller may cancel
    /// them while handling the event.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerEvent)> {
        let index = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.seq))
            .map(|(i, _)| i)?;

        let entry = self.entries.swap_remove(index);
        self.now_ms = self.now_ms.max(entry.due_ms);

        if let Some(period) = entry.period_ms {
            let seq = self.next_seq;
            self.next_seq += 1;
            self.entries.push(Entry {
                due_ms: entry.due_ms + period,
                seq,
                event: entry.event.clone(),
                ..entry
            });
        }

        Some((entry.handle, entry.event))
    }

    /// Move the clock forward once nothing else is due
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
