//! Scheduled callbacks on a shared millisecond clock.
//!
//! The game never sleeps or spawns threads. Instead it asks a [`Clock`] to
//! schedule a [`Wake`], and whoever drives the clock hands due wakes back to
//! the controller. [`Scheduler`] keeps virtual time, so the terminal loop can
//! feed it wall-clock milliseconds while tests step it deterministically.

/// Identifies one scheduled callback for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// What a scheduled callback asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// One countdown step of the question timer
    Tick,
    /// The feedback window after an answer or timeout has ended
    FeedbackElapsed,
}

pub trait Clock {
    fn schedule_repeating(&mut self, interval_ms: u64, wake: Wake) -> TimerHandle;
    fn schedule_once(&mut self, delay_ms: u64, wake: Wake) -> TimerHandle;
    /// Cancelling an unknown or already-fired handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone)]
struct Entry {
    handle: TimerHandle,
    due_ms: u64,
    interval_ms: Option<u64>,
    wake: Wake,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Removes and returns the earliest wake due at or before `until_ms`,
    /// moving the clock to its deadline. Repeating entries are re-armed.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Wake> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= until_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.handle))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        self.now_ms = self.now_ms.max(entry.due_ms);
        let wake = entry.wake;
        match entry.interval_ms {
            Some(interval) => entry.due_ms += interval,
            None => {
                self.entries.remove(idx);
            }
        }
        Some(wake)
    }

    /// Moves the clock forward once every due wake has been popped.
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    fn insert(&mut self, due_ms: u64, interval_ms: Option<u64>, wake: Wake) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            handle,
            due_ms,
            interval_ms,
            wake,
        });
        handle
    }
}

impl Clock for Scheduler {
    fn schedule_repeating(&mut self, interval_ms: u64, wake: Wake) -> TimerHandle {
        let interval = interval_ms.max(1);
        self.insert(self.now_ms + interval, Some(interval), wake)
    }

    fn schedule_once(&mut self, delay_ms: u64, wake: Wake) -> TimerHandle {
        self.insert(self.now_ms + delay_ms, None, wake)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.entries.retain(|e| e.handle != handle);
    }
}
