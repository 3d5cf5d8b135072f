use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

/// Queue entry: a job or the marker that stops the worker dequeuing it.
#[derive(Debug)]
pub enum Entry<T> {
    Job(T),
    Stop,
}

/// Blocking FIFO shared between the dispatcher and its workers.
///
/// Tracks unfinished entries: every dequeued entry must be acknowledged with
/// [`task_done`](Self::task_done), and [`join`](Self::join) blocks until all pushed entries were
/// acknowledged.
#[derive(Debug)]
pub struct JobQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
    drained: Condvar,
}

#[derive(Debug)]
struct QueueState<T> {
    entries: VecDeque<Entry<T>>,
    unfinished: usize,
}

impl<T> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JobQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                entries: VecDeque::new(),
                unfinished: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    pub fn push(&self, entry: Entry<T>) {
        let mut state = self.state.lock();
        state.entries.push_back(entry);
        state.unfinished += 1;
        drop(state);
        self.available.notify_one();
    }

    /// Dequeue the oldest entry, blocking while the queue is empty.
    pub fn pop_blocking(&self) -> Entry<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(entry) = state.entries.pop_front() {
                return entry;
            }
            self.available.wait(&mut state);
        }
    }

    /// Acknowledge one dequeued entry.
    pub fn task_done(&self) {
        let mut state = self.state.lock();
        state.unfinished = state.unfinished.saturating_sub(1);
        if state.unfinished == 0 {
            self.drained.notify_all();
        }
    }

    /// Block until every pushed entry has been acknowledged.
    pub fn join(&self) {
        let mut state = self.state.lock();
        while state.unfinished > 0 {
            self.drained.wait(&mut state);
        }
    }

    /// Entries waiting to be dequeued.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries pushed but not yet acknowledged.
    pub fn unfinished(&self) -> usize {
        self.state.lock().unfinished
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/queue.rs"]
mod tests;
