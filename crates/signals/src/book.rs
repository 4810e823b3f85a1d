// In crates/signals/src/book.rs

use core_types::{Signal, SignalStatus};
use std::collections::VecDeque;

use crate::filter::SignalCriteria;

/// The in-memory signal list behind a signals page, newest first.
#[derive(Debug, Clone, Default)]
pub struct SignalBook {
    signals: VecDeque<Signal>,
    /// Maximum number of signals kept. `None` keeps everything.
    window: Option<usize>,
}

impl SignalBook {
    pub fn new(window: Option<usize>) -> Self {
        Self {
            signals: VecDeque::new(),
            window,
        }
    }

    /// Creates a book pre-filled with `seed` (already newest first).
    pub fn with_signals(seed: Vec<Signal>, window: Option<usize>) -> Self {
        let mut book = Self {
            signals: seed.into(),
            window,
        };
        book.enforce_window();
        book
    }

    /// Puts `signal` at the front and returns how many old signals fell out of the window.
    pub fn prepend(&mut self, signal: Signal) -> usize {
        self.signals.push_front(signal);
        self.enforce_window()
    }

    fn enforce_window(&mut self) -> usize {
        let Some(window) = self.window else {
            return 0;
        };
        let overflow = self.signals.len().saturating_sub(window);
        self.signals.truncate(window);
        overflow
    }

    /// Explicit status change; nothing advances a signal's status on its own.
    pub fn set_status(&mut self, id: u64, status: SignalStatus) -> bool {
        match self.signals.iter_mut().find(|s| s.id == id) {
            Some(signal) => {
                signal.status = status;
                true
            }
            None => false,
        }
    }

    pub fn latest(&self) -> Option<&Signal> {
        self.signals.front()
    }

    pub fn get(&self, id: u64) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id == id)
    }

    /// Highest id currently held, used to continue the id sequence after a seed list.
    pub fn max_id(&self) -> Option<u64> {
        self.signals.iter().map(|s| s.id).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    pub fn to_vec(&self) -> Vec<Signal> {
        self.signals.iter().cloned().collect()
    }

    /// The signals that pass `criteria`, newest first.
    pub fn filtered(&self, criteria: &SignalCriteria) -> Vec<Signal> {
        self.signals
            .iter()
            .filter(|signal| criteria.matches(signal))
            .cloned()
            .collect()
    }
}
