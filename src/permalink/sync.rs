//! Writing the permalink back to the address bar.

use crate::permalink::codec::{encode, PermalinkState};
use std::sync::{Arc, Mutex};

/// Where permalink writes go; the browser's `history.replaceState` in a page
pub trait HistorySink {
    /// Replaces the current entry's query string without navigating
    fn replace_state(&mut self, query: &str);
}

/// History kept in memory, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query written so far, oldest first
    pub fn writes(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn write_count(&self) -> usize {
        self.writes().len()
    }

    /// The query string the address bar shows now
    pub fn current(&self) -> Option<String> {
        self.writes().pop()
    }
}

impl HistorySink for MemoryHistory {
    fn replace_state(&mut self, query: &str) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push(query.to_string());
    }
}

/// Guards permalink writes against the restore that reads the permalink
///
/// Nothing is written before the first restore has finished, nor while a
/// restore is running; finishing a restore writes exactly once.
pub struct PermalinkSync {
    history: Box<dyn HistorySink>,
    restoring: bool,
    initialized: bool,
}

impl PermalinkSync {
    pub fn new(history: Box<dyn HistorySink>) -> Self {
        Self {
            history,
            restoring: false,
            initialized: false,
        }
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    /// Ends the restore and writes the restored state
    pub fn finish_restore(&mut self, state: Option<&PermalinkState>) {
        self.restoring = false;
        self.initialized = true;
        if let Some(state) = state {
            self.write(state);
        }
    }

    /// Writes `state` unless a restore is pending; returns whether it did
    pub fn write(&mut self, state: &PermalinkState) -> bool {
        if self.restoring || !self.initialized {
            log::debug!(
                "Permalink write suppressed (restoring: {}, initialized: {})",
                self.restoring,
                self.initialized
            );
            return false;
        }
        let query = format!("?{}", encode(state));
        log::debug!("Permalink {}", query);
        self.history.replace_state(&query);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_written_before_first_restore() {
        let history = MemoryHistory::new();
        let mut sync = PermalinkSync::new(Box::new(history.clone()));
        assert!(!sync.write(&PermalinkState::default()));
        assert_eq!(history.write_count(), 0);
    }

    #[test]
    fn test_restore_writes_once() {
        let history = MemoryHistory::new();
        let mut sync = PermalinkSync::new(Box::new(history.clone()));
        sync.begin_restore();
        for _ in 0..5 {
            assert!(!sync.write(&PermalinkState::default()));
        }
        sync.finish_restore(Some(&PermalinkState::default()));

        assert_eq!(history.write_count(), 1);
        assert!(history.current().unwrap().starts_with("?lat=60.1900000"));
        assert!(sync.write(&PermalinkState::default()));
        assert_eq!(history.write_count(), 2);
    }
}
