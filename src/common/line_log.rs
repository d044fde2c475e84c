// src/common/line_log.rs

use super::timing::LOG_HISTORY_LINES;
use alloc::string::{String, ToString};
use heapless::HistoryBuffer;

/// The last `L` lines received from the fixture, oldest first.
///
/// The operator log only ever shows a short tail, so older lines are overwritten
/// in place instead of accumulating.
pub struct LineLog<const L: usize = LOG_HISTORY_LINES> {
    lines: HistoryBuffer<String, L>,
}

impl<const L: usize> LineLog<L> {
    pub fn new() -> Self {
        LineLog { lines: HistoryBuffer::new() }
    }

    pub fn push(&mut self, line: &str) {
        self.lines.write(line.to_string());
    }

    /// Lines in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.oldest_ordered().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.recent().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 0
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl<const L: usize> Default for LineLog<L> {
    fn default() -> Self {
        Self::new()
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_keeps_only_last_lines() {
        let mut log: LineLog<3> = LineLog::new();
        for line in ["START", "OK", "WAITING", "NG"] {
            log.push(line);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.iter().collect::<Vec<_>>(), ["OK", "WAITING", "NG"]);
        assert_eq!(log.last(), Some("NG"));
    }

    #[test]
    fn test_empty_log() {
        let mut log: LineLog = LineLog::new();
        assert!(log.is_empty());
        assert_eq!(log.last(), None);
        log.push("DEBUG:boot");
        log.clear();
        assert!(log.is_empty());
    }
}
