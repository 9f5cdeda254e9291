use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Per strategy run, spec §4.E.3: "the most recent 500 lines."
const LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Trade,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// A bounded ring buffer of the most recent [`LOG_CAPACITY`] lines for one
/// live run. Oldest lines are dropped silently once full.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: VecDeque<LogLine>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self { lines: VecDeque::with_capacity(LOG_CAPACITY) }
    }

    pub fn push(&mut self, timestamp: DateTime<Utc>, level: LogLevel, message: impl Into<String>) {
        if self.lines.len() == LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine { timestamp, level, message: message.into() });
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn drops_oldest_line_once_full() {
        let mut buf = LogBuffer::new();
        for i in 0..LOG_CAPACITY + 10 {
            buf.push(at(i as i64), LogLevel::Info, format!("line {i}"));
        }
        assert_eq!(buf.len(), LOG_CAPACITY);
        let snapshot = buf.snapshot();
        assert_eq!(snapshot.first().unwrap().message, "line 10");
        assert_eq!(snapshot.last().unwrap().message, format!("line {}", LOG_CAPACITY + 9));
    }

    #[test]
    fn preserves_insertion_order_below_capacity() {
        let mut buf = LogBuffer::new();
        buf.push(at(1), LogLevel::Trade, "bought");
        buf.push(at(2), LogLevel::Error, "reverted");
        let snapshot = buf.snapshot();
        assert_eq!(snapshot[0].level, LogLevel::Trade);
        assert_eq!(snapshot[1].level, LogLevel::Error);
    }
}
