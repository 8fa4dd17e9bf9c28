//! Append-only narration log shown to the operator.

#![allow(missing_docs)]

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Display class of a narration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    #[default]
    Normal,
    Step,
    Error,
}

/// One line of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub text: String,
    pub kind: LineKind,
}

impl StatusLine {
    pub fn new(text: impl Into<String>, kind: LineKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn normal(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Normal)
    }

    pub fn step(text: impl Into<String>) -> Self {
        Self::new(text, LineKind::Step)
    }
}

/// Ordered narration lines. With a non-zero capacity the oldest line is
/// evicted once the log is full.
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    lines: VecDeque<StatusLine>,
    capacity: usize,
    evicted: u64,
}

impl StatusLog {
    /// Log without a size bound.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Log holding at most `capacity` lines; `0` means unbounded.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity,
            evicted: 0,
        }
    }

    pub fn append(&mut self, text: impl Into<String>, kind: LineKind) {
        self.push(StatusLine::new(text, kind));
    }

    pub fn push(&mut self, line: StatusLine) {
        if self.capacity > 0 && self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.evicted += 1;
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.evicted = 0;
    }

    pub fn lines(&self) -> impl Iterator<Item = &StatusLine> {
        self.lines.iter()
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &StatusLine> {
        self.lines.iter().skip(self.lines.len().saturating_sub(n))
    }

    /// Line texts in order; mostly for assertions and plain rendering.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines dropped by the capacity bound since the last clear.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}
