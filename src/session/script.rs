//! Scripted narration for the simulated test sequence.
//!
//! [`NarrationScript`] is a pure iterator: it never sleeps. Each step carries a
//! pacing hint the presentation layer may honor, scale, or ignore.

#![allow(missing_docs)]

use std::iter::FusedIterator;
use std::time::Duration;

use crate::catalog::{self, CarRole};
use crate::session::status::StatusLine;

const PREPARATION: [(&str, u64); 3] = [
    ("3. Visual Inspection and Preparation", 500),
    ("Checking jumper cables between cars", 300),
    ("Checking air connections between cars", 300),
];

const CAR_PACE_MS: u64 = 800;
const SYSTEM_PACE_MS: u64 = 500;

/// One narration line plus how long a display may linger on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub line: StatusLine,
    pub pace: Duration,
}

impl ScriptStep {
    fn step(text: impl Into<String>, pace_ms: u64) -> Self {
        Self {
            line: StatusLine::step(text),
            pace: Duration::from_millis(pace_ms),
        }
    }

    /// Pacing hint multiplied by `scale`; non-positive scales yield zero.
    #[must_use]
    pub fn scaled_pace(&self, scale: f64) -> Duration {
        if scale <= 0.0 {
            Duration::ZERO
        } else {
            self.pace.mul_f64(scale)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Preparation(usize),
    CarHeader(usize),
    CarSystem { car: usize, system: usize },
    Done,
}

/// Ordered narration: preparation lines, then each car with its subsystems.
#[derive(Debug, Clone)]
pub struct NarrationScript {
    cursor: Cursor,
    emitted: usize,
}

impl Default for NarrationScript {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationScript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cursor: Cursor::Preparation(0),
            emitted: 0,
        }
    }

    /// Steps in a complete script.
    #[must_use]
    pub fn total_steps() -> usize {
        PREPARATION.len()
            + CarRole::ALL
                .iter()
                .map(|role| 1 + role.kind().tested_systems().len())
                .sum::<usize>()
    }

    /// Steps already produced.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor == Cursor::Done
    }

    fn after_car(car: usize) -> Cursor {
        if car + 1 < CarRole::ALL.len() {
            Cursor::CarHeader(car + 1)
        } else {
            Cursor::Done
        }
    }
}

impl Iterator for NarrationScript {
    type Item = ScriptStep;

    fn next(&mut self) -> Option<ScriptStep> {
        loop {
            let (step, next) = match self.cursor {
                Cursor::Preparation(i) => {
                    let (text, pace) = PREPARATION[i];
                    let next = if i + 1 < PREPARATION.len() {
                        Cursor::Preparation(i + 1)
                    } else {
                        Cursor::CarHeader(0)
                    };
                    (Some(ScriptStep::step(text, pace)), next)
                }
                Cursor::CarHeader(car) => {
                    let role = CarRole::ALL[car];
                    (
                        Some(ScriptStep::step(format!("Testing {role} Car"), CAR_PACE_MS)),
                        Cursor::CarSystem { car, system: 0 },
                    )
                }
                Cursor::CarSystem { car, system } => {
                    let systems = CarRole::ALL[car].kind().tested_systems();
                    match systems.get(system) {
                        Some(name) => (
                            Some(ScriptStep::step(system_line(name), SYSTEM_PACE_MS)),
                            Cursor::CarSystem {
                                car,
                                system: system + 1,
                            },
                        ),
                        None => (None, Self::after_car(car)),
                    }
                }
                Cursor::Done => return None,
            };

            self.cursor = next;
            if let Some(step) = step {
                self.emitted += 1;
                return Some(step);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = Self::total_steps() - self.emitted;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NarrationScript {}
impl FusedIterator for NarrationScript {}

fn system_line(system: &str) -> String {
    match catalog::section_of(system) {
        Some(section) => format!("Testing {system} (Section {section})"),
        None => format!("Testing {system}"),
    }
}
