//! Die source abstraction.
//!
//! The table rolls a pool of ten-sided dice. All randomness is pulled through
//! [`DieSource`] so the resolution engine stays a pure function of its inputs:
//! production wires in a thread-RNG adapter, tests wire in [`ScriptedDice`]
//! with a fixed outcome sequence.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of faces on the table die.
pub const DIE_FACES: u8 = 10;

/// Source of independent die outcomes in `1..=DIE_FACES`.
pub trait DieSource: Send + Sync {
    /// Draw one die outcome.
    fn roll_die(&self) -> u8;

    /// Draw `n` independent die outcomes, in roll order.
    fn roll_set(&self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.roll_die()).collect()
    }
}

/// Die source that replays a fixed sequence of outcomes, cycling if needed.
///
/// Thread-safe via an atomic cursor, so it can stand in for the production
/// source behind an `Arc<dyn DieSource>`.
#[derive(Debug)]
pub struct ScriptedDice {
    values: Vec<u8>,
    index: AtomicUsize,
}

impl ScriptedDice {
    /// Create a scripted source with the given outcome sequence.
    ///
    /// Values outside `1..=DIE_FACES` are clamped into the valid face range.
    pub fn new(values: Vec<u8>) -> Self {
        Self {
            values: values.into_iter().map(|v| v.clamp(1, DIE_FACES)).collect(),
            index: AtomicUsize::new(0),
        }
    }

    /// Create a scripted source that always returns the same face.
    pub fn constant(value: u8) -> Self {
        Self::new(vec![value])
    }
}

impl DieSource for ScriptedDice {
    fn roll_die(&self) -> u8 {
        let idx = self.index.fetch_add(1, Ordering::SeqCst);
        self.values[idx % self.values.len()]
    }
}
