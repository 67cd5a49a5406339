//! Production die source backed by the thread-local RNG.

use rand::Rng;

use rzutnik_domain::{DieSource, DIE_FACES};

/// Uniform d10 outcomes from `rand::thread_rng()`.
pub struct ThreadRngDice;

impl DieSource for ThreadRngDice {
    fn roll_die(&self) -> u8 {
        rand::thread_rng().gen_range(1..=DIE_FACES)
    }
}
