//! Rzutnik Domain - Core rules for the shared dice-rolling table.
//!
//! This crate holds everything with actual game-rule content:
//!
//! - `request` - untrusted roll requests and the sanitizer that clamps them
//! - `dice` - the injected die source abstraction (d10 pool)
//! - `roll` - the roll resolution engine (successes, explosions, bad luck)
//! - `history` - the bounded, newest-first session history store
//! - `visibility` - the policy deciding who sees which form of a result
//!
//! No I/O lives here. Randomness is injected via [`dice::DieSource`] so every
//! branch of the engine is reproducible with a scripted outcome sequence.

pub mod dice;
pub mod history;
pub mod request;
pub mod roll;
pub mod visibility;

pub use dice::{DieSource, ScriptedDice, DIE_FACES};
pub use history::{HistoryEntry, RedactedRollResult, SessionHistory, HISTORY_LIMIT};
pub use request::{sanitize, RollRequest, SanitizedRollRequest};
pub use roll::{resolve, ResultType, RollResult, MAX_CHAIN_ROLLS};
pub use visibility::{publish, Publication};
