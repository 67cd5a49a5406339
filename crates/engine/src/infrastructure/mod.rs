//! Adapters for injected dependencies.

pub mod dice;

pub use dice::ThreadRngDice;
