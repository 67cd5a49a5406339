//! Rzutnik Shared - Wire types between the engine and table clients.
//!
//! Pure data types and serialization, no business logic. Event names on the
//! wire (`roll:request`, `session:new`, `draw:*`, `history`, `roll:new`) are
//! the ones table clients already speak.

pub mod messages;

pub use messages::{ClientMessage, ServerMessage};
