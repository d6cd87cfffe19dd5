//! Core data models for round pairing.

mod history;
mod ids;
mod player;
mod round;

pub use history::*;
pub use ids::*;
pub use player::*;
pub use round::*;
