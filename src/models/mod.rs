// Core data models for Dealflow
// These structs represent the domain entities

pub mod board;
pub mod card;
pub mod stage;

pub use board::*;
pub use card::*;
pub use stage::*;
