//! Dealflow - a command-line deal pipeline board with weighted forecasting
//!
//! This library provides the core functionality for Dealflow, including:
//! - Data models for the board, its stages, and its deal cards
//! - The board store, owner of all in-memory board mutations
//! - The probability-weighted pipeline forecast engine
//! - Remote-store schema and the persistence adapter over it
//! - The sync coordinator: snapshot hydration, background remote loads,
//!   and fire-and-forget remote mirroring of local edits
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use dealflow::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;
pub mod repo;
pub mod snapshot;
pub mod store;
pub mod sync;
