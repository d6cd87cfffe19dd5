//! # Mexicano
//!
//! Round pairing for casual doubles padel and tennis sessions.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (players, teams, rounds, history)
//! - **config**: Configuration loading, validation and format resolution
//! - **pairing**: Strategy dispatch, pairing strategies and the round lifecycle
//! - **session**: Caller-owned tournament state built on the pairing engine
//! - **storage**: Filesystem persistence (JSON + JSONL)

pub mod config;
pub mod models;
pub mod pairing;
pub mod session;
pub mod storage;

pub use models::*;
