//! Post Garmin sleep records and quick notes as GitHub issue comments.
//!
//! The pure formatting and duplicate-detection logic lives in
//! [`sleeplog_core`]; this crate wires it to the two HTTP collaborators and
//! the command line.

pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod repo;

pub use error::Error;
