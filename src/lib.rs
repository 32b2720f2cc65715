//! MATCHDAY — match prediction cards
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod catalog;
pub mod notify;
pub mod card;
pub mod board;
pub mod dashboard;
