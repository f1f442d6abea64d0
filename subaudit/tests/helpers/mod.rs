//! Test Helper Utilities
//!
//! Shared utilities for testing subaudit

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;

pub use fixtures::{created_at, ContestantFixture};
pub use log_capture::{capture_logs, LogCapture};
