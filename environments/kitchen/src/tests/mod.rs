//! Comprehensive tests for the kitchen environment.
//!
//! ## Organization
//!
//! - `completion_tests`: subtask completion, reward latching, termination
//! - `environment_tests`: scripted episodes through the full environment

pub mod completion_tests;
pub mod environment_tests;
