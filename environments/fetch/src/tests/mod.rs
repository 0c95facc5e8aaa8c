//! Comprehensive tests for the manipulation task suite.
//!
//! ## Organization
//!
//! - `kinematics_tests`: gripper control, grasp rule, slide push rule
//! - `environment_tests`: construction, resets, goal distributions, noise
//! - `reward_tests`: reward stacks observed through the environment
//! - `termination_tests`: horizon truncation and success flags

pub mod environment_tests;
pub mod termination_tests;
