//! Training and evaluation drivers.
//!
//! [`OffPolicyTrainer`] runs the threaded collect/learn loop for any
//! [`crate::algorithms::UpdateRule`]; [`evaluate`] and [`evaluate_random`]
//! measure a finished policy.

pub mod config;
pub mod evaluation;
pub mod trainer;

pub use config::{TrainerConfig, TrainerStats};
pub use evaluation::{evaluate, evaluate_random, EvaluationConfig, EvaluationReport};
pub use trainer::{OffPolicyTrainer, TrainOutcome};
