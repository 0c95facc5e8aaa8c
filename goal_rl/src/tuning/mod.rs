//! Random-search hyperparameter tuning.

pub mod search_space;
pub mod study;

pub use search_space::{NetArch, SearchSpace, TrialParams};
pub use study::{Direction, Study, StudyReport, Trial, TuneError};
