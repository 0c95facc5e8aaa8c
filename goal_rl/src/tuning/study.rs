//! Random-search study over a hyperparameter space.
//!
//! The search itself is deliberately simple: sample, evaluate, keep the best.
//! The interesting part is the objective, which trains and evaluates a
//! short-run agent per trial; see the tuning driver binaries.

use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use super::search_space::{SearchSpace, TrialParams};

/// Whether larger or smaller objective values win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Maximize,
    Minimize,
}

/// One completed objective evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Trial {
    pub number: usize,
    pub params: TrialParams,
    pub value: f64,
    pub elapsed_secs: f64,
}

/// Study failures.
#[derive(Debug)]
pub enum TuneError {
    Io(io::Error),
    Serialize(serde_json::Error),
    /// Report requested before any trial completed.
    NoTrials,
}

impl fmt::Display for TuneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuneError::Io(e) => write!(f, "IO error: {}", e),
            TuneError::Serialize(e) => write!(f, "serialization error: {}", e),
            TuneError::NoTrials => write!(f, "study has no completed trials"),
        }
    }
}

impl Error for TuneError {}

impl From<io::Error> for TuneError {
    fn from(e: io::Error) -> Self {
        TuneError::Io(e)
    }
}

impl From<serde_json::Error> for TuneError {
    fn from(e: serde_json::Error) -> Self {
        TuneError::Serialize(e)
    }
}

/// Everything a finished study knows, in one serializable block.
#[derive(Debug, Clone, Serialize)]
pub struct StudyReport {
    pub direction: Direction,
    pub n_trials: usize,
    pub best: Trial,
    pub trials: Vec<Trial>,
}

/// Random-search hyperparameter study.
pub struct Study {
    direction: Direction,
    space: SearchSpace,
    trials: Vec<Trial>,
    rng: fastrand::Rng,
}

impl Study {
    pub fn maximize(space: SearchSpace) -> Self {
        Self {
            direction: Direction::Maximize,
            space,
            trials: Vec::new(),
            rng: fastrand::Rng::with_seed(0),
        }
    }

    pub fn minimize(space: SearchSpace) -> Self {
        Self {
            direction: Direction::Minimize,
            ..Self::maximize(space)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Run up to `n_trials` objective evaluations, stopping early when the
    /// wall-clock `timeout` elapses. The objective receives the trial number
    /// and sampled parameters and returns the value to optimize.
    pub fn optimize<F>(&mut self, n_trials: usize, timeout: Option<Duration>, mut objective: F)
    where
        F: FnMut(usize, &TrialParams) -> f64,
    {
        let start = Instant::now();

        for _ in 0..n_trials {
            if let Some(limit) = timeout {
                if start.elapsed() >= limit {
                    println!(
                        "Study timeout after {} trials ({:.0}s)",
                        self.trials.len(),
                        start.elapsed().as_secs_f32()
                    );
                    break;
                }
            }

            let number = self.trials.len();
            let params = self.space.sample(&mut self.rng);
            let trial_start = Instant::now();
            let value = objective(number, &params);

            let trial = Trial {
                number,
                params,
                value,
                elapsed_secs: trial_start.elapsed().as_secs_f64(),
            };

            let is_best = match self.best_trial() {
                None => true,
                Some(best) => match self.direction {
                    Direction::Maximize => trial.value > best.value,
                    Direction::Minimize => trial.value < best.value,
                },
            };
            println!(
                "Trial {:>3}: value {:.4} (lr {:.2e}, {:?}){}",
                trial.number,
                trial.value,
                trial.params.learning_rate,
                trial.params.net_arch,
                if is_best { "  <- best" } else { "" }
            );

            self.trials.push(trial);
        }
    }

    /// The winning trial so far, by the study direction.
    pub fn best_trial(&self) -> Option<&Trial> {
        match self.direction {
            Direction::Maximize => self
                .trials
                .iter()
                .max_by(|a, b| a.value.total_cmp(&b.value)),
            Direction::Minimize => self
                .trials
                .iter()
                .min_by(|a, b| a.value.total_cmp(&b.value)),
        }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn report(&self) -> Result<StudyReport, TuneError> {
        let best = self.best_trial().ok_or(TuneError::NoTrials)?.clone();

        Ok(StudyReport {
            direction: self.direction,
            n_trials: self.trials.len(),
            best,
            trials: self.trials.clone(),
        })
    }

    /// Serialize the full report to pretty JSON at `path`.
    pub fn save_report(&self, path: &Path) -> Result<(), TuneError> {
        let report = self.report()?;
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::search_space::NetArch;

    #[test]
    fn test_maximize_picks_largest_value() {
        let mut study = Study::maximize(SearchSpace::new()).with_seed(42);
        study.optimize(10, None, |_, params| params.learning_rate);

        let best = study.best_trial().unwrap();
        for trial in study.trials() {
            assert!(best.value >= trial.value);
        }
        assert_eq!(study.trials().len(), 10);
    }

    #[test]
    fn test_minimize_picks_smallest_value() {
        let mut study = Study::minimize(SearchSpace::new()).with_seed(42);
        study.optimize(10, None, |_, params| params.learning_rate);

        let best = study.best_trial().unwrap();
        for trial in study.trials() {
            assert!(best.value <= trial.value);
        }
    }

    #[test]
    fn test_zero_timeout_stops_immediately() {
        let mut study = Study::maximize(SearchSpace::new());
        study.optimize(100, Some(Duration::ZERO), |_, _| {
            panic!("objective must not run after timeout")
        });

        assert!(study.trials().is_empty());
        assert!(matches!(study.report(), Err(TuneError::NoTrials)));
    }

    #[test]
    fn test_trial_numbers_continue_across_calls() {
        let mut study = Study::maximize(SearchSpace::new()).with_seed(1);
        study.optimize(3, None, |_, _| 0.0);
        study.optimize(2, None, |_, _| 1.0);

        let numbers: Vec<usize> = study.trials().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_report_roundtrips_to_json() {
        let mut study = Study::maximize(
            SearchSpace::new().with_architectures(&[NetArch::Medium]),
        )
        .with_seed(7);
        study.optimize(4, None, |number, _| number as f64);

        let report = study.report().unwrap();
        assert_eq!(report.n_trials, 4);
        assert_eq!(report.best.number, 3);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"Medium\""));
        assert!(json.contains("\"n_trials\":4"));
    }

    #[test]
    fn test_save_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("study.json");

        let mut study = Study::maximize(SearchSpace::new()).with_seed(5);
        study.optimize(2, None, |_, params| params.learning_rate);
        study.save_report(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"best\""));
        assert!(text.contains("\"Maximize\""));
    }
}
