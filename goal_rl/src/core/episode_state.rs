//! Episode outcome classification and per-environment episode tracking.
//!
//! Off-policy targets must distinguish two ways an episode can end:
//!
//! - **Terminal**: the task truly ended (all subtasks complete, absorbing
//!   state). Bootstrap value is 0 because no future rewards exist.
//! - **Truncated**: an external step limit cut the episode short. The task
//!   semantically continues, so targets still bootstrap from V(s').
//!
//! Manipulation tasks with sparse -1/0 rewards are almost always
//! truncation-only: treating the time limit as terminal would teach the
//! critic that episodes near the horizon are worthless, which poisons the
//! value estimates HER relies on.

/// Classification of how (or whether) an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodeOutcome {
    /// Episode is ongoing.
    Running,
    /// Episode reached an absorbing state; bootstrap value is 0.
    Terminal,
    /// Episode hit an external limit; bootstrap from V(s').
    Truncated,
}

impl EpisodeOutcome {
    /// Build from terminal/truncated flags. Terminal wins if both are set.
    #[inline]
    pub fn from_flags(terminal: bool, truncated: bool) -> Self {
        if terminal {
            Self::Terminal
        } else if truncated {
            Self::Truncated
        } else {
            Self::Running
        }
    }

    /// Whether TD targets should bootstrap from the next state value.
    #[inline]
    pub fn needs_bootstrap(&self) -> bool {
        !matches!(self, Self::Terminal)
    }

    /// Whether the episode ended for any reason.
    #[inline]
    pub fn is_done(&self) -> bool {
        !matches!(self, Self::Running)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    #[inline]
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated)
    }
}

/// Summary of one finished episode, reported by collection loops.
#[derive(Debug, Clone, Copy)]
pub struct FinishedEpisode {
    /// Undiscounted sum of rewards.
    pub total_reward: f32,
    /// Number of steps taken.
    pub length: u32,
    /// Success flag at the final step.
    pub success: bool,
    /// How the episode ended.
    pub outcome: EpisodeOutcome,
}

/// Per-environment accumulator for episode returns and lengths.
///
/// Collection loops call [`add_step`](EpisodeTracker::add_step) every step
/// and [`finish`](EpisodeTracker::finish) when an environment reports done;
/// `finish` returns the completed episode summary and clears the slot.
#[derive(Debug, Clone)]
pub struct EpisodeTracker {
    returns: Vec<f32>,
    lengths: Vec<u32>,
}

impl EpisodeTracker {
    /// Create a tracker for `n_envs` environments.
    pub fn new(n_envs: usize) -> Self {
        Self {
            returns: vec![0.0; n_envs],
            lengths: vec![0; n_envs],
        }
    }

    /// Record one step's reward for environment `idx`.
    #[inline]
    pub fn add_step(&mut self, idx: usize, reward: f32) {
        self.returns[idx] += reward;
        self.lengths[idx] += 1;
    }

    /// Close out the episode for environment `idx`.
    pub fn finish(&mut self, idx: usize, success: bool, outcome: EpisodeOutcome) -> FinishedEpisode {
        let episode = FinishedEpisode {
            total_reward: self.returns[idx],
            length: self.lengths[idx],
            success,
            outcome,
        };
        self.returns[idx] = 0.0;
        self.lengths[idx] = 0;
        episode
    }

    /// Running return of the in-progress episode for environment `idx`.
    pub fn current_return(&self, idx: usize) -> f32 {
        self.returns[idx]
    }

    /// Length so far of the in-progress episode for environment `idx`.
    pub fn current_length(&self, idx: usize) -> u32 {
        self.lengths[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_flags() {
        assert_eq!(EpisodeOutcome::from_flags(false, false), EpisodeOutcome::Running);
        assert_eq!(EpisodeOutcome::from_flags(true, false), EpisodeOutcome::Terminal);
        assert_eq!(EpisodeOutcome::from_flags(false, true), EpisodeOutcome::Truncated);
        // Terminal takes precedence when both flags are set.
        assert_eq!(EpisodeOutcome::from_flags(true, true), EpisodeOutcome::Terminal);
    }

    #[test]
    fn test_outcome_bootstrap() {
        assert!(EpisodeOutcome::Running.needs_bootstrap());
        assert!(EpisodeOutcome::Truncated.needs_bootstrap());
        assert!(!EpisodeOutcome::Terminal.needs_bootstrap());
    }

    #[test]
    fn test_tracker_accumulates_and_clears() {
        let mut tracker = EpisodeTracker::new(2);

        tracker.add_step(0, -1.0);
        tracker.add_step(0, -1.0);
        tracker.add_step(0, 0.0);
        tracker.add_step(1, -1.0);

        let done = tracker.finish(0, true, EpisodeOutcome::Truncated);
        assert_eq!(done.total_reward, -2.0);
        assert_eq!(done.length, 3);
        assert!(done.success);

        // Slot 0 cleared, slot 1 untouched.
        assert_eq!(tracker.current_return(0), 0.0);
        assert_eq!(tracker.current_length(0), 0);
        assert_eq!(tracker.current_return(1), -1.0);
        assert_eq!(tracker.current_length(1), 1);
    }
}
