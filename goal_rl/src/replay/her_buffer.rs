//! Episode replay buffer with hindsight goal relabeling.
//!
//! Rollout workers push whole episodes through a lock-free queue; the learner
//! samples flat transition indices uniformly and, for a configurable fraction
//! of them, swaps the desired goal for one actually achieved later in the
//! same episode and recomputes the reward. Failed episodes thereby become
//! successful demonstrations of the goals they did reach, which is what makes
//! sparse-reward manipulation learnable at all.
//!
//! Relabeling happens at sample time, so each stored transition can serve
//! many different hindsight goals over the course of training.

use crossbeam_queue::SegQueue;
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::transition::{GoalBatch, GoalEpisode};
use crate::environment::GoalRewardFn;

// ============================================================================
// Goal selection
// ============================================================================

/// Where hindsight goals are drawn from within the source episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalSelectionStrategy {
    /// A state achieved at or after the sampled transition. The standard
    /// choice, and the only one that guarantees the goal was still reachable
    /// when the action was taken.
    #[default]
    Future,
    /// The state achieved at the end of the episode.
    Final,
    /// Any state achieved during the episode, including earlier ones.
    Episode,
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for [`HerReplayBuffer`].
#[derive(Debug, Clone)]
pub struct HerConfig {
    /// Maximum number of transitions to retain (oldest episodes evicted).
    pub capacity: usize,
    /// Minimum transitions before training starts.
    pub min_size: usize,
    /// Batch size for sampling.
    pub batch_size: usize,
    /// Virtual goals per real goal; the relabel fraction is `n / (n + 1)`.
    pub n_sampled_goal: usize,
    /// Hindsight goal selection strategy.
    pub strategy: GoalSelectionStrategy,
    /// Disable to fall back to plain uniform replay.
    pub her: bool,
}

impl Default for HerConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            min_size: 1_000,
            batch_size: 256,
            n_sampled_goal: 4,
            strategy: GoalSelectionStrategy::Future,
            her: true,
        }
    }
}

impl HerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_n_sampled_goal(mut self, n: usize) -> Self {
        self.n_sampled_goal = n;
        self
    }

    pub fn with_strategy(mut self, strategy: GoalSelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_her(mut self, enabled: bool) -> Self {
        self.her = enabled;
        self
    }

    /// Probability that a sampled transition gets a hindsight goal.
    pub fn relabel_fraction(&self) -> f32 {
        if !self.her || self.n_sampled_goal == 0 {
            0.0
        } else {
            self.n_sampled_goal as f32 / (self.n_sampled_goal as f32 + 1.0)
        }
    }
}

// ============================================================================
// Episode ring (internal)
// ============================================================================

/// Episode storage with a flat-index view over all transitions.
///
/// Evicts oldest episodes once the transition count exceeds capacity, always
/// keeping at least one episode. `cumulative[i]` holds the transition count
/// through episode `i`, so a flat index maps to its episode by binary search.
struct EpisodeRing {
    episodes: VecDeque<GoalEpisode>,
    cumulative: Vec<usize>,
    transitions: usize,
    capacity: usize,
}

impl EpisodeRing {
    fn new(capacity: usize) -> Self {
        Self {
            episodes: VecDeque::new(),
            cumulative: Vec::new(),
            transitions: 0,
            capacity,
        }
    }

    fn push(&mut self, episode: GoalEpisode) {
        self.transitions += episode.len();
        self.episodes.push_back(episode);

        while self.transitions > self.capacity && self.episodes.len() > 1 {
            if let Some(oldest) = self.episodes.pop_front() {
                self.transitions -= oldest.len();
            }
        }
    }

    fn rebuild_index(&mut self) {
        self.cumulative.clear();
        let mut total = 0;
        for episode in &self.episodes {
            total += episode.len();
            self.cumulative.push(total);
        }
    }

    /// Map a flat transition index to `(episode_index, offset)`.
    fn locate(&self, flat: usize) -> (usize, usize) {
        debug_assert!(flat < self.transitions);
        let episode_idx = self.cumulative.partition_point(|&count| count <= flat);
        let base = if episode_idx == 0 {
            0
        } else {
            self.cumulative[episode_idx - 1]
        };
        (episode_idx, flat - base)
    }

    fn clear(&mut self) {
        self.episodes.clear();
        self.cumulative.clear();
        self.transitions = 0;
    }
}

// ============================================================================
// HER replay buffer
// ============================================================================

/// Thread-safe episode replay buffer with hindsight relabeling.
///
/// Rollout workers push finished episodes concurrently through a lock-free
/// queue; pending episodes are folded into storage lazily when the learner
/// samples or checks readiness.
pub struct HerReplayBuffer {
    config: HerConfig,
    pending: SegQueue<GoalEpisode>,
    storage: RwLock<EpisodeRing>,
    size: AtomicUsize,
    pending_size: AtomicUsize,
}

impl HerReplayBuffer {
    pub fn new(config: HerConfig) -> Self {
        Self {
            pending: SegQueue::new(),
            storage: RwLock::new(EpisodeRing::new(config.capacity)),
            size: AtomicUsize::new(0),
            pending_size: AtomicUsize::new(0),
            config,
        }
    }

    /// Push a finished episode (lock-free). Empty episodes are dropped.
    pub fn push_episode(&self, episode: GoalEpisode) {
        if episode.is_empty() {
            return;
        }
        let count = episode.len();
        self.pending.push(episode);
        self.pending_size.fetch_add(count, Ordering::Release);
    }

    /// Sample a uniform random batch, relabeling the configured fraction.
    ///
    /// Returns `None` if the buffer holds fewer than `batch_size` transitions.
    pub fn sample(&self, batch_size: usize, reward_fn: &GoalRewardFn) -> Option<GoalBatch> {
        self.consolidate();

        let storage = self.storage.read();
        if storage.transitions < batch_size || batch_size == 0 {
            return None;
        }

        let probe = &storage.episodes[0].transitions()[0];
        let input_size = probe.obs_size() + probe.goal_size();
        let action_dim = probe.action_dim();
        let relabel_fraction = self.config.relabel_fraction();

        let mut batch = GoalBatch::with_capacity(batch_size, input_size, action_dim);
        for _ in 0..batch_size {
            let flat = fastrand::usize(..storage.transitions);
            let (episode_idx, offset) = storage.locate(flat);
            let episode = &storage.episodes[episode_idx];
            let transition = &episode.transitions()[offset];

            if relabel_fraction > 0.0 && fastrand::f32() < relabel_fraction {
                let goal = select_goal(episode, offset, self.config.strategy);
                let reward = reward_fn(&transition.next_achieved_goal, goal);
                batch.push(
                    &transition.observation,
                    &transition.next_observation,
                    goal,
                    &transition.action,
                    reward,
                    transition.terminal,
                );
            } else {
                batch.push(
                    &transition.observation,
                    &transition.next_observation,
                    &transition.desired_goal,
                    &transition.action,
                    transition.reward,
                    transition.terminal,
                );
            }
        }

        Some(batch)
    }

    /// Sample using the configured batch size.
    pub fn sample_batch(&self, reward_fn: &GoalRewardFn) -> Option<GoalBatch> {
        self.sample(self.config.batch_size, reward_fn)
    }

    /// Whether enough transitions are stored to start training.
    pub fn is_training_ready(&self) -> bool {
        self.consolidate();
        self.size.load(Ordering::Acquire) >= self.config.min_size.max(self.config.batch_size)
    }

    /// Fold pending episodes into storage.
    pub fn consolidate(&self) {
        let mut storage = self.storage.write();
        let mut drained = 0;

        while let Some(episode) = self.pending.pop() {
            drained += episode.len();
            storage.push(episode);
        }

        if drained > 0 {
            storage.rebuild_index();
            let pending = self.pending_size.load(Ordering::Acquire);
            self.pending_size.fetch_sub(drained.min(pending), Ordering::Release);
            self.size.store(storage.transitions, Ordering::Release);
        }
    }

    /// Consolidated transition count.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transitions pushed but not yet consolidated.
    pub fn pending_len(&self) -> usize {
        self.pending_size.load(Ordering::Relaxed)
    }

    /// Stored episode count (consolidated).
    pub fn episode_count(&self) -> usize {
        self.storage.read().episodes.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Fill level in `[0, 1]`.
    pub fn utilization(&self) -> f32 {
        self.len() as f32 / self.config.capacity as f32
    }

    pub fn clear(&self) {
        while self.pending.pop().is_some() {}
        self.pending_size.store(0, Ordering::Release);

        let mut storage = self.storage.write();
        storage.clear();
        self.size.store(0, Ordering::Release);
    }

    pub fn config(&self) -> &HerConfig {
        &self.config
    }
}

/// Pick a hindsight goal for the transition at `offset` within `episode`.
///
/// `Future` includes the transition's own outcome, so the last step of an
/// episode still has a valid choice.
fn select_goal(
    episode: &GoalEpisode,
    offset: usize,
    strategy: GoalSelectionStrategy,
) -> &[f32] {
    let transitions = episode.transitions();
    let idx = match strategy {
        GoalSelectionStrategy::Future => fastrand::usize(offset..transitions.len()),
        GoalSelectionStrategy::Final => transitions.len() - 1,
        GoalSelectionStrategy::Episode => fastrand::usize(..transitions.len()),
    };
    &transitions[idx].next_achieved_goal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::GoalTransition;
    use std::sync::Arc;

    /// Episode walking the achieved goal from `start` upward, one unit per
    /// step, while the desired goal stays out of reach.
    fn make_episode(start: f32, steps: usize) -> GoalEpisode {
        let mut episode = GoalEpisode::with_capacity(steps);
        for i in 0..steps {
            let pos = start + i as f32;
            episode.push(GoalTransition {
                observation: vec![pos, 0.0],
                achieved_goal: vec![pos],
                desired_goal: vec![100.0],
                action: vec![1.0],
                reward: -1.0,
                next_observation: vec![pos + 1.0, 0.0],
                next_achieved_goal: vec![pos + 1.0],
                terminal: false,
                truncated: i == steps - 1,
            });
        }
        episode
    }

    fn sparse_reward() -> GoalRewardFn {
        Arc::new(|achieved: &[f32], desired: &[f32]| {
            if (achieved[0] - desired[0]).abs() < 0.05 {
                0.0
            } else {
                -1.0
            }
        })
    }

    #[test]
    fn test_relabel_fraction() {
        assert!((HerConfig::new().relabel_fraction() - 0.8).abs() < 1e-6);
        assert_eq!(HerConfig::new().with_her(false).relabel_fraction(), 0.0);
        assert_eq!(HerConfig::new().with_n_sampled_goal(0).relabel_fraction(), 0.0);
        assert!((HerConfig::new().with_n_sampled_goal(1).relabel_fraction() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_push_and_consolidate_counts() {
        let buffer = HerReplayBuffer::new(HerConfig::new().with_capacity(100).with_min_size(10));

        buffer.push_episode(make_episode(0.0, 6));
        buffer.push_episode(make_episode(10.0, 4));

        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.pending_len(), 10);

        buffer.consolidate();

        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.pending_len(), 0);
        assert_eq!(buffer.episode_count(), 2);
        assert!(buffer.is_training_ready());
    }

    #[test]
    fn test_empty_episodes_dropped() {
        let buffer = HerReplayBuffer::new(HerConfig::new());
        buffer.push_episode(GoalEpisode::new());
        buffer.consolidate();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.episode_count(), 0);
    }

    #[test]
    fn test_capacity_evicts_oldest_episodes() {
        let buffer = HerReplayBuffer::new(HerConfig::new().with_capacity(10));

        for i in 0..5 {
            buffer.push_episode(make_episode(i as f32 * 10.0, 4));
        }
        buffer.consolidate();

        // 20 transitions pushed into capacity 10: oldest episodes gone.
        assert!(buffer.len() <= 10);
        assert_eq!(buffer.episode_count(), buffer.len() / 4);

        let storage = buffer.storage.read();
        let newest_start = storage.episodes.back().unwrap().transitions()[0].observation[0];
        assert_eq!(newest_start, 40.0);
    }

    #[test]
    fn test_oversized_episode_is_kept() {
        let buffer = HerReplayBuffer::new(HerConfig::new().with_capacity(5));
        buffer.push_episode(make_episode(0.0, 8));
        buffer.consolidate();
        // A single episode larger than capacity is retained whole.
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.episode_count(), 1);
    }

    #[test]
    fn test_locate_maps_flat_indices() {
        let mut ring = EpisodeRing::new(100);
        ring.push(make_episode(0.0, 3));
        ring.push(make_episode(10.0, 5));
        ring.rebuild_index();

        assert_eq!(ring.locate(0), (0, 0));
        assert_eq!(ring.locate(2), (0, 2));
        assert_eq!(ring.locate(3), (1, 0));
        assert_eq!(ring.locate(7), (1, 4));
    }

    #[test]
    fn test_sample_insufficient_returns_none() {
        let buffer = HerReplayBuffer::new(HerConfig::new());
        buffer.push_episode(make_episode(0.0, 4));
        assert!(buffer.sample(8, &sparse_reward()).is_none());
    }

    #[test]
    fn test_sample_shapes() {
        fastrand::seed(11);
        let buffer = HerReplayBuffer::new(HerConfig::new().with_min_size(8));
        buffer.push_episode(make_episode(0.0, 10));
        buffer.push_episode(make_episode(20.0, 10));

        let batch = buffer.sample(16, &sparse_reward()).unwrap();
        assert_eq!(batch.len(), 16);
        assert_eq!(batch.input_size(), 3); // 2 obs + 1 goal
        assert_eq!(batch.action_dim(), 1);
        assert_eq!(batch.inputs.len(), 16 * 3);
        assert_eq!(batch.actions.len(), 16);
    }

    #[test]
    fn test_final_strategy_relabels_to_reached_goal() {
        fastrand::seed(7);
        let config = HerConfig::new()
            .with_strategy(GoalSelectionStrategy::Final)
            .with_min_size(1);
        let buffer = HerReplayBuffer::new(config);
        buffer.push_episode(make_episode(0.0, 10));

        // Desired goal 100.0 is never reached, so every stored reward is -1.
        // Relabeling against the final achieved goal must produce some zero
        // rewards (the final transition reaches it exactly), and with an 80%
        // relabel fraction over 64 draws that is a near-certainty.
        let batch = buffer.sample(64, &sparse_reward()).unwrap();
        assert!(batch.rewards.iter().any(|&r| r == 0.0));
        assert!(batch.rewards.iter().all(|&r| r == 0.0 || r == -1.0));
    }

    #[test]
    fn test_disabled_her_keeps_stored_rewards() {
        fastrand::seed(7);
        let buffer = HerReplayBuffer::new(HerConfig::new().with_her(false).with_min_size(1));
        buffer.push_episode(make_episode(0.0, 10));

        let batch = buffer.sample(64, &sparse_reward()).unwrap();
        assert!(batch.rewards.iter().all(|&r| r == -1.0));
    }

    #[test]
    fn test_relabeled_goal_is_from_same_episode() {
        fastrand::seed(3);
        let config = HerConfig::new().with_min_size(1);
        let buffer = HerReplayBuffer::new(config);
        // Two episodes in disjoint goal ranges.
        buffer.push_episode(make_episode(0.0, 10)); // achieved in [1, 10]
        buffer.push_episode(make_episode(100.0, 10)); // achieved in [101, 110]

        let batch = buffer.sample(128, &sparse_reward()).unwrap();
        for i in 0..batch.len() {
            let obs_pos = batch.inputs[i * 3];
            let goal = batch.inputs[i * 3 + 2];
            if goal == 100.0 {
                continue; // original desired goal
            }
            // Hindsight goals stay within the source episode's range.
            if obs_pos < 50.0 {
                assert!((1.0..=10.0).contains(&goal), "goal {goal} for obs {obs_pos}");
            } else {
                assert!((101.0..=110.0).contains(&goal), "goal {goal} for obs {obs_pos}");
            }
        }
    }

    #[test]
    fn test_clear() {
        let buffer = HerReplayBuffer::new(HerConfig::new());
        buffer.push_episode(make_episode(0.0, 5));
        buffer.consolidate();
        buffer.push_episode(make_episode(5.0, 5));

        buffer.clear();
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.pending_len(), 0);
        assert!(!buffer.is_training_ready());
    }

    #[test]
    fn test_utilization() {
        let buffer = HerReplayBuffer::new(HerConfig::new().with_capacity(100));
        buffer.push_episode(make_episode(0.0, 50));
        buffer.consolidate();
        assert!((buffer.utilization() - 0.5).abs() < 0.01);
    }
}
