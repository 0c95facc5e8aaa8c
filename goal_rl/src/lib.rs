//! # goal_rl: Off-Policy RL for Goal-Conditioned Manipulation
//!
//! Training library for goal-conditioned continuous-control tasks: DDPG, TD3,
//! and SAC with hindsight experience replay, a threaded collect/learn runner,
//! evaluation and hyperparameter-search drivers, and chart rendering.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      OffPolicyTrainer                            │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  Thread 1          Thread N                                      │
//! │  ┌──────────┐      ┌──────────┐                                  │
//! │  │Collector │      │Collector │   episodes                       │
//! │  │ M envs   │ ...  │ M envs   │ ────────────┐                    │
//! │  │ inference│      │ inference│             ▼                    │
//! │  └────┬─────┘      └────┬─────┘   ┌──────────────────┐           │
//! │       │   weights       │         │ HerReplayBuffer  │           │
//! │       └────────┬────────┘         │ (episode ring +  │           │
//! │                ▲                  │  goal relabeling)│           │
//! │        ┌───────┴───────┐         └────────┬─────────┘            │
//! │        │  PolicySlot   │                  ▼                      │
//! │        │ (latest-wins) │◄─────── ┌─────────────────┐             │
//! │        └───────────────┘ publish │ Learner thread  │             │
//! │                                  │ (UpdateRule:    │             │
//! │                                  │  DDPG/TD3/SAC)  │             │
//! │                                  └─────────────────┘             │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Collectors run an inference copy of the actor on the inner (non-autodiff)
//! backend and push whole episodes, since hindsight relabeling needs episode
//! structure. The learner samples relabeled batches and publishes refreshed
//! weights through a latest-wins byte slot.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use goal_rl::{
//!     HerConfig, MlpActorConfig, MlpCriticConfig, OffPolicyTrainer, SacConfig, SacRule,
//!     TrainerConfig,
//! };
//!
//! let config = TrainerConfig::new()
//!     .with_n_actors(2)
//!     .with_n_envs_per_actor(8)
//!     .with_buffer(HerConfig::new().with_n_sampled_goal(4))
//!     .with_max_env_steps(100_000);
//!
//! let trainer = OffPolicyTrainer::<B>::new(config);
//! let (actor_opt, critic_opt) = trainer.create_optimizers::<Actor, Critic>();
//! let outcome = trainer.run(
//!     SacRule::new(SacConfig::new(), action_dim),
//!     actor_factory, actor, critic, env_factory,
//!     actor_opt, critic_opt, |stats| println!("{:?}", stats),
//! );
//! ```

pub mod algorithms;
pub mod checkpoint;
pub mod core;
pub mod environment;
pub mod metrics;
pub mod nn;
pub mod replay;
pub mod runners;
pub mod tuning;

// Environment abstraction
pub use environment::{
    GoalEnv, GoalRewardFn, GoalStepResult, RewardScalingWrapper, TimeLimitWrapper,
};

// Actor/critic seams and reference networks
pub use algorithms::{
    bootstrap_targets, entropy_gaussian, scale_action, unscale_action, DdpgConfig, DdpgRule,
    EntropyTuner, Exploration, GoalActor, GoalActorOutput, GoalActorTraining, GoalCritic,
    GoalCriticOutput, GoalCriticTraining, LossInfo, MlpActor, MlpActorConfig, MlpCritic,
    MlpCriticConfig, SacConfig, SacRule, Td3Config, Td3Rule, UpdateModels, UpdateRule,
};

// Replay with hindsight relabeling
pub use replay::{
    GoalBatch, GoalEpisode, GoalSelectionStrategy, GoalTransition, HerConfig, HerReplayBuffer,
};

// Shared runner state
pub use core::{
    policy_slot, policy_slot_with, EpisodeOutcome, EpisodeTracker, FinishedEpisode, PolicySlot,
    RunningScalarStats, SharedPolicySlot, TargetNetworkConfig, TargetNetworkManager,
};

// Training and evaluation drivers
pub use runners::{
    evaluate, evaluate_random, EvaluationConfig, EvaluationReport, OffPolicyTrainer,
    TrainOutcome, TrainerConfig, TrainerStats,
};

// Hyperparameter search
pub use tuning::{NetArch, SearchSpace, Study, StudyReport, Trial, TrialParams, TuneError};

// Metrics and charts
pub use metrics::{
    plot_rewards, plot_success_rate, plot_trajectory, ConsoleLogger, CsvLogger, MetricsLogger,
    MultiLogger, PlotError, TrainingSnapshot,
};

// Policy persistence
pub use checkpoint::{CheckpointConfig, CheckpointError, Checkpointer, SnapshotInfo};
