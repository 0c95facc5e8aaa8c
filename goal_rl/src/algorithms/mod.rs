//! Off-policy actor-critic algorithms for goal-conditioned control.
//!
//! Three update rules share one set of network abstractions:
//!
//! | Rule | Actor | Critic | Exploration |
//! |------|-------|--------|-------------|
//! | [`DdpgRule`] | deterministic | single head | Gaussian noise |
//! | [`Td3Rule`] | deterministic | twin | Gaussian noise |
//! | [`SacRule`] | squashed Gaussian | twin | policy sampling |
//!
//! The training loop drives whichever rule it is given through the
//! [`UpdateRule`] trait; networks are built from [`MlpActorConfig`] and
//! [`MlpCriticConfig`] or supplied as custom [`GoalActor`] / [`GoalCritic`]
//! implementations.

pub mod actor;
pub mod continuous_policy;
pub mod critic;
pub mod ddpg;
pub mod mlp;
pub mod sac;
pub mod td3;
pub mod update;

pub use actor::{GoalActor, GoalActorOutput, GoalActorTraining};
pub use continuous_policy::{
    clamp_log_std, entropy_gaussian, log_prob_squashed_gaussian, sample_gaussian,
    sample_squashed_gaussian, scale_action, unscale_action, LOG_STD_MAX, LOG_STD_MIN,
};
pub use critic::{bootstrap_targets, GoalCritic, GoalCriticOutput, GoalCriticTraining};
pub use ddpg::{DdpgConfig, DdpgRule};
pub use mlp::{MlpActor, MlpActorConfig, MlpCritic, MlpCriticConfig};
pub use sac::{target_entropy_continuous, EntropyTuner, SacConfig, SacRule};
pub use td3::{Td3Config, Td3Rule};
pub use update::{Exploration, LossInfo, Optimizers, UpdateModels, UpdateRule};
