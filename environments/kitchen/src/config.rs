//! Task selection and environment configuration.

use crate::constants::{
    target_band, ApplianceSpec, APPLIANCES, DEFAULT_HORIZON, NUM_APPLIANCES,
};
use crate::env::KitchenEnv;

/// One appliance subtask in the kitchen scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KitchenTask {
    Microwave,
    Kettle,
    LightSwitch,
    SlideCabinet,
    HingeCabinet,
    BottomBurner,
    TopBurner,
}

impl KitchenTask {
    /// Every subtask, in appliance table order.
    pub const ALL: [KitchenTask; NUM_APPLIANCES] = [
        KitchenTask::Microwave,
        KitchenTask::Kettle,
        KitchenTask::LightSwitch,
        KitchenTask::SlideCabinet,
        KitchenTask::HingeCabinet,
        KitchenTask::BottomBurner,
        KitchenTask::TopBurner,
    ];

    /// Index into the appliance tables.
    pub fn index(self) -> usize {
        match self {
            KitchenTask::Microwave => 0,
            KitchenTask::Kettle => 1,
            KitchenTask::LightSwitch => 2,
            KitchenTask::SlideCabinet => 3,
            KitchenTask::HingeCabinet => 4,
            KitchenTask::BottomBurner => 5,
            KitchenTask::TopBurner => 6,
        }
    }

    /// Static joint and handle description of this appliance.
    pub fn spec(self) -> &'static ApplianceSpec {
        &APPLIANCES[self.index()]
    }

    /// Completion band half-width of this appliance.
    pub fn band(self) -> f32 {
        target_band(self.index())
    }

    /// Snake-case identifier used in logs and artifact names.
    pub fn name(self) -> &'static str {
        match self {
            KitchenTask::Microwave => "microwave",
            KitchenTask::Kettle => "kettle",
            KitchenTask::LightSwitch => "light_switch",
            KitchenTask::SlideCabinet => "slide_cabinet",
            KitchenTask::HingeCabinet => "hinge_cabinet",
            KitchenTask::BottomBurner => "bottom_burner",
            KitchenTask::TopBurner => "top_burner",
        }
    }
}

/// Configuration for [`KitchenEnv`].
///
/// The order of `tasks_to_complete` fixes the layout of the achieved and
/// desired goal vectors.
#[derive(Clone, Debug)]
pub struct KitchenConfig {
    /// Subtasks the episode must complete, in goal vector order.
    pub tasks_to_complete: Vec<KitchenTask>,
    /// Number of parallel environment instances.
    pub n_envs: usize,
    /// Steps before an episode truncates.
    pub horizon: usize,
    /// Base seed for the per-instance reset RNG streams.
    pub seed: u64,
}

impl KitchenConfig {
    pub fn new(tasks_to_complete: Vec<KitchenTask>, n_envs: usize) -> Self {
        Self {
            tasks_to_complete,
            n_envs,
            horizon: DEFAULT_HORIZON,
            seed: 0,
        }
    }

    /// The single-subtask setup the training drivers use.
    pub fn microwave(n_envs: usize) -> Self {
        Self::new(vec![KitchenTask::Microwave], n_envs)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Flattened observation width: arm pose (6), all joints and joint
    /// velocities (14), and the per-appliance target channel (7).
    pub fn obs_size(&self) -> usize {
        3 + 3 + NUM_APPLIANCES + NUM_APPLIANCES + NUM_APPLIANCES
    }

    /// Goal vector width, one component per selected subtask.
    pub fn goal_size(&self) -> usize {
        self.tasks_to_complete.len()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.n_envs == 0 {
            return Err("n_envs must be at least 1".to_string());
        }
        if self.horizon == 0 {
            return Err("horizon must be at least 1".to_string());
        }
        if self.tasks_to_complete.is_empty() {
            return Err("tasks_to_complete must not be empty".to_string());
        }
        let mut seen = [false; NUM_APPLIANCES];
        for task in &self.tasks_to_complete {
            if seen[task.index()] {
                return Err(format!("duplicate task: {}", task.name()));
            }
            seen[task.index()] = true;
        }
        Ok(())
    }

    /// Validate and construct the environment.
    pub fn build(self) -> Result<KitchenEnv, String> {
        KitchenEnv::from_config(self)
    }
}
