//! Microwave subtask training with SAC.
//!
//! Kitchen rewards pay a bonus the first time a subtask completes, so the
//! step reward is not a pure function of the achieved/desired goal pair and
//! hindsight relabeling stays off; plain uniform replay with SAC's
//! entropy-driven exploration handles the single-subtask setup. The trainer
//! checkpoints periodically into `models/kitchen/`, tracking the best
//! snapshot by the rolling rollout success rate, which is what the
//! evaluation driver loads.
//!
//! Run with: `cargo run --release -- train-kitchen`

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend;
use parking_lot::Mutex;

use goal_rl::{
    CheckpointConfig, Checkpointer, ConsoleLogger, CsvLogger, HerConfig, MetricsLogger, MlpActor,
    MlpActorConfig, MlpCritic, MlpCriticConfig, MultiLogger, OffPolicyTrainer, SacConfig,
    SacRule, TrainerConfig, TrainingSnapshot,
};
use kitchen_env::KitchenConfig;

type B = Autodiff<NdArray<f32>>;

// Kitchen: 27 obs dims + 1 goal dim for the single microwave subtask.
const INPUT: usize = 28;
const ACTIONS: usize = 3;
const HIDDEN: (usize, usize) = (256, 256);

const MODEL_DIR: &str = "models/kitchen";
const CSV_PATH: &str = "train_kitchen.csv";
const MAX_ENV_STEPS: usize = 150_000;
const SEED: u64 = 3;

pub fn run() {
    println!("=== Kitchen Microwave Training (SAC) ===");
    println!();

    let config = TrainerConfig::new()
        .with_n_actors(2)
        .with_n_envs_per_actor(8)
        .with_warmup_env_steps(2_000)
        .with_max_env_steps(MAX_ENV_STEPS)
        .with_seed(SEED)
        .with_buffer(HerConfig::new().with_her(false))
        .with_checkpoint(CheckpointConfig::new(MODEL_DIR).with_save_interval(5_000));

    println!("Configuration:");
    println!(
        "  Actors: {} x {} envs = {} total",
        config.n_actors,
        config.n_envs_per_actor,
        config.n_actors * config.n_envs_per_actor
    );
    println!("  Env steps: {}", config.max_env_steps);
    println!("  Replay: uniform, no relabeling");
    println!("  Checkpoints: every 5000 gradient steps into {}", MODEL_DIR);
    println!();

    let trainer = OffPolicyTrainer::<B>::new(config);
    let device = Default::default();

    let actor = MlpActorConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .stochastic()
        .init(&device);
    let critic = MlpCriticConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .twin()
        .init(&device);
    let (actor_opt, critic_opt) = trainer.create_optimizers::<MlpActor<B>, MlpCritic<B>>();

    let logger = Mutex::new(
        MultiLogger::new()
            .add(ConsoleLogger::new(500))
            .add(CsvLogger::new(CSV_PATH).expect("Failed to create CSV log")),
    );

    println!("Starting training...");
    println!();

    let outcome = trainer.run(
        SacRule::new(SacConfig::new(), ACTIONS),
        |device: &<B as Backend>::Device| {
            MlpActorConfig::new(INPUT, ACTIONS)
                .with_hidden_sizes(HIDDEN)
                .stochastic()
                .init(device)
        },
        actor,
        critic,
        |actor_id, n_envs| {
            KitchenConfig::microwave(n_envs)
                .with_seed(SEED + actor_id as u64)
                .build()
                .expect("Failed to build kitchen environment")
        },
        actor_opt,
        critic_opt,
        |stats| logger.lock().log(&TrainingSnapshot::from_stats(stats)),
    );
    logger.lock().flush();

    println!();
    println!(
        "Training finished: {} env steps, {} gradient steps, {} episodes",
        outcome.stats.env_steps, outcome.stats.train_steps, outcome.stats.episodes
    );
    println!(
        "  Success rate: {:.1}%  mean return: {:.2}  alpha: {:.3}",
        outcome.stats.success_rate * 100.0,
        outcome.stats.mean_return,
        outcome.stats.alpha
    );

    // Final numbered snapshot. No metric here: best_policy.bin already
    // tracks the best interval checkpoint and a fresh checkpointer would
    // overwrite it unconditionally.
    let mut checkpointer = Checkpointer::new(CheckpointConfig::new(MODEL_DIR))
        .expect("Failed to open model directory");
    let saved = checkpointer
        .save(outcome.stats.train_steps, &outcome.actor.valid(), None)
        .expect("Failed to save policy");
    println!("  Final policy saved to {}", saved.display());
    println!("  Checkpoints in {}", MODEL_DIR);
    println!("  Metrics written to {}", CSV_PATH);
}
