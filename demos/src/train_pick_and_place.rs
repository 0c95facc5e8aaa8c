//! Pick-and-place training with DDPG and hindsight relabeling.
//!
//! The sparse -1/0 reward makes plain DDPG hopeless on this task: a random
//! arm almost never places the object within the success threshold, so the
//! critic never sees anything but -1. Hindsight relabeling turns every
//! failed episode into a demonstration of the goals it did reach, which is
//! the classic recipe that makes the task learnable.
//!
//! Training metrics stream to the console and to a CSV file; the finished
//! policy lands under `models/pick_and_place/` for the evaluation driver.
//!
//! Run with: `cargo run --release -- train-pick-and-place`

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend;
use parking_lot::Mutex;

use fetch_env::FetchConfig;
use goal_rl::{
    CheckpointConfig, Checkpointer, ConsoleLogger, CsvLogger, DdpgConfig, DdpgRule, HerConfig,
    MetricsLogger, MlpActor, MlpActorConfig, MlpCritic, MlpCriticConfig, MultiLogger,
    OffPolicyTrainer, TrainerConfig, TrainingSnapshot,
};

type B = Autodiff<NdArray<f32>>;

// PickAndPlace: 17 obs dims + 3 goal dims, 4 action dims.
const INPUT: usize = 20;
const ACTIONS: usize = 4;
const HIDDEN: (usize, usize) = (256, 256);

const MODEL_DIR: &str = "models/pick_and_place";
const CSV_PATH: &str = "train_pick_and_place.csv";
const MAX_ENV_STEPS: usize = 100_000;
const SEED: u64 = 42;

pub fn run() {
    println!("=== Pick-and-Place Training (DDPG + HER) ===");
    println!();

    let her = HerConfig::new()
        .with_n_sampled_goal(4)
        .with_batch_size(256)
        .with_min_size(1_000);

    let config = TrainerConfig::new()
        .with_n_actors(2)
        .with_n_envs_per_actor(8)
        .with_warmup_env_steps(1_000)
        .with_max_env_steps(MAX_ENV_STEPS)
        .with_seed(SEED)
        .with_buffer(her);

    println!("Configuration:");
    println!(
        "  Actors: {} x {} envs = {} total",
        config.n_actors,
        config.n_envs_per_actor,
        config.n_actors * config.n_envs_per_actor
    );
    println!("  Env steps: {}", config.max_env_steps);
    println!("  Relabeling: future strategy, 4 virtual goals per real goal");
    println!("  Exploration noise: 0.1");
    println!();

    let trainer = OffPolicyTrainer::<B>::new(config);
    let device = Default::default();

    let actor = MlpActorConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .init(&device);
    let critic = MlpCriticConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
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
        DdpgRule::new(DdpgConfig::new().with_exploration_sigma(0.1)),
        |device: &<B as Backend>::Device| {
            MlpActorConfig::new(INPUT, ACTIONS)
                .with_hidden_sizes(HIDDEN)
                .init(device)
        },
        actor,
        critic,
        |actor_id, n_envs| {
            FetchConfig::pick_and_place(n_envs)
                .with_seed(SEED + actor_id as u64)
                .build()
                .expect("Failed to build pick-and-place environment")
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
        "  Success rate: {:.1}%  mean return: {:.2}",
        outcome.stats.success_rate * 100.0,
        outcome.stats.mean_return
    );

    let mut checkpointer = Checkpointer::new(CheckpointConfig::new(MODEL_DIR))
        .expect("Failed to create model directory");
    let saved = checkpointer
        .save(
            outcome.stats.env_steps,
            &outcome.actor.valid(),
            Some(outcome.stats.success_rate),
        )
        .expect("Failed to save policy");
    println!("  Policy saved to {}", saved.display());
    println!("  Metrics written to {}", CSV_PATH);
}
