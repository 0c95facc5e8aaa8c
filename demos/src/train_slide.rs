//! Slide training with DDPG and hindsight relabeling.
//!
//! Slide is the hardest fetch task: the goal sits outside the reachable
//! workspace, so the arm gets exactly one shot at hitting the puck with the
//! right momentum. The run is configured accordingly: more env steps than
//! pick-and-place, wider exploration noise so random pushes actually happen,
//! and an early stop once the recent success rate clears 90%.
//!
//! Run with: `cargo run --release -- train-slide`

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

// Slide: 17 obs dims + 3 goal dims, 4 action dims.
const INPUT: usize = 20;
const ACTIONS: usize = 4;
const HIDDEN: (usize, usize) = (256, 256);

const MODEL_DIR: &str = "models/slide";
const CSV_PATH: &str = "train_slide.csv";
const MAX_ENV_STEPS: usize = 200_000;
const SEED: u64 = 44;

pub fn run() {
    println!("=== Slide Training (DDPG + HER) ===");
    println!();

    let her = HerConfig::new()
        .with_n_sampled_goal(4)
        .with_batch_size(256)
        .with_min_size(2_000);

    let config = TrainerConfig::new()
        .with_n_actors(2)
        .with_n_envs_per_actor(8)
        .with_warmup_env_steps(2_000)
        .with_max_env_steps(MAX_ENV_STEPS)
        .with_target_success_rate(0.9)
        .with_success_window(100)
        .with_seed(SEED)
        .with_buffer(her);

    println!("Configuration:");
    println!(
        "  Actors: {} x {} envs = {} total",
        config.n_actors,
        config.n_envs_per_actor,
        config.n_actors * config.n_envs_per_actor
    );
    println!("  Env steps: {} (early stop at 90% success)", config.max_env_steps);
    println!("  Relabeling: future strategy, 4 virtual goals per real goal");
    println!("  Exploration noise: 0.2");
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
        DdpgRule::new(DdpgConfig::new().with_exploration_sigma(0.2)),
        |device: &<B as Backend>::Device| {
            MlpActorConfig::new(INPUT, ACTIONS)
                .with_hidden_sizes(HIDDEN)
                .init(device)
        },
        actor,
        critic,
        |actor_id, n_envs| {
            FetchConfig::slide(n_envs)
                .with_seed(SEED + actor_id as u64)
                .build()
                .expect("Failed to build slide environment")
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
