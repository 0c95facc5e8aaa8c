//! Pick-and-place with TD3 on the dense reward variant.
//!
//! Dense negative-distance rewards give TD3 a learnable gradient without
//! relabeling, so this is the quickest locally trainable stand-in for the
//! published dense-reward TD3 policy: a short run, then an immediate
//! evaluation of the freshly trained actor instead of downloading weights.
//!
//! Run with: `cargo run --release -- train-pick-and-place-td3`

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend;

use fetch_env::FetchConfig;
use goal_rl::{
    evaluate, EvaluationConfig, HerConfig, MlpActor, MlpActorConfig, MlpCritic, MlpCriticConfig,
    OffPolicyTrainer, Td3Config, Td3Rule, TrainerConfig,
};

type B = Autodiff<NdArray<f32>>;

// PickAndPlace: 17 obs dims + 3 goal dims, 4 action dims.
const INPUT: usize = 20;
const ACTIONS: usize = 4;
const HIDDEN: (usize, usize) = (256, 256);

const MAX_ENV_STEPS: usize = 60_000;
const EVAL_EPISODES: usize = 20;
const SEED: u64 = 5;

pub fn run() {
    println!("=== Pick-and-Place Training (TD3, dense reward) ===");
    println!();

    let config = TrainerConfig::new()
        .with_n_actors(2)
        .with_n_envs_per_actor(8)
        .with_warmup_env_steps(1_000)
        .with_max_env_steps(MAX_ENV_STEPS)
        .with_seed(SEED)
        .with_buffer(HerConfig::new().with_her(false));

    println!("Configuration:");
    println!(
        "  Actors: {} x {} envs = {} total",
        config.n_actors,
        config.n_envs_per_actor,
        config.n_actors * config.n_envs_per_actor
    );
    println!("  Env steps: {}", config.max_env_steps);
    println!("  Reward: dense negative distance, uniform replay");
    println!();

    let trainer = OffPolicyTrainer::<B>::new(config);
    let device = Default::default();

    let actor = MlpActorConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .init(&device);
    let critic = MlpCriticConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .twin()
        .init(&device);
    let (actor_opt, critic_opt) = trainer.create_optimizers::<MlpActor<B>, MlpCritic<B>>();

    println!("Starting training...");
    println!();

    let outcome = trainer.run(
        Td3Rule::new(Td3Config::new()),
        |device: &<B as Backend>::Device| {
            MlpActorConfig::new(INPUT, ACTIONS)
                .with_hidden_sizes(HIDDEN)
                .init(device)
        },
        actor,
        critic,
        |actor_id, n_envs| {
            FetchConfig::pick_and_place(n_envs)
                .with_dense_reward()
                .with_seed(SEED + actor_id as u64)
                .build()
                .expect("Failed to build pick-and-place environment")
        },
        actor_opt,
        critic_opt,
        |stats| {
            if stats.train_steps % 2_000 == 0 && stats.train_steps > 0 {
                println!(
                    "Steps: {:>7} | Episodes: {:>5} | Succ: {:>5.1}% | Return: {:>8.1} | SPS: {:>6.0}",
                    stats.env_steps,
                    stats.episodes,
                    stats.success_rate * 100.0,
                    stats.mean_return,
                    stats.sps
                );
            }
        },
    );

    println!();
    println!(
        "Training finished: {} env steps, {} gradient steps",
        outcome.stats.env_steps, outcome.stats.train_steps
    );
    println!();

    let mut env = FetchConfig::pick_and_place(8)
        .with_dense_reward()
        .with_seed(77)
        .build()
        .expect("Failed to build evaluation environment");
    let eval = EvaluationConfig::new(EVAL_EPISODES).with_seed(77);
    let report = evaluate(&outcome.actor.valid(), &mut env, &eval, &device);

    println!("Greedy evaluation ({} episodes):", EVAL_EPISODES);
    println!("{}", report);
}
