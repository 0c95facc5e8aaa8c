//! Pick-and-place policy evaluation.
//!
//! Loads the best saved policy and measures it over 50 greedy episodes on
//! fresh seeds, printing per-episode outcomes for the first ten the way the
//! original notebook loop did. Reward and success-rate charts land next to
//! the binary.
//!
//! Run with: `cargo run --release -- evaluate-pick-and-place`

use burn::backend::NdArray;
use std::path::Path;

use fetch_env::FetchConfig;
use goal_rl::{
    evaluate, plot_rewards, plot_success_rate, CheckpointConfig, Checkpointer, EvaluationConfig,
    MlpActorConfig,
};

type B = NdArray<f32>;

const INPUT: usize = 20;
const ACTIONS: usize = 4;
const HIDDEN: (usize, usize) = (256, 256);

const MODEL_DIR: &str = "models/pick_and_place";
const N_EPISODES: usize = 50;

pub fn run() {
    println!("=== Pick-and-Place Evaluation ===");
    println!();

    let device = Default::default();
    let checkpointer = Checkpointer::new(CheckpointConfig::new(MODEL_DIR))
        .expect("Failed to open model directory");

    let template = MlpActorConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .init::<B>(&device);
    let actor = match checkpointer.load_best(template, &device) {
        Ok(actor) => actor,
        Err(_) => {
            println!("No trained policy found in {}.", MODEL_DIR);
            println!("Run `cargo run --release -- train-pick-and-place` first.");
            return;
        }
    };

    let mut env = FetchConfig::pick_and_place(16)
        .with_seed(7)
        .build()
        .expect("Failed to build pick-and-place environment");

    let config = EvaluationConfig::new(N_EPISODES).with_seed(7);
    println!("Evaluating {} greedy episodes...", config.n_episodes);
    println!();

    let report = evaluate(&actor, &mut env, &config, &device);

    for (i, (&reward, &success)) in report
        .episode_rewards
        .iter()
        .zip(report.episode_successes.iter())
        .take(10)
        .enumerate()
    {
        println!(
            "Episode {:>2}: reward {:>7.1}  {}",
            i + 1,
            reward,
            if success { "goal achieved" } else { "goal missed" }
        );
    }
    println!();
    println!("{}", report);
    println!();

    let rewards_png = Path::new("evaluate_pick_and_place_rewards.png");
    let success_png = Path::new("evaluate_pick_and_place_success.png");
    match plot_rewards(&report.episode_rewards, "Pick-and-Place Rewards", rewards_png)
        .and_then(|()| {
            plot_success_rate(
                &report.episode_successes,
                10,
                "Pick-and-Place Success Rate",
                success_png,
            )
        }) {
        Ok(()) => println!(
            "Charts written to {} and {}",
            rewards_png.display(),
            success_png.display()
        ),
        Err(e) => println!("Charts skipped: {}", e),
    }
}
