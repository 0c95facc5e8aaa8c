//! Slide policy evaluation.
//!
//! The short loop from the original script: ten greedy episodes on the saved
//! policy, one line per episode, then the aggregate report.
//!
//! Run with: `cargo run --release -- evaluate-slide`

use burn::backend::NdArray;

use fetch_env::FetchConfig;
use goal_rl::{evaluate, CheckpointConfig, Checkpointer, EvaluationConfig, MlpActorConfig};

type B = NdArray<f32>;

const INPUT: usize = 20;
const ACTIONS: usize = 4;
const HIDDEN: (usize, usize) = (256, 256);

const MODEL_DIR: &str = "models/slide";
const N_EPISODES: usize = 10;

pub fn run() {
    println!("=== Slide Evaluation ===");
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
            println!("Run `cargo run --release -- train-slide` first.");
            return;
        }
    };

    let mut env = FetchConfig::slide(4)
        .with_seed(19)
        .build()
        .expect("Failed to build slide environment");

    let config = EvaluationConfig::new(N_EPISODES).with_seed(19);
    let report = evaluate(&actor, &mut env, &config, &device);

    for (i, (&reward, &success)) in report
        .episode_rewards
        .iter()
        .zip(report.episode_successes.iter())
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
}
