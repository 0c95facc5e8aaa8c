//! Microwave policy evaluation with a random baseline.
//!
//! Runs the uniform-random baseline first, the completion bonus makes some
//! subtasks look deceptively easy and the baseline shows how much success
//! is luck. Then loads the best checkpoint and prints one line per greedy
//! episode.
//!
//! Run with: `cargo run --release -- evaluate-kitchen`

use burn::backend::NdArray;

use goal_rl::{
    evaluate, evaluate_random, CheckpointConfig, Checkpointer, EvaluationConfig, MlpActorConfig,
};
use kitchen_env::KitchenConfig;

type B = NdArray<f32>;

const INPUT: usize = 28;
const ACTIONS: usize = 3;
const HIDDEN: (usize, usize) = (256, 256);

const MODEL_DIR: &str = "models/kitchen";
const N_EPISODES: usize = 20;

pub fn run() {
    println!("=== Kitchen Microwave Evaluation ===");
    println!();

    let mut env = KitchenConfig::microwave(8)
        .with_seed(11)
        .build()
        .expect("Failed to build kitchen environment");

    println!("Random baseline ({} episodes):", N_EPISODES);
    let baseline = evaluate_random(&mut env, &EvaluationConfig::new(N_EPISODES).with_seed(11));
    println!("{}", baseline);
    println!();

    let device = Default::default();
    let checkpointer = Checkpointer::new(CheckpointConfig::new(MODEL_DIR))
        .expect("Failed to open model directory");

    // SAC saved a stochastic actor, so the template needs the log-std head.
    let template = MlpActorConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(HIDDEN)
        .stochastic()
        .init::<B>(&device);
    let actor = match checkpointer.load_best(template, &device) {
        Ok(actor) => actor,
        Err(_) => {
            println!("No checkpoint found in {}.", MODEL_DIR);
            println!("Run `cargo run --release -- train-kitchen` first.");
            return;
        }
    };

    let report = evaluate(
        &actor,
        &mut env,
        &EvaluationConfig::new(N_EPISODES).with_seed(13),
        &device,
    );

    for (i, (&reward, &success)) in report
        .episode_rewards
        .iter()
        .zip(report.episode_successes.iter())
        .enumerate()
    {
        println!(
            "Episode {:>2}: reward {:>5.1}  {}",
            i + 1,
            reward,
            if success { "microwave opened" } else { "microwave closed" }
        );
    }
    println!();
    println!("Trained policy:");
    println!("{}", report);
    println!();
    println!(
        "Success rate lift over random: {:.1}% -> {:.1}%",
        baseline.success_rate * 100.0,
        report.success_rate * 100.0
    );
}
