//! Training, evaluation and tuning drivers for the manipulation tasks.
//!
//! Every driver is a subcommand of this one binary. All of them run on the
//! CPU (`Autodiff<NdArray>`), which is fast enough for these kinematic
//! environments; the heavy lifting is the actor/learner threading inside
//! `goal_rl`, not the backend.
//!
//! # Fetch arm
//!
//! ```bash
//! cargo run --release -- train-pick-and-place
//! cargo run --release -- evaluate-pick-and-place
//!
//! cargo run --release -- train-slide
//! cargo run --release -- evaluate-slide
//!
//! cargo run --release -- tune-slide-sac
//! cargo run --release -- train-pick-and-place-td3
//! ```
//!
//! # Kitchen
//!
//! ```bash
//! cargo run --release -- train-kitchen
//! cargo run --release -- evaluate-kitchen
//! ```
//!
//! # Sanity checks
//!
//! ```bash
//! cargo run --release -- random-rollout
//! ```

mod evaluate_kitchen;
mod evaluate_pick_and_place;
mod evaluate_slide;
mod random_rollout;
mod train_kitchen;
mod train_pick_and_place;
mod train_pick_and_place_td3;
mod train_slide;
mod tune_slide_sac;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            // ============================================================
            // Fetch arm: pick-and-place
            // ============================================================

            // DDPG + hindsight relabeling on the sparse reward
            "train-pick-and-place" => train_pick_and_place::run(),

            // Load the saved policy, 50 greedy episodes, charts
            "evaluate-pick-and-place" => evaluate_pick_and_place::run(),

            // TD3 on the dense reward variant, evaluated in place
            "train-pick-and-place-td3" => train_pick_and_place_td3::run(),

            // ============================================================
            // Fetch arm: slide
            // ============================================================

            // DDPG + hindsight relabeling, long-run configuration
            "train-slide" => train_slide::run(),

            // Load the saved policy, 10-episode printout
            "evaluate-slide" => evaluate_slide::run(),

            // Random search over SAC learning rate and network width
            "tune-slide-sac" => tune_slide_sac::run(),

            // ============================================================
            // Kitchen
            // ============================================================

            // SAC without relabeling on the microwave subtask
            "train-kitchen" => train_kitchen::run(),

            // Random baseline, then the best checkpoint
            "evaluate-kitchen" => evaluate_kitchen::run(),

            // ============================================================
            // Sanity checks
            // ============================================================

            // Random actions, reward plumbing checks, wrapper showcase
            "random-rollout" => random_rollout::run(),

            _ => {
                println!("Unknown driver: {}", args[1]);
                println!();
                print_usage();
            }
        }
    } else {
        print_usage();
    }
}

fn print_usage() {
    println!("Usage: cargo run --release -- <driver>");
    println!();
    println!("=============================================================================");
    println!("                         FETCH ARM: PICK-AND-PLACE");
    println!("=============================================================================");
    println!();
    println!("  train-pick-and-place              DDPG + hindsight relabeling");
    println!("                                    Sparse -1/0 reward, 100k env steps");
    println!("                                    Saves the policy under models/");
    println!();
    println!("  evaluate-pick-and-place           50 greedy episodes on the saved policy");
    println!("                                    Per-episode printout + reward charts");
    println!();
    println!("  train-pick-and-place-td3          TD3 on the dense reward variant");
    println!("                                    Short run, evaluated immediately");
    println!();
    println!("=============================================================================");
    println!("                            FETCH ARM: SLIDE");
    println!("=============================================================================");
    println!();
    println!("  train-slide                       DDPG + hindsight relabeling");
    println!("                                    Long-run configuration, wider noise");
    println!();
    println!("  evaluate-slide                    10 greedy episodes on the saved policy");
    println!();
    println!("  tune-slide-sac                    SAC hyperparameter search");
    println!("                                    30 trials x 25k steps, 1h budget");
    println!("                                    JSON study report");
    println!();
    println!("=============================================================================");
    println!("                                 KITCHEN");
    println!("=============================================================================");
    println!();
    println!("  train-kitchen                     SAC on the microwave subtask");
    println!("                                    No relabeling, periodic checkpoints");
    println!();
    println!("  evaluate-kitchen                  Random baseline, then best checkpoint");
    println!("                                    Per-episode success/reward lines");
    println!();
    println!("=============================================================================");
    println!("                              SANITY CHECKS");
    println!("=============================================================================");
    println!();
    println!("  random-rollout                    Uniform random actions on pick-and-place");
    println!("                                    compute_reward/is_success cross-checks");
    println!("                                    Wrapper showcase + trajectory chart");
    println!();
    println!("=============================================================================");
    println!("                               QUICK START");
    println!("=============================================================================");
    println!();
    println!("  # Fastest end-to-end loop (sanity check, no training)");
    println!("  cargo run --release -- random-rollout");
    println!();
    println!("  # Then the canonical experiment");
    println!("  cargo run --release -- train-pick-and-place");
    println!("  cargo run --release -- evaluate-pick-and-place");
    println!();
}
