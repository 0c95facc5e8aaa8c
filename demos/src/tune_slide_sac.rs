//! Hyperparameter search for SAC on the slide task.
//!
//! Random search over the learning rate (log-uniform) and the network width:
//! each trial trains a short SAC + HER run and scores the resulting policy
//! by greedy success rate over 20 episodes. The study is budgeted at 30
//! trials or one hour, whichever comes first, and the full trial history
//! lands in a JSON report.
//!
//! Run with: `cargo run --release -- tune-slide-sac`

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::tensor::backend::Backend;
use std::path::Path;
use std::time::Duration;

use fetch_env::FetchConfig;
use goal_rl::{
    evaluate, EvaluationConfig, HerConfig, MlpActor, MlpActorConfig, MlpCritic, MlpCriticConfig,
    NetArch, OffPolicyTrainer, SacConfig, SacRule, SearchSpace, Study, TrainerConfig, TrialParams,
};

type B = Autodiff<NdArray<f32>>;

// Slide: 17 obs dims + 3 goal dims, 4 action dims.
const INPUT: usize = 20;
const ACTIONS: usize = 4;

const N_TRIALS: usize = 30;
const TRIAL_ENV_STEPS: usize = 25_000;
const EVAL_EPISODES: usize = 20;
const TIME_BUDGET_SECS: u64 = 3_600;
const REPORT_PATH: &str = "tune_slide_sac.json";

/// One trial: a short SAC + HER run scored by greedy success rate.
fn run_trial(number: usize, params: &TrialParams) -> f64 {
    let hidden = params.net_arch.hidden_sizes();
    let seed = 1_000 + number as u64;

    let config = TrainerConfig::new()
        .with_n_actors(2)
        .with_n_envs_per_actor(4)
        .with_warmup_env_steps(1_000)
        .with_max_env_steps(TRIAL_ENV_STEPS)
        .with_log_interval_secs(3_600.0)
        .with_seed(seed)
        .with_buffer(HerConfig::new().with_n_sampled_goal(4));

    let trainer = OffPolicyTrainer::<B>::new(config);
    let device = Default::default();

    let actor = MlpActorConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(hidden)
        .stochastic()
        .init(&device);
    let critic = MlpCriticConfig::new(INPUT, ACTIONS)
        .with_hidden_sizes(hidden)
        .twin()
        .init(&device);
    let (actor_opt, critic_opt) = trainer.create_optimizers::<MlpActor<B>, MlpCritic<B>>();

    let sac = SacConfig::new()
        .with_actor_lr(params.learning_rate)
        .with_critic_lr(params.learning_rate)
        .with_alpha_lr(params.learning_rate);

    let outcome = trainer.run(
        SacRule::new(sac, ACTIONS),
        move |device: &<B as Backend>::Device| {
            MlpActorConfig::new(INPUT, ACTIONS)
                .with_hidden_sizes(hidden)
                .stochastic()
                .init(device)
        },
        actor,
        critic,
        move |actor_id, n_envs| {
            FetchConfig::slide(n_envs)
                .with_seed(seed + actor_id as u64)
                .build()
                .expect("Failed to build slide environment")
        },
        actor_opt,
        critic_opt,
        |_stats| {},
    );

    let mut env = FetchConfig::slide(4)
        .with_seed(9_000 + number as u64)
        .build()
        .expect("Failed to build evaluation environment");
    let eval = EvaluationConfig::new(EVAL_EPISODES).with_seed(number as u64);
    let report = evaluate(&outcome.actor.valid(), &mut env, &eval, &device);

    report.success_rate as f64
}

pub fn run() {
    println!("=== Slide Hyperparameter Search (SAC + HER) ===");
    println!();
    println!("Search space:");
    println!("  Learning rate: 1e-4 .. 1e-3 (log-uniform)");
    println!("  Architecture:  64x64 / 128x128 / 256x256");
    println!();
    println!(
        "Budget: {} trials x {} env steps, {} eval episodes each, {}s wall clock",
        N_TRIALS,
        TRIAL_ENV_STEPS,
        EVAL_EPISODES,
        TIME_BUDGET_SECS
    );
    println!();

    let space = SearchSpace::new()
        .with_learning_rate_range(1e-4, 1e-3)
        .with_architectures(&[NetArch::Small, NetArch::Medium, NetArch::Big]);

    let mut study = Study::maximize(space).with_seed(2024);
    study.optimize(
        N_TRIALS,
        Some(Duration::from_secs(TIME_BUDGET_SECS)),
        run_trial,
    );

    match study.best_trial() {
        Some(best) => {
            println!();
            println!("Best trial: #{}", best.number);
            println!("  Learning rate: {:.2e}", best.params.learning_rate);
            println!("  Architecture:  {:?}", best.params.net_arch);
            println!("  Success rate:  {:.1}%", best.value * 100.0);
        }
        None => {
            println!("No trials completed.");
            return;
        }
    }

    match study.save_report(Path::new(REPORT_PATH)) {
        Ok(()) => println!("Study report written to {}", REPORT_PATH),
        Err(e) => println!("Report save failed: {}", e),
    }
}
