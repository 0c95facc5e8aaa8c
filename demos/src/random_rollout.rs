//! Random-policy rollouts on pick-and-place.
//!
//! The introductory sanity loop: sample uniform actions, reset finished
//! instances, and cross-check the reward plumbing. The env's `compute_reward`
//! on the live achieved/desired pair must reproduce the step reward, and
//! `is_success` must agree with the success flag; relabeling silently breaks
//! when either drifts. Also shows the two wrappers composing around any
//! environment and renders a top-down trajectory chart of the last episode.
//!
//! Run with: `cargo run --release -- random-rollout`

use std::path::Path;

use fetch_env::{FetchConfig, RenderMode};
use goal_rl::{plot_trajectory, GoalEnv, RewardScalingWrapper, TimeLimitWrapper};

const EPISODES: usize = 5;

pub fn run() {
    println!("=== Random Rollouts (Pick-and-Place) ===");
    println!();

    fastrand::seed(17);

    let mut env = FetchConfig::pick_and_place(1)
        .with_seed(17)
        .with_render_mode(RenderMode::Trace)
        .build()
        .expect("Failed to build pick-and-place environment");

    let obs_size = env.obs_size();
    let goal_size = env.goal_size();
    let action_dim = env.action_dim();

    let mut observations = vec![0.0; obs_size];
    let mut achieved = vec![0.0; goal_size];
    let mut desired = vec![0.0; goal_size];
    let mut actions = vec![0.0; action_dim];

    env.write_observations(&mut observations);
    env.write_desired_goals(&mut desired);
    println!(
        "Observation size: {}  goal size: {}  action dim: {}",
        obs_size, goal_size, action_dim
    );
    println!(
        "Gripper at [{:.3}, {:.3}, {:.3}], goal at [{:.3}, {:.3}, {:.3}]",
        observations[0], observations[1], observations[2], desired[0], desired[1], desired[2]
    );
    println!();

    let mut episodes = 0usize;
    let mut episode_steps = 0usize;
    let mut episode_reward = 0.0f32;
    let mut checked = 0usize;

    loop {
        for a in actions.iter_mut() {
            *a = fastrand::f32() * 2.0 - 1.0;
        }

        let result = env.step(&actions);
        episode_steps += 1;
        episode_reward += result.rewards[0];

        env.write_achieved_goals(&mut achieved);
        env.write_desired_goals(&mut desired);

        // The goal-only reward must reproduce the step reward for the sparse
        // variant, and the success flag must match the threshold test.
        let recomputed = env.compute_reward(&achieved, &desired);
        assert_eq!(
            recomputed, result.rewards[0],
            "compute_reward disagrees with step reward"
        );
        assert_eq!(env.is_success(&achieved, &desired), result.successes[0]);
        checked += 1;

        if result.done(0) {
            episodes += 1;
            println!(
                "Episode {}: {:>3} steps, total reward {:>6.1}, final success: {}",
                episodes, episode_steps, episode_reward, result.successes[0]
            );
            if episodes == EPISODES {
                break;
            }
            env.reset_envs(&[0]);
            episode_steps = 0;
            episode_reward = 0.0;
        }
    }

    println!();
    println!("Reward consistency verified on {} steps.", checked);

    if let Some(trace) = env.trace() {
        let object = (!trace.object_path().is_empty()).then(|| trace.object_path());
        let png = Path::new("random_rollout_trajectory.png");
        match plot_trajectory(trace.gripper_path(), object, trace.goal(), "Random Rollout", png) {
            Ok(()) => println!("Trajectory chart written to {}", png.display()),
            Err(e) => println!("Trajectory chart skipped: {}", e),
        }
    }

    // Wrappers compose around any GoalEnv: here a tighter step limit plus a
    // reward scale that also flows through compute_reward and relabeling.
    let inner = FetchConfig::pick_and_place(1)
        .with_seed(23)
        .build()
        .expect("Failed to build wrapped environment");
    let mut wrapped = TimeLimitWrapper::new(RewardScalingWrapper::new(inner, 0.1), 20);

    println!();
    println!(
        "Wrapped env: horizon {} steps, miss reward {:.1}",
        wrapped.max_episode_steps(),
        wrapped.compute_reward(&[0.0; 3], &[1.0; 3])
    );

    let idle = vec![0.0; wrapped.action_dim()];
    let mut result = wrapped.step(&idle);
    for _ in 1..20 {
        result = wrapped.step(&idle);
    }
    println!(
        "After 20 idle steps: reward {:.1}, truncated: {}",
        result.rewards[0], result.truncations[0]
    );
}
