//! Horizon truncation and success flags. Episodes only ever end by
//! truncation; success is reported but never terminates.

use crate::config::FetchConfig;
use crate::constants::DISTANCE_THRESHOLD;
use crate::state::FetchState;
use crate::termination::{check_success_all, check_truncation_all};
use goal_rl::GoalEnv;

// ============================================================================
// Unit checks on the flag helpers
// ============================================================================

#[test]
fn should_truncate_only_at_step_limit() {
    let mut state = FetchState::new(3);
    state.step_count[0] = 4;
    state.step_count[1] = 5;
    state.step_count[2] = 6;

    let mut out = [false; 3];
    check_truncation_all(&state, 5, &mut out);

    assert_eq!(out, [false, true, true]);
}

#[test]
fn should_detect_success_within_threshold() {
    let mut state = FetchState::new(2);
    state.set_gripper_pos(0, [0.1, 0.1, 0.5]);
    state.refresh_achieved(0, false);
    state.set_goal(0, [0.1, 0.1, 0.5]);

    state.set_gripper_pos(1, [0.1, 0.1, 0.5]);
    state.refresh_achieved(1, false);
    state.set_goal(1, [0.3, 0.1, 0.5]);

    let mut out = [false; 2];
    check_success_all(&state, DISTANCE_THRESHOLD, &mut out);

    assert_eq!(out, [true, false]);
}

// ============================================================================
// Episode-level behavior
// ============================================================================

#[test]
fn should_truncate_exactly_at_horizon() {
    let mut env = FetchConfig::reach(1).with_seed(83).with_horizon(5).build().unwrap();

    for step in 1..=4 {
        env.step_all(&[0.0; 4]);
        assert!(!env.last_truncations()[0], "no truncation at step {step}");
    }

    env.step_all(&[0.0; 4]);
    assert!(env.last_truncations()[0]);

    // Without a reset the flag stays raised.
    env.step_all(&[0.0; 4]);
    assert!(env.last_truncations()[0]);

    env.reset_env_indices(&[0]);
    assert_eq!(env.state().step_count[0], 0);
}

#[test]
fn should_never_set_terminal_flags() {
    let mut env = FetchConfig::pick_and_place(2)
        .with_seed(89)
        .with_horizon(4)
        .build()
        .unwrap();

    for _ in 0..6 {
        let result = env.step(&[0.2, -0.3, 0.1, -1.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(result.terminals, vec![false, false]);
    }
}

#[test]
fn should_flag_success_without_ending_episode() {
    let mut env = FetchConfig::reach(1).with_seed(97).with_horizon(20).build().unwrap();

    let goal = env.state().goal_of(0);
    env.state_mut().set_gripper_pos(0, goal);
    env.step_all(&[0.0; 4]);

    assert!(env.last_successes()[0]);
    assert!(!env.last_truncations()[0]);

    // The episode keeps running; staying on the goal keeps reporting success.
    env.step_all(&[0.0; 4]);
    assert!(env.last_successes()[0]);
    assert_eq!(env.state().step_count[0], 2);
}
