//! Completion latching, reward accounting, and episode termination.

use crate::config::{KitchenConfig, KitchenTask};
use crate::constants::APPLIANCES;

#[test]
fn should_pay_completion_bonus_exactly_once() {
    let mut env = KitchenConfig::microwave(1).with_seed(3).build().unwrap();

    env.state_mut().set_joint(0, 0, APPLIANCES[0].target_value);
    env.step_all(&[0.0; 3]);
    assert_eq!(env.last_rewards()[0], 1.0);
    assert_eq!(env.completed_count(0), 1);

    // The door is still open, but the bonus is latched.
    for _ in 0..5 {
        env.step_all(&[0.0; 3]);
        assert_eq!(env.last_rewards()[0], 0.0);
    }
    assert_eq!(env.state().episode_reward[0], 1.0);
}

#[test]
fn should_terminate_when_all_selected_complete() {
    let mut env = KitchenConfig::new(
        vec![KitchenTask::Microwave, KitchenTask::Kettle],
        1,
    )
    .with_seed(5)
    .build()
    .unwrap();

    env.state_mut().set_joint(0, 0, APPLIANCES[0].target_value);
    env.state_mut().set_joint(0, 1, APPLIANCES[1].target_value);
    env.step_all(&[0.0; 3]);

    // Both subtasks completed on the same step.
    assert_eq!(env.last_rewards()[0], 2.0);
    assert!(env.last_terminals()[0]);
    assert!(env.last_successes()[0]);
}

#[test]
fn should_not_terminate_with_partial_completion() {
    let mut env = KitchenConfig::new(
        vec![KitchenTask::Microwave, KitchenTask::Kettle],
        1,
    )
    .with_seed(7)
    .build()
    .unwrap();

    env.state_mut().set_joint(0, 0, APPLIANCES[0].target_value);
    env.step_all(&[0.0; 3]);

    assert_eq!(env.last_rewards()[0], 1.0);
    assert_eq!(env.completed_count(0), 1);
    assert!(!env.last_terminals()[0]);
    assert!(!env.last_successes()[0]);
}

#[test]
fn should_ignore_unselected_appliances() {
    let mut env = KitchenConfig::microwave(1).with_seed(9).build().unwrap();

    // Opening the hinge cabinet earns nothing when only the microwave is
    // selected.
    env.state_mut().set_joint(0, 4, APPLIANCES[4].target_value);
    env.step_all(&[0.0; 3]);

    assert_eq!(env.last_rewards()[0], 0.0);
    assert_eq!(env.completed_count(0), 0);
    assert!(!env.last_terminals()[0]);
}

#[test]
fn should_keep_terminal_raised_until_reset() {
    let mut env = KitchenConfig::microwave(1).with_seed(11).build().unwrap();

    env.state_mut().set_joint(0, 0, APPLIANCES[0].target_value);
    env.step_all(&[0.0; 3]);
    assert!(env.last_terminals()[0]);

    env.step_all(&[0.0; 3]);
    assert!(env.last_terminals()[0]);
    assert_eq!(env.last_rewards()[0], 0.0);

    env.reset_env_indices(&[0]);
    assert!(!env.last_terminals()[0]);
    assert_eq!(env.completed_count(0), 0);
}

#[test]
fn should_truncate_at_horizon_without_completion() {
    let mut env = KitchenConfig::microwave(1)
        .with_seed(13)
        .with_horizon(4)
        .build()
        .unwrap();

    for _ in 0..3 {
        env.step_all(&[0.0; 3]);
        assert!(!env.last_truncations()[0]);
    }
    env.step_all(&[0.0; 3]);

    assert!(env.last_truncations()[0]);
    assert!(!env.last_terminals()[0]);
    assert!(!env.last_successes()[0]);
}

#[test]
fn should_clear_joints_and_latches_on_reset() {
    let mut env = KitchenConfig::microwave(1).with_seed(17).build().unwrap();

    env.state_mut().set_joint(0, 0, APPLIANCES[0].target_value);
    env.step_all(&[0.0; 3]);
    assert_eq!(env.completed_count(0), 1);

    env.reset_all_envs();

    assert_eq!(env.completed_count(0), 0);
    assert_eq!(env.state().step_count[0], 0);
    assert_eq!(env.state().episode_reward[0], 0.0);
    let joint = env.state().joint(0, 0);
    assert!((joint - APPLIANCES[0].initial_value).abs() < 0.05);
}
