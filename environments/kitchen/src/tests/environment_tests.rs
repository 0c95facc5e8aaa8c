//! Scripted end-to-end episodes through the full environment.

use crate::config::{KitchenConfig, KitchenTask};
use crate::constants::HANDLE_RADIUS;
use crate::env::KitchenEnv;
use goal_rl::GoalEnv;

/// Proportional action toward `target`, saturating at full speed.
fn drive_toward(current: [f32; 3], target: [f32; 3]) -> [f32; 3] {
    [
        ((target[0] - current[0]) * 20.0).clamp(-1.0, 1.0),
        ((target[1] - current[1]) * 20.0).clamp(-1.0, 1.0),
        ((target[2] - current[2]) * 20.0).clamp(-1.0, 1.0),
    ]
}

/// Drive the arm to an appliance handle, then hold until the subtask
/// completes or the step budget runs out. Returns the number of steps
/// spent holding.
fn operate(env: &mut KitchenEnv, task: KitchenTask, budget: usize) -> usize {
    let handle = task.spec().handle;

    let mut approach = 0;
    while env.state().handle_distance(0, task.index()) >= HANDLE_RADIUS {
        let action = drive_toward(env.state().arm(0), handle);
        env.step_all(&action);
        approach += 1;
        assert!(approach < budget, "arm never reached the {} handle", task.name());
    }

    let mut held = 0;
    while !env.state().is_completed(0, task.index()) {
        env.step_all(&[0.0; 3]);
        held += 1;
        assert!(held < budget, "{} never completed while held", task.name());
    }
    held
}

#[test]
fn should_open_microwave_by_holding_handle() {
    let mut env = KitchenConfig::microwave(1).with_seed(21).build().unwrap();

    let held = operate(&mut env, KitchenTask::Microwave, 60);

    // Completion takes several held steps, and the completing step pays
    // the bonus and ends the episode.
    assert!(held >= 2);
    assert_eq!(env.last_rewards()[0], 1.0);
    assert!(env.last_terminals()[0]);
    assert!(env.last_successes()[0]);
    assert_eq!(env.state().episode_reward[0], 1.0);
}

#[test]
fn should_complete_two_subtasks_in_sequence() {
    let mut env = KitchenConfig::new(
        vec![KitchenTask::Microwave, KitchenTask::LightSwitch],
        1,
    )
    .with_seed(23)
    .build()
    .unwrap();

    operate(&mut env, KitchenTask::Microwave, 60);
    assert_eq!(env.completed_count(0), 1);
    assert!(!env.last_terminals()[0], "one of two subtasks is not terminal");

    operate(&mut env, KitchenTask::LightSwitch, 60);
    assert_eq!(env.completed_count(0), 2);
    assert!(env.last_terminals()[0]);
    assert_eq!(env.state().episode_reward[0], 2.0);
}

#[test]
fn should_work_through_goal_trait_end_to_end() {
    let mut env = KitchenConfig::microwave(1).with_seed(25).build().unwrap();

    let mut achieved = [0.0; 1];
    let mut desired = [0.0; 1];
    env.write_achieved_goals(&mut achieved);
    env.write_desired_goals(&mut desired);
    assert!(!env.is_success(&achieved, &desired));
    assert_eq!(env.compute_reward(&achieved, &desired), 0.0);

    operate(&mut env, KitchenTask::Microwave, 60);

    env.write_achieved_goals(&mut achieved);
    env.write_desired_goals(&mut desired);
    assert!(env.is_success(&achieved, &desired));
    assert_eq!(env.compute_reward(&achieved, &desired), 1.0);
}

#[test]
fn should_observe_joint_motion_while_holding() {
    let mut env = KitchenConfig::microwave(1).with_seed(27).build().unwrap();
    let handle = KitchenTask::Microwave.spec().handle;

    let mut approach = 0;
    while env.state().handle_distance(0, 0) >= HANDLE_RADIUS {
        let action = drive_toward(env.state().arm(0), handle);
        env.step_all(&action);
        approach += 1;
        assert!(approach < 60, "arm never reached the handle");
    }
    env.step_all(&[0.0; 3]);

    let mut obs = [0.0; 27];
    env.copy_observations(&mut obs);
    // Joint value channel moved off its start and the joint velocity
    // channel is nonzero while the door swings.
    assert!((obs[6] - env.state().joint(0, 0)).abs() < 1e-6);
    assert!(obs[13].abs() > 0.0);
    assert!(env.state().joint(0, 0) < 0.0);
}
