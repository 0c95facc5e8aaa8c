//! Environment-level tests: construction, reset distributions, observation
//! contents, and scripted end-to-end episodes.

use crate::config::FetchConfig;
use crate::constants::*;
use crate::noise::NoiseConfig;

// ============================================================================
// Observation sizes and layout
// ============================================================================

#[test]
fn should_report_task_observation_sizes() {
    let reach = FetchConfig::reach(2).build().unwrap();
    let pick = FetchConfig::pick_and_place(2).build().unwrap();
    let slide = FetchConfig::slide(2).build().unwrap();

    assert_eq!(reach.config().obs_size(), 8);
    assert_eq!(pick.config().obs_size(), 17);
    assert_eq!(slide.config().obs_size(), 17);

    let mut obs = vec![0.0; 2 * 17];
    pick.copy_observations(&mut obs);
    assert!(obs.iter().any(|v| *v != 0.0));
}

#[test]
fn should_expose_exact_state_in_observations() {
    let mut env = FetchConfig::pick_and_place(1).with_seed(41).build().unwrap();
    env.step_all(&[0.3, -0.2, 0.1, 0.0]);

    let mut obs = vec![0.0; 17];
    env.copy_observations(&mut obs);

    let grip = env.state().gripper(0);
    let object = env.state().object(0);
    assert_eq!(&obs[0..3], &grip);
    assert_eq!(&obs[8..11], &object);
    for axis in 0..3 {
        assert!((obs[11 + axis] - (object[axis] - grip[axis])).abs() < 1e-6);
    }
    assert!((obs[6] - env.state().finger_width[0]).abs() < 1e-6);
}

// ============================================================================
// Reset distributions
// ============================================================================

#[test]
fn should_spawn_pick_objects_in_range_and_clear_of_gripper() {
    let env = FetchConfig::pick_and_place(48).with_seed(13).build().unwrap();

    for idx in 0..48 {
        let object = env.state().object(idx);
        let dx = object[0] - GRIPPER_HOME[0];
        let dy = object[1] - GRIPPER_HOME[1];
        assert!(dx.abs() <= OBJECT_SPAWN_RANGE + 1e-6);
        assert!(dy.abs() <= OBJECT_SPAWN_RANGE + 1e-6);
        assert!((object[2] - OBJECT_REST_HEIGHT).abs() < 1e-6);
        assert!(
            (dx * dx + dy * dy).sqrt() >= OBJECT_GRIPPER_CLEARANCE,
            "object {idx} spawned under the gripper column"
        );
    }
}

#[test]
fn should_spawn_slide_objects_in_tighter_range() {
    let env = FetchConfig::slide(48).with_seed(17).build().unwrap();

    for idx in 0..48 {
        let object = env.state().object(idx);
        assert!((object[0] - GRIPPER_HOME[0]).abs() <= SLIDE_SPAWN_RANGE + 1e-6);
        assert!((object[1] - GRIPPER_HOME[1]).abs() <= SLIDE_SPAWN_RANGE + 1e-6);
        assert!((object[2] - OBJECT_REST_HEIGHT).abs() < 1e-6);
    }
}

#[test]
fn should_sample_reach_goals_inside_workspace() {
    let env = FetchConfig::reach(48).with_seed(19).build().unwrap();

    for idx in 0..48 {
        let goal = env.state().goal_of(idx);
        assert!((goal[0] - GRIPPER_HOME[0]).abs() <= GOAL_RANGE + 1e-6);
        assert!((goal[1] - GRIPPER_HOME[1]).abs() <= GOAL_RANGE + 1e-6);
        assert!(goal[2] >= WORKSPACE_MIN[2] - 1e-6);
        assert!(goal[2] <= GRIPPER_HOME[2] + GOAL_RANGE + 1e-6);
    }
}

#[test]
fn should_sample_air_and_table_goals_for_pick_and_place() {
    let env = FetchConfig::pick_and_place(64).with_seed(23).build().unwrap();

    let mut saw_air = false;
    let mut saw_table = false;
    for idx in 0..64 {
        let goal = env.state().goal_of(idx);
        assert!(goal[2] >= OBJECT_REST_HEIGHT - 1e-6);
        assert!(goal[2] <= OBJECT_REST_HEIGHT + AIR_GOAL_MAX_HEIGHT + 1e-6);
        if goal[2] > OBJECT_REST_HEIGHT + 1e-4 {
            saw_air = true;
        } else {
            saw_table = true;
        }
    }
    assert!(saw_air, "expected some goals in the air");
    assert!(saw_table, "expected some goals on the table");
}

#[test]
fn should_place_slide_goals_beyond_gripper_reach() {
    let env = FetchConfig::slide(32).with_seed(29).build().unwrap();
    let threshold = env.config().distance_threshold;

    for idx in 0..32 {
        let goal = env.state().goal_of(idx);
        assert!(goal[0] >= WORKSPACE_MAX[0] + threshold - 1e-6);
        assert!((goal[1] - GRIPPER_HOME[1]).abs() <= SLIDE_GOAL_RANGE + 1e-6);
        assert!((goal[2] - OBJECT_REST_HEIGHT).abs() < 1e-6);
    }
}

#[test]
fn should_enforce_min_goal_distance_for_every_task() {
    let reach = FetchConfig::reach(32).with_seed(31).build().unwrap();
    let pick = FetchConfig::pick_and_place(32).with_seed(31).build().unwrap();
    let slide = FetchConfig::slide(32).with_seed(31).build().unwrap();

    for idx in 0..32 {
        assert!(reach.state().goal_distance(idx) >= MIN_GOAL_DISTANCE);
        assert!(pick.state().goal_distance(idx) >= MIN_GOAL_DISTANCE);
        assert!(slide.state().goal_distance(idx) >= MIN_GOAL_DISTANCE);
    }
}

#[test]
fn should_keep_goal_fixed_within_episode() {
    let mut env = FetchConfig::pick_and_place(1).with_seed(37).build().unwrap();
    let goal = env.state().goal_of(0);

    for _ in 0..10 {
        env.step_all(&[0.4, -0.1, 0.2, 0.5]);
        assert_eq!(env.state().goal_of(0), goal);
    }

    env.reset_all_envs();
    assert_ne!(env.state().goal_of(0), goal);
}

// ============================================================================
// Observation noise
// ============================================================================

#[test]
fn should_noise_observations_but_not_goals() {
    let env = FetchConfig::pick_and_place(1)
        .with_seed(43)
        .with_noise(NoiseConfig::sensor_realistic())
        .build()
        .unwrap();

    let mut obs = vec![0.0; 17];
    env.copy_observations(&mut obs);
    let grip = env.state().gripper(0);
    let noised = (0..3).any(|axis| (obs[axis] - grip[axis]).abs() > 1e-7);
    assert!(noised, "position noise should perturb the observation");

    // Goal channels bypass the noise model entirely.
    let mut achieved = [0.0; 3];
    let mut desired = [0.0; 3];
    env.copy_achieved_goals(&mut achieved);
    env.copy_desired_goals(&mut desired);
    assert_eq!(achieved, env.state().object(0));
    assert_eq!(desired, env.state().goal_of(0));
}

// ============================================================================
// Scripted episodes
// ============================================================================

/// Proportional action toward `target`, saturating at full speed.
fn drive_toward(current: [f32; 3], target: [f32; 3], grip: f32) -> [f32; 4] {
    [
        ((target[0] - current[0]) * 20.0).clamp(-1.0, 1.0),
        ((target[1] - current[1]) * 20.0).clamp(-1.0, 1.0),
        ((target[2] - current[2]) * 20.0).clamp(-1.0, 1.0),
        grip,
    ]
}

#[test]
fn should_complete_pick_and_place_with_scripted_policy() {
    let mut env = FetchConfig::pick_and_place(1)
        .with_seed(9)
        .with_horizon(100)
        .build()
        .unwrap();

    // Approach the object with open fingers.
    for _ in 0..30 {
        if env.state().gripper_object_distance(0) < 0.03 {
            break;
        }
        let action = drive_toward(env.state().gripper(0), env.state().object(0), 1.0);
        env.step_all(&action);
    }
    assert!(env.state().gripper_object_distance(0) < 0.03);

    // Close until the grasp engages.
    for _ in 0..3 {
        env.step_all(&[0.0, 0.0, 0.0, -1.0]);
    }
    assert!(env.state().grasped[0]);

    // Carry the object to the goal while holding.
    let mut succeeded = false;
    for _ in 0..40 {
        let action = drive_toward(env.state().gripper(0), env.state().goal_of(0), -1.0);
        env.step_all(&action);
        if env.last_successes()[0] {
            succeeded = true;
            break;
        }
    }

    assert!(succeeded, "scripted policy should reach the goal");
    // Sparse reward is 0 on the successful step and the episode keeps going.
    assert_eq!(env.last_rewards()[0], 0.0);
    assert!(!env.last_truncations()[0]);
}

#[test]
fn should_push_slide_object_past_workspace_limit() {
    let mut env = FetchConfig::slide(1)
        .with_seed(47)
        .with_horizon(100)
        .build()
        .unwrap();

    // Park the object at a known spot ahead of the gripper column, then
    // descend to table level behind it.
    env.state_mut().set_object_pos(0, [0.08, 0.0, OBJECT_REST_HEIGHT]);
    env.state_mut().set_object_vel(0, [0.0; 3]);
    for _ in 0..3 {
        env.step_all(&[0.0, 0.0, -1.0, 0.0]);
    }
    assert!((env.state().gripper(0)[2] - WORKSPACE_MIN[2]).abs() < 1e-6);

    // Drive forward through the object, then let it glide out.
    for _ in 0..10 {
        env.step_all(&[1.0, 0.0, 0.0, 0.0]);
    }
    for _ in 0..70 {
        env.step_all(&[0.0, 0.0, 0.0, 0.0]);
    }

    let object = env.state().object(0);
    let gripper = env.state().gripper(0);
    assert!(
        object[0] > WORKSPACE_MAX[0],
        "push should send the object past the reachable region, got x={}",
        object[0]
    );
    assert!(gripper[0] <= WORKSPACE_MAX[0] + 1e-6);
    assert_eq!(env.state().object_velocity(0), [0.0; 3]);
}
