//! Kitchen scene geometry, appliance joint tables, and control constants.
//!
//! Every appliance is modeled as one scalar joint with a handle site in the
//! arm's workspace. The tables here are indexed by
//! [`KitchenTask::index`](crate::config::KitchenTask::index).

/// Number of appliances in the scene.
pub const NUM_APPLIANCES: usize = 7;

/// Static description of one appliance joint.
#[derive(Clone, Copy, Debug)]
pub struct ApplianceSpec {
    /// Lower joint limit.
    pub joint_min: f32,
    /// Upper joint limit.
    pub joint_max: f32,
    /// Joint value after a reset, before jitter.
    pub initial_value: f32,
    /// Joint value that counts as task completion.
    pub target_value: f32,
    /// Handle site the end-effector must hold to actuate the joint.
    pub handle: [f32; 3],
}

/// Appliance table, ordered as [`KitchenTask`](crate::config::KitchenTask):
/// microwave, kettle, light switch, slide cabinet, hinge cabinet, bottom
/// burner, top burner.
pub const APPLIANCES: [ApplianceSpec; NUM_APPLIANCES] = [
    // Microwave door hinge (rad), swings open toward negative angles.
    ApplianceSpec {
        joint_min: -1.6,
        joint_max: 0.0,
        initial_value: 0.0,
        target_value: -0.75,
        handle: [-0.35, 0.30, 1.00],
    },
    // Kettle track position (m), pushed back onto the rear burner.
    ApplianceSpec {
        joint_min: 0.0,
        joint_max: 0.4,
        initial_value: 0.0,
        target_value: 0.26,
        handle: [-0.25, 0.60, 1.40],
    },
    // Light switch slider.
    ApplianceSpec {
        joint_min: -0.8,
        joint_max: 0.0,
        initial_value: 0.0,
        target_value: -0.69,
        handle: [-0.40, 0.15, 1.55],
    },
    // Slide cabinet door (m).
    ApplianceSpec {
        joint_min: 0.0,
        joint_max: 0.44,
        initial_value: 0.0,
        target_value: 0.37,
        handle: [0.30, 0.55, 1.45],
    },
    // Hinge cabinet door (rad).
    ApplianceSpec {
        joint_min: 0.0,
        joint_max: 1.6,
        initial_value: 0.0,
        target_value: 1.45,
        handle: [-0.50, 0.55, 1.45],
    },
    // Bottom burner knob (rad).
    ApplianceSpec {
        joint_min: -1.0,
        joint_max: 0.0,
        initial_value: 0.0,
        target_value: -0.88,
        handle: [-0.10, 0.40, 0.90],
    },
    // Top burner knob (rad).
    ApplianceSpec {
        joint_min: -1.0,
        joint_max: 0.0,
        initial_value: 0.0,
        target_value: -0.92,
        handle: [0.15, 0.40, 1.00],
    },
];

// ============================================================================
// Arm control
// ============================================================================

/// End-effector rest position after a reset (meters).
pub const ARM_HOME: [f32; 3] = [0.0, 0.0, 1.0];

/// Reachable end-effector region, min corner.
pub const WORKSPACE_MIN: [f32; 3] = [-0.8, -0.8, 0.2];

/// Reachable end-effector region, max corner.
pub const WORKSPACE_MAX: [f32; 3] = [0.8, 0.8, 1.8];

/// Control interval in seconds (25 Hz).
pub const CONTROL_DT: f32 = 0.04;

/// Meters of end-effector displacement per unit action component.
pub const ACTION_POS_SCALE: f32 = 0.05;

/// Uniform jitter applied to the arm home position on reset (per axis).
pub const ARM_RESET_JITTER: f32 = 0.05;

// ============================================================================
// Appliance actuation
// ============================================================================

/// End-effector distance to a handle site below which the joint actuates.
pub const HANDLE_RADIUS: f32 = 0.08;

/// Fraction of the joint span a held joint moves toward its target per step.
pub const ACTUATION_FRACTION: f32 = 0.05;

/// Fraction of the joint span around the target that counts as complete.
pub const TARGET_BAND_FRACTION: f32 = 0.3;

/// Fraction of the joint span used as uniform reset jitter.
pub const JOINT_RESET_JITTER: f32 = 0.01;

/// Reward granted the first step a selected subtask completes.
pub const COMPLETION_BONUS: f32 = 1.0;

/// Steps before an episode truncates.
pub const DEFAULT_HORIZON: usize = 280;

// ============================================================================
// Helpers
// ============================================================================

/// Joint travel span of appliance `index`.
pub fn joint_span(index: usize) -> f32 {
    APPLIANCES[index].joint_max - APPLIANCES[index].joint_min
}

/// Half-width of the completion band for appliance `index`.
pub fn target_band(index: usize) -> f32 {
    TARGET_BAND_FRACTION * joint_span(index)
}

/// Whether `value` lies in the completion band of appliance `index`.
pub fn within_band(index: usize, value: f32) -> bool {
    (value - APPLIANCES[index].target_value).abs() <= target_band(index)
}

/// Euclidean distance between two 3D points.
pub fn dist3(a: &[f32], b: &[f32]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Clamp an end-effector position to the reachable region.
pub fn clamp_to_workspace(pos: [f32; 3]) -> [f32; 3] {
    [
        pos[0].clamp(WORKSPACE_MIN[0], WORKSPACE_MAX[0]),
        pos[1].clamp(WORKSPACE_MIN[1], WORKSPACE_MAX[1]),
        pos[2].clamp(WORKSPACE_MIN[2], WORKSPACE_MAX[2]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_inside_workspace() {
        for spec in APPLIANCES.iter() {
            for axis in 0..3 {
                assert!(spec.handle[axis] >= WORKSPACE_MIN[axis]);
                assert!(spec.handle[axis] <= WORKSPACE_MAX[axis]);
            }
        }
    }

    #[test]
    fn test_handles_do_not_overlap() {
        // Actuation would be ambiguous if two handle radii intersect.
        for i in 0..NUM_APPLIANCES {
            for j in (i + 1)..NUM_APPLIANCES {
                let gap = dist3(&APPLIANCES[i].handle, &APPLIANCES[j].handle);
                assert!(
                    gap > 2.0 * HANDLE_RADIUS,
                    "handles {i} and {j} are only {gap} apart"
                );
            }
        }
    }

    #[test]
    fn test_targets_within_joint_limits() {
        for (index, spec) in APPLIANCES.iter().enumerate() {
            assert!(spec.target_value >= spec.joint_min);
            assert!(spec.target_value <= spec.joint_max);
            assert!(spec.initial_value >= spec.joint_min);
            assert!(spec.initial_value <= spec.joint_max);
            assert!(joint_span(index) > 0.0);
        }
    }

    #[test]
    fn test_initial_values_start_outside_band() {
        // Otherwise a subtask would complete on the reset step.
        for (index, spec) in APPLIANCES.iter().enumerate() {
            assert!(!within_band(index, spec.initial_value), "appliance {index}");
        }
    }

    #[test]
    fn test_band_is_symmetric() {
        let target = APPLIANCES[0].target_value;
        let band = target_band(0);
        assert!(within_band(0, target + band * 0.99));
        assert!(within_band(0, target - band * 0.99));
        assert!(!within_band(0, target + band * 1.01));
    }
}
