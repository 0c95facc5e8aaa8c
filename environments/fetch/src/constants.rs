//! Geometry and control constants for the tabletop manipulation tasks.
//!
//! The scene is a fixed table with a single gripper working above it. All
//! positions are in meters, in a right-handed frame with the x axis pointing
//! forward (away from the robot base), y to the left and z up. The origin
//! sits on the robot side of the table, directly below the gripper's home
//! position.

// ============================================================================
// Scene Geometry
// ============================================================================

/// Height of the table surface (m).
pub const TABLE_HEIGHT: f32 = 0.40;

/// Half-extent of the cube object (m). The object rests with its center
/// `OBJECT_HALF_SIZE` above the table surface.
pub const OBJECT_HALF_SIZE: f32 = 0.02;

/// Resting height of the object center when it sits on the table (m).
pub const OBJECT_REST_HEIGHT: f32 = TABLE_HEIGHT + OBJECT_HALF_SIZE;

/// Gripper home position, centered over the table at a comfortable hover.
pub const GRIPPER_HOME: [f32; 3] = [0.0, 0.0, 0.55];

/// Reachable workspace of the gripper, min corner.
///
/// The z floor lets the gripper center descend exactly to the object's
/// resting center height so grasps can close the distance to zero.
pub const WORKSPACE_MIN: [f32; 3] = [-0.25, -0.35, OBJECT_REST_HEIGHT];

/// Reachable workspace of the gripper, max corner.
pub const WORKSPACE_MAX: [f32; 3] = [0.25, 0.35, TABLE_HEIGHT + 0.50];

/// Table surface extent, min corner (x, y). Longer than the gripper
/// workspace on the +x side so slide targets sit beyond arm reach.
pub const TABLE_MIN: [f32; 2] = [-0.30, -0.40];

/// Table surface extent, max corner (x, y).
pub const TABLE_MAX: [f32; 2] = [0.80, 0.40];

// ============================================================================
// Control
// ============================================================================

/// Wall-clock duration of one control step (s). Velocities reported in
/// observations are displacements divided by this interval.
pub const CONTROL_DT: f32 = 0.04;

/// Cartesian displacement per unit action component (m). An action of 1.0
/// moves the gripper 5 cm along that axis in one control step.
pub const ACTION_POS_SCALE: f32 = 0.05;

/// Finger width change per unit of the fourth action component (m).
/// Positive opens, negative closes.
pub const ACTION_GRIP_SCALE: f32 = 0.05;

/// Maximum finger opening (m).
pub const FINGER_MAX_WIDTH: f32 = 0.10;

/// Gravitational acceleration (m/s^2), used when a released object falls.
pub const G: f32 = 9.81;

// ============================================================================
// Object Coupling
// ============================================================================

/// Gripper-to-object center distance below which a closing gripper grasps (m).
pub const GRASP_RADIUS: f32 = 0.05;

/// Finger width below which closed fingers hold the object; opening past it
/// releases a held object (m).
pub const GRASP_WIDTH: f32 = 0.05;

/// Gripper-to-object center distance below which a slide push makes
/// contact (m).
pub const PUSH_RADIUS: f32 = 0.05;

/// Per-step velocity retention of a sliding object. Friction against the
/// table bleeds off the rest.
pub const SLIDE_FRICTION_DECAY: f32 = 0.92;

/// Horizontal speed below which a sliding object is considered stopped (m/s).
pub const SLIDE_STOP_SPEED: f32 = 0.01;

// ============================================================================
// Episode Defaults
// ============================================================================

/// Default episode length in control steps. Episodes truncate here and
/// never terminate early.
pub const DEFAULT_HORIZON: usize = 50;

/// Goal distance below which the task counts as successful (m).
pub const DISTANCE_THRESHOLD: f32 = 0.05;

/// Default minimum distance between the initial achieved goal and the
/// sampled desired goal (m), so episodes never start solved.
pub const MIN_GOAL_DISTANCE: f32 = 0.10;

// ============================================================================
// Reset Distributions
// ============================================================================

/// Object spawn range around the home position for pick-and-place (m).
pub const OBJECT_SPAWN_RANGE: f32 = 0.15;

/// Minimum horizontal distance between a spawned object and the gripper's
/// home position (m); spawns closer than this are resampled.
pub const OBJECT_GRIPPER_CLEARANCE: f32 = 0.10;

/// Object spawn range around the home position for slide (m).
pub const SLIDE_SPAWN_RANGE: f32 = 0.10;

/// Goal sampling range around the home position (m), used by reach and
/// pick-and-place.
pub const GOAL_RANGE: f32 = 0.15;

/// Probability that a pick-and-place goal is placed in the air.
pub const AIR_GOAL_PROB: f32 = 0.5;

/// Maximum height offset above the table for airborne goals (m).
pub const AIR_GOAL_MAX_HEIGHT: f32 = 0.45;

/// Forward offset of the slide goal distribution from home (m).
pub const SLIDE_GOAL_OFFSET: f32 = 0.40;

/// Slide goal sampling range around the offset point (m).
pub const SLIDE_GOAL_RANGE: f32 = 0.30;

// ============================================================================
// Helper Functions
// ============================================================================

/// Euclidean distance between two 3-D points stored as slices.
#[inline(always)]
pub fn dist3(a: &[f32], b: &[f32]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Horizontal (x, y) distance between two 3-D points.
#[inline(always)]
pub fn dist_xy(a: &[f32], b: &[f32]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    (dx * dx + dy * dy).sqrt()
}

/// Clamp a gripper position to the reachable workspace.
#[inline(always)]
pub fn clamp_to_workspace(pos: [f32; 3]) -> [f32; 3] {
    [
        pos[0].clamp(WORKSPACE_MIN[0], WORKSPACE_MAX[0]),
        pos[1].clamp(WORKSPACE_MIN[1], WORKSPACE_MAX[1]),
        pos[2].clamp(WORKSPACE_MIN[2], WORKSPACE_MAX[2]),
    ]
}

/// Clamp an object position to the table surface extent.
#[inline(always)]
pub fn clamp_to_table(pos: [f32; 3]) -> [f32; 3] {
    [
        pos[0].clamp(TABLE_MIN[0], TABLE_MAX[0]),
        pos[1].clamp(TABLE_MIN[1], TABLE_MAX[1]),
        pos[2].max(OBJECT_REST_HEIGHT),
    ]
}
