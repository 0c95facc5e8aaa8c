//! Trajectory capture for rendering.
//!
//! There is no graphical renderer; `RenderMode::Trace` instead records the
//! gripper and object paths of environment 0 into a bounded buffer that
//! plotting code can read after (or during) an episode. The trace restarts
//! whenever environment 0 resets, so it always holds the current episode.

/// Default number of steps a trace retains.
pub const DEFAULT_TRACE_CAPACITY: usize = 512;

/// Bounded per-episode record of gripper/object/goal positions.
#[derive(Clone, Debug)]
pub struct TrajectoryTrace {
    gripper: Vec<[f32; 3]>,
    object: Vec<[f32; 3]>,
    goal: [f32; 3],
    capacity: usize,
}

impl TrajectoryTrace {
    /// Empty trace retaining at most `capacity` steps.
    pub fn new(capacity: usize) -> Self {
        Self {
            gripper: Vec::new(),
            object: Vec::new(),
            goal: [0.0; 3],
            capacity,
        }
    }

    /// Clear recorded paths and set the goal for the new episode.
    pub fn restart(&mut self, goal: [f32; 3]) {
        self.gripper.clear();
        self.object.clear();
        self.goal = goal;
    }

    /// Append one step. Recording stops silently once the capacity is
    /// reached; a bounded trace must never grow with a long-running loop.
    pub fn record(&mut self, gripper: [f32; 3], object: Option<[f32; 3]>) {
        if self.gripper.len() >= self.capacity {
            return;
        }
        self.gripper.push(gripper);
        if let Some(pos) = object {
            self.object.push(pos);
        }
    }

    /// Recorded gripper path, one entry per step.
    pub fn gripper_path(&self) -> &[[f32; 3]] {
        &self.gripper
    }

    /// Recorded object path, empty for tasks without an object.
    pub fn object_path(&self) -> &[[f32; 3]] {
        &self.object
    }

    /// Desired goal of the traced episode.
    pub fn goal(&self) -> [f32; 3] {
        self.goal
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.gripper.len()
    }

    /// Whether nothing has been recorded since the last restart.
    pub fn is_empty(&self) -> bool {
        self.gripper.is_empty()
    }

    /// Whether the trace has hit its capacity.
    pub fn is_full(&self) -> bool {
        self.gripper.len() >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_paths_and_goal() {
        let mut trace = TrajectoryTrace::new(16);
        trace.restart([0.1, 0.2, 0.3]);
        trace.record([0.0, 0.0, 0.5], Some([0.0, 0.0, 0.42]));
        trace.record([0.05, 0.0, 0.5], Some([0.0, 0.0, 0.42]));

        assert_eq!(trace.len(), 2);
        assert_eq!(trace.gripper_path()[1], [0.05, 0.0, 0.5]);
        assert_eq!(trace.object_path().len(), 2);
        assert_eq!(trace.goal(), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_capacity_bound() {
        let mut trace = TrajectoryTrace::new(3);
        trace.restart([0.0; 3]);
        for i in 0..10 {
            trace.record([i as f32, 0.0, 0.0], None);
        }
        assert_eq!(trace.len(), 3);
        assert!(trace.is_full());
        assert_eq!(trace.gripper_path()[2], [2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_restart_clears() {
        let mut trace = TrajectoryTrace::new(8);
        trace.restart([0.0; 3]);
        trace.record([1.0, 0.0, 0.0], Some([1.0, 0.0, 0.0]));

        trace.restart([0.5, 0.5, 0.5]);
        assert!(trace.is_empty());
        assert!(trace.object_path().is_empty());
        assert_eq!(trace.goal(), [0.5, 0.5, 0.5]);
    }
}
