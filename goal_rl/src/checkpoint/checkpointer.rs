//! Policy checkpointing during training.
//!
//! Saves numbered policy snapshots on a gradient-step interval, tracks the
//! best snapshot by success rate, and prunes old files. Loading requires a
//! freshly constructed model template to fill in, matching how Burn records
//! work.

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const POLICY_PREFIX: &str = "policy_";
const POLICY_SUFFIX: &str = ".bin";
const BEST_POLICY: &str = "best_policy.bin";

/// Configuration for [`Checkpointer`].
#[derive(Debug, Clone)]
pub struct CheckpointConfig {
    /// Directory to store policy snapshots.
    pub directory: PathBuf,
    /// Gradient steps between saves.
    pub save_interval: usize,
    /// Number of numbered snapshots to keep (0 = keep all).
    pub keep_last: usize,
    /// Track the best snapshot by metric (success rate).
    pub track_best: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./checkpoints"),
            save_interval: 10_000,
            keep_last: 5,
            track_best: true,
        }
    }
}

impl CheckpointConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }

    pub fn with_save_interval(mut self, interval: usize) -> Self {
        self.save_interval = interval.max(1);
        self
    }

    pub fn with_keep_last(mut self, n: usize) -> Self {
        self.keep_last = n;
        self
    }

    pub fn with_track_best(mut self, enabled: bool) -> Self {
        self.track_best = enabled;
        self
    }
}

/// Checkpointing failures.
#[derive(Debug)]
pub enum CheckpointError {
    Io(io::Error),
    Recorder(String),
    NoCheckpoints,
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckpointError::Io(e) => write!(f, "IO error: {}", e),
            CheckpointError::Recorder(e) => write!(f, "recorder error: {}", e),
            CheckpointError::NoCheckpoints => write!(f, "no checkpoints found"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        CheckpointError::Io(e)
    }
}

/// A saved snapshot on disk.
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub step: usize,
    pub metric: Option<f32>,
}

/// Saves and restores policy snapshots.
pub struct Checkpointer {
    config: CheckpointConfig,
    best_metric: f32,
    history: Vec<SnapshotInfo>,
}

impl Checkpointer {
    /// Create the checkpoint directory and a checkpointer over it.
    pub fn new(config: CheckpointConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.directory)?;

        Ok(Self {
            config,
            best_metric: f32::NEG_INFINITY,
            history: Vec::new(),
        })
    }

    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    pub fn should_save(&self, step: usize) -> bool {
        step > 0 && step % self.config.save_interval == 0
    }

    /// Save if the interval has elapsed; returns the path when a save happened.
    pub fn maybe_save<B: Backend, M: Module<B>>(
        &mut self,
        step: usize,
        policy: &M,
        metric: Option<f32>,
    ) -> Result<Option<PathBuf>, CheckpointError> {
        if !self.should_save(step) {
            return Ok(None);
        }
        self.save(step, policy, metric).map(Some)
    }

    /// Save a numbered snapshot unconditionally.
    ///
    /// With best tracking enabled and a metric provided, also refreshes
    /// `best_policy.bin` whenever the metric improves.
    pub fn save<B: Backend, M: Module<B>>(
        &mut self,
        step: usize,
        policy: &M,
        metric: Option<f32>,
    ) -> Result<PathBuf, CheckpointError> {
        let filename = format!("{}{:08}{}", POLICY_PREFIX, step, POLICY_SUFFIX);
        let path = self.config.directory.join(&filename);

        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        policy
            .clone()
            .save_file(&path, &recorder)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))?;

        self.history.push(SnapshotInfo {
            path: path.clone(),
            step,
            metric,
        });

        if self.config.track_best {
            if let Some(value) = metric {
                if value > self.best_metric {
                    self.best_metric = value;
                    let best_path = self.config.directory.join(BEST_POLICY);
                    policy
                        .clone()
                        .save_file(&best_path, &recorder)
                        .map_err(|e| CheckpointError::Recorder(e.to_string()))?;
                }
            }
        }

        self.prune()?;
        Ok(path)
    }

    /// Load a snapshot into a freshly constructed template.
    pub fn load<B: Backend, M: Module<B>>(
        &self,
        template: M,
        path: &Path,
        device: &B::Device,
    ) -> Result<M, CheckpointError> {
        let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
        template
            .load_file(path, &recorder, device)
            .map_err(|e| CheckpointError::Recorder(e.to_string()))
    }

    /// Load `best_policy.bin`.
    pub fn load_best<B: Backend, M: Module<B>>(
        &self,
        template: M,
        device: &B::Device,
    ) -> Result<M, CheckpointError> {
        let best_path = self.config.directory.join(BEST_POLICY);
        if !best_path.exists() {
            return Err(CheckpointError::NoCheckpoints);
        }
        self.load(template, &best_path, device)
    }

    /// Load the highest-numbered snapshot, returning it with its step.
    pub fn load_latest<B: Backend, M: Module<B>>(
        &self,
        template: M,
        device: &B::Device,
    ) -> Result<(M, usize), CheckpointError> {
        let latest = self
            .list_snapshots()?
            .pop()
            .ok_or(CheckpointError::NoCheckpoints)?;
        let policy = self.load(template, &latest.path, device)?;
        Ok((policy, latest.step))
    }

    /// Numbered snapshots on disk, ordered by step.
    pub fn list_snapshots(&self) -> Result<Vec<SnapshotInfo>, CheckpointError> {
        let mut snapshots: Vec<SnapshotInfo> = fs::read_dir(&self.config.directory)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let filename = path.file_name()?.to_str()?;
                let step = filename
                    .strip_prefix(POLICY_PREFIX)?
                    .strip_suffix(POLICY_SUFFIX)?
                    .parse()
                    .ok()?;
                Some(SnapshotInfo {
                    path,
                    step,
                    metric: None,
                })
            })
            .collect();

        snapshots.sort_by_key(|s| s.step);
        Ok(snapshots)
    }

    /// Best metric seen so far.
    pub fn best_metric(&self) -> f32 {
        self.best_metric
    }

    fn prune(&mut self) -> Result<(), CheckpointError> {
        if self.config.keep_last == 0 {
            return Ok(());
        }

        while self.history.len() > self.config.keep_last {
            let old = self.history.remove(0);
            let _ = fs::remove_file(&old.path);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::MlpActorConfig;
    use burn::backend::NdArray;
    use tempfile::tempdir;

    type B = NdArray<f32>;

    fn tiny_actor(device: &<B as Backend>::Device) -> crate::algorithms::MlpActor<B> {
        MlpActorConfig::new(4, 2).with_hidden_sizes((8, 8)).init(device)
    }

    #[test]
    fn test_should_save_interval() {
        let dir = tempdir().unwrap();
        let checkpointer =
            Checkpointer::new(CheckpointConfig::new(dir.path()).with_save_interval(100)).unwrap();

        assert!(!checkpointer.should_save(0));
        assert!(!checkpointer.should_save(99));
        assert!(checkpointer.should_save(100));
        assert!(checkpointer.should_save(200));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let mut checkpointer = Checkpointer::new(CheckpointConfig::new(dir.path())).unwrap();

        let actor = tiny_actor(&device);
        let path = checkpointer.save(500, &actor, None).unwrap();
        assert!(path.to_str().unwrap().contains("policy_00000500"));

        let template = tiny_actor(&device);
        let (_loaded, step) = checkpointer.load_latest::<B, _>(template, &device).unwrap();
        assert_eq!(step, 500);
    }

    #[test]
    fn test_best_tracking() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let mut checkpointer = Checkpointer::new(CheckpointConfig::new(dir.path())).unwrap();
        let actor = tiny_actor(&device);

        checkpointer.save(100, &actor, Some(0.2)).unwrap();
        checkpointer.save(200, &actor, Some(0.6)).unwrap();
        checkpointer.save(300, &actor, Some(0.4)).unwrap();

        assert_eq!(checkpointer.best_metric(), 0.6);

        let template = tiny_actor(&device);
        assert!(checkpointer.load_best::<B, _>(template, &device).is_ok());
    }

    #[test]
    fn test_prune_keeps_last_n() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let config = CheckpointConfig::new(dir.path())
            .with_keep_last(2)
            .with_track_best(false);
        let mut checkpointer = Checkpointer::new(config).unwrap();
        let actor = tiny_actor(&device);

        for step in [100, 200, 300, 400] {
            checkpointer.save(step, &actor, None).unwrap();
        }

        let snapshots = checkpointer.list_snapshots().unwrap();
        let steps: Vec<usize> = snapshots.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![300, 400]);
    }

    #[test]
    fn test_load_latest_without_saves_fails() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let checkpointer = Checkpointer::new(CheckpointConfig::new(dir.path())).unwrap();

        let template = tiny_actor(&device);
        assert!(matches!(
            checkpointer.load_latest::<B, _>(template, &device),
            Err(CheckpointError::NoCheckpoints)
        ));
    }

    #[test]
    fn test_maybe_save_respects_interval() {
        let dir = tempdir().unwrap();
        let device = Default::default();
        let config = CheckpointConfig::new(dir.path()).with_save_interval(100);
        let mut checkpointer = Checkpointer::new(config).unwrap();
        let actor = tiny_actor(&device);

        assert!(checkpointer.maybe_save(50, &actor, None).unwrap().is_none());
        assert!(checkpointer.maybe_save(100, &actor, None).unwrap().is_some());
    }
}
