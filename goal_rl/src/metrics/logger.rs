//! Training loggers.
//!
//! Backends for periodic training metrics: a columned console table, a CSV
//! file for offline analysis, and a fan-out combinator.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::runners::TrainerStats;

/// One row of training metrics.
#[derive(Debug, Clone)]
pub struct TrainingSnapshot {
    /// Gradient steps taken.
    pub step: usize,
    /// Total environment steps.
    pub env_steps: usize,
    /// Completed episodes.
    pub episodes: usize,
    /// Success rate over the recent episode window.
    pub success_rate: f32,
    /// Mean episode return over the recent window.
    pub avg_reward: f32,
    /// Critic (Q) loss.
    pub critic_loss: f32,
    /// Actor (policy) loss.
    pub actor_loss: f32,
    /// Entropy temperature, zero for algorithms without one.
    pub alpha: f32,
    /// Environment steps per second.
    pub fps: f32,
}

impl TrainingSnapshot {
    pub fn new(step: usize, env_steps: usize, episodes: usize, avg_reward: f32) -> Self {
        Self {
            step,
            env_steps,
            episodes,
            success_rate: 0.0,
            avg_reward,
            critic_loss: 0.0,
            actor_loss: 0.0,
            alpha: 0.0,
            fps: 0.0,
        }
    }

    /// Bridge from the trainer's stats callback.
    pub fn from_stats(stats: &TrainerStats) -> Self {
        Self {
            step: stats.train_steps,
            env_steps: stats.env_steps,
            episodes: stats.episodes,
            success_rate: stats.success_rate,
            avg_reward: stats.mean_return,
            critic_loss: stats.critic_loss,
            actor_loss: stats.actor_loss,
            alpha: stats.alpha,
            fps: stats.sps,
        }
    }

    pub fn with_success_rate(mut self, rate: f32) -> Self {
        self.success_rate = rate;
        self
    }

    pub fn with_losses(mut self, critic_loss: f32, actor_loss: f32) -> Self {
        self.critic_loss = critic_loss;
        self.actor_loss = actor_loss;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }
}

/// Logging backend.
pub trait MetricsLogger: Send {
    /// Log one snapshot.
    fn log(&mut self, snapshot: &TrainingSnapshot);

    /// Flush buffered output.
    fn flush(&mut self);
}

/// Columned console table, header printed once.
pub struct ConsoleLogger {
    /// Minimum gradient steps between rows.
    log_interval: usize,
    last_log_step: usize,
    show_header: bool,
}

impl ConsoleLogger {
    pub fn new(log_interval: usize) -> Self {
        Self {
            log_interval,
            last_log_step: 0,
            show_header: true,
        }
    }

    fn print_header(&self) {
        println!(
            "{:>9} {:>10} {:>8} {:>8} {:>10} {:>10} {:>10} {:>7} {:>7}",
            "Step", "EnvSteps", "Episodes", "Succ%", "Reward", "CriticL", "ActorL", "Alpha", "SPS"
        );
        println!("{}", "-".repeat(88));
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        if snapshot.step < self.last_log_step + self.log_interval && snapshot.step != 0 {
            return;
        }

        if self.show_header {
            self.print_header();
            self.show_header = false;
        }

        println!(
            "{:>9} {:>10} {:>8} {:>8.1} {:>10.2} {:>10.4} {:>10.4} {:>7.3} {:>7.0}",
            snapshot.step,
            snapshot.env_steps,
            snapshot.episodes,
            snapshot.success_rate * 100.0,
            snapshot.avg_reward,
            snapshot.critic_loss,
            snapshot.actor_loss,
            snapshot.alpha,
            snapshot.fps
        );

        self.last_log_step = snapshot.step;
    }

    fn flush(&mut self) {
        // stdout is line-buffered, nothing to do
    }
}

/// CSV file logger for offline analysis. Flushes on drop.
pub struct CsvLogger {
    writer: BufWriter<File>,
    start_time: Instant,
}

impl CsvLogger {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "step,env_steps,episodes,success_rate,avg_reward,critic_loss,actor_loss,alpha,fps,elapsed_secs"
        )?;

        Ok(Self {
            writer,
            start_time: Instant::now(),
        })
    }
}

impl MetricsLogger for CsvLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        let elapsed = self.start_time.elapsed().as_secs_f32();

        let _ = writeln!(
            self.writer,
            "{},{},{},{:.4},{:.4},{:.6},{:.6},{:.6},{:.1},{:.2}",
            snapshot.step,
            snapshot.env_steps,
            snapshot.episodes,
            snapshot.success_rate,
            snapshot.avg_reward,
            snapshot.critic_loss,
            snapshot.actor_loss,
            snapshot.alpha,
            snapshot.fps,
            elapsed
        );
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Fan-out to several backends.
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
        }
    }

    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }
}

impl Default for MultiLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, snapshot: &TrainingSnapshot) {
        for logger in &mut self.loggers {
            logger.log(snapshot);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}
