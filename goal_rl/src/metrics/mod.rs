//! Metrics logging and chart rendering.

pub mod logger;
pub mod plot;

pub use logger::{ConsoleLogger, CsvLogger, MetricsLogger, MultiLogger, TrainingSnapshot};
pub use plot::{plot_rewards, plot_success_rate, plot_trajectory, PlotError};
