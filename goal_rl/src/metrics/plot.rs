//! Chart rendering for training and evaluation results.
//!
//! PNG charts via the plotters bitmap backend: per-episode reward curves,
//! windowed success rates, and top-down trajectory views from a fetch trace.

use plotters::prelude::*;
use std::error::Error;
use std::fmt;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (1000, 600);

/// Chart rendering failures.
#[derive(Debug)]
pub enum PlotError {
    /// Nothing to draw.
    Empty,
    /// Backend or drawing failure.
    Draw(String),
}

impl fmt::Display for PlotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlotError::Empty => write!(f, "no data points to plot"),
            PlotError::Draw(msg) => write!(f, "drawing failed: {}", msg),
        }
    }
}

impl Error for PlotError {}

fn draw_err<E: fmt::Display>(e: E) -> PlotError {
    PlotError::Draw(e.to_string())
}

/// Padded min/max of a value stream.
fn padded_bounds(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let span = (hi - lo).max(1e-3);
    (lo - span * 0.05, hi + span * 0.05)
}

/// Line chart of per-episode total rewards with circle markers.
pub fn plot_rewards(rewards: &[f32], title: &str, path: &Path) -> Result<(), PlotError> {
    if rewards.is_empty() {
        return Err(PlotError::Empty);
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let (y_lo, y_hi) = padded_bounds(rewards.iter().copied());
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(0..rewards.len() + 1, y_lo..y_hi)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Episode")
        .y_desc("Total Reward")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            rewards.iter().enumerate().map(|(i, &r)| (i + 1, r)),
            &BLUE,
        ))
        .map_err(draw_err)?;
    chart
        .draw_series(
            rewards
                .iter()
                .enumerate()
                .map(|(i, &r)| Circle::new((i + 1, r), 3, BLUE.filled())),
        )
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Windowed success-rate curve over episodes.
pub fn plot_success_rate(
    successes: &[bool],
    window: usize,
    title: &str,
    path: &Path,
) -> Result<(), PlotError> {
    if successes.is_empty() {
        return Err(PlotError::Empty);
    }
    let window = window.max(1);

    // Trailing-window success fraction per episode.
    let rates: Vec<f32> = (0..successes.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &successes[start..=i];
            slice.iter().filter(|&&s| s).count() as f32 / slice.len() as f32
        })
        .collect();

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(0..rates.len() + 1, 0f32..1.05f32)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Episode")
        .y_desc(format!("Success Rate (window {})", window))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            rates.iter().enumerate().map(|(i, &r)| (i + 1, r)),
            &RED,
        ))
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Top-down (XY) view of one episode: gripper path, optional object path,
/// and the goal position.
pub fn plot_trajectory(
    gripper: &[[f32; 3]],
    object: Option<&[[f32; 3]]>,
    goal: [f32; 3],
    title: &str,
    path: &Path,
) -> Result<(), PlotError> {
    if gripper.is_empty() {
        return Err(PlotError::Empty);
    }

    let xs = gripper
        .iter()
        .chain(object.unwrap_or(&[]).iter())
        .map(|p| p[0])
        .chain(std::iter::once(goal[0]));
    let ys = gripper
        .iter()
        .chain(object.unwrap_or(&[]).iter())
        .map(|p| p[1])
        .chain(std::iter::once(goal[1]));
    let (x_lo, x_hi) = padded_bounds(xs);
    let (y_lo, y_hi) = padded_bounds(ys);

    let root = BitMapBackend::new(path, (720, 720)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("x [m]")
        .y_desc("y [m]")
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            gripper.iter().map(|p| (p[0], p[1])),
            BLUE.stroke_width(2),
        ))
        .map_err(draw_err)?
        .label("gripper")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], BLUE.stroke_width(2)));

    if let Some(object_path) = object {
        if !object_path.is_empty() {
            chart
                .draw_series(LineSeries::new(
                    object_path.iter().map(|p| (p[0], p[1])),
                    GREEN.stroke_width(2),
                ))
                .map_err(draw_err)?
                .label("object")
                .legend(|(x, y)| {
                    PathElement::new(vec![(x, y), (x + 16, y)], GREEN.stroke_width(2))
                });
        }
    }

    chart
        .draw_series(std::iter::once(Cross::new(
            (goal[0], goal[1]),
            8,
            RED.stroke_width(3),
        )))
        .map_err(draw_err)?
        .label("goal")
        .legend(|(x, y)| Cross::new((x + 8, y), 5, RED.stroke_width(2)));

    // Start marker on the gripper path.
    let start = gripper[0];
    chart
        .draw_series(std::iter::once(Circle::new(
            (start[0], start[1]),
            5,
            BLUE.filled(),
        )))
        .map_err(draw_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.85))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}
