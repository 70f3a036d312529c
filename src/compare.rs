// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Times the rendering strategies against one another.  The first
//! entry of every comparison is the baseline: speedups are relative to
//! it, and every other canvas is checked byte-for-byte against its
//! canvas.

use log::debug;
use std::fmt;
use std::time::{Duration, Instant};

use crate::canvas::Canvas;
use crate::errors::RenderError;
use crate::render::{Renderer, Strategy};

/// One timed render.
#[derive(Clone, Debug)]
pub struct Timing {
    /// What was run.
    pub strategy: Strategy,
    /// Wall-clock time for the render.
    pub elapsed: Duration,
    /// Baseline time divided by this time.
    pub speedup: f64,
    /// Speedup divided by worker count, for pooled runs.
    pub efficiency: Option<f64>,
    /// Did the canvas equal the baseline's?
    pub matches_baseline: bool,
}

/// A list of timings, printable as a table.
#[derive(Clone, Debug, Default)]
pub struct Report {
    /// In the order they were run.
    pub timings: Vec<Timing>,
}

impl Report {
    /// True if every canvas matched the baseline.
    pub fn all_match(&self) -> bool {
        self.timings.iter().all(|t| t.matches_baseline)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{:<20} {:>12} {:>9} {:>11} {:>6}",
            "Strategy", "Time", "Speedup", "Efficiency", "Same"
        )?;
        for t in &self.timings {
            let efficiency = match t.efficiency {
                Some(e) => format!("{:.1}%", e * 100.0),
                None => "-".to_string(),
            };
            writeln!(
                f,
                "{:<20} {:>10}ms {:>8.2}x {:>11} {:>6}",
                t.strategy.to_string(),
                t.elapsed.as_millis(),
                t.speedup,
                efficiency,
                if t.matches_baseline { "yes" } else { "NO" }
            )?;
        }
        Ok(())
    }
}

fn ratio(baseline: Duration, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        baseline.as_secs_f64() / secs
    } else {
        1.0
    }
}

/// Renders once with each strategy, in order.
pub fn compare_strategies(
    renderer: &Renderer,
    strategies: &[Strategy],
) -> Result<Report, RenderError> {
    let mut report = Report::default();
    let mut baseline: Option<(Duration, Canvas)> = None;

    for &strategy in strategies {
        let started = Instant::now();
        let canvas = renderer.render(strategy)?;
        let elapsed = started.elapsed();
        debug!("{} took {:?}", strategy, elapsed);

        let (base_time, matches_baseline) = match &baseline {
            None => (elapsed, true),
            Some((time, oracle)) => (*time, canvas == *oracle),
        };
        let speedup = ratio(base_time, elapsed);
        let efficiency = match strategy {
            Strategy::WorkerPool(n) => Some(speedup / n as f64),
            _ => None,
        };

        report.timings.push(Timing {
            strategy,
            elapsed,
            speedup,
            efficiency,
            matches_baseline,
        });
        if baseline.is_none() {
            baseline = Some((elapsed, canvas));
        }
    }
    Ok(report)
}

/// Renders with a worker pool of each of the given sizes.  The first
/// count is the baseline, so start with 1 for true efficiency figures.
pub fn worker_scaling(renderer: &Renderer, counts: &[usize]) -> Result<Report, RenderError> {
    let strategies: Vec<Strategy> = counts.iter().map(|&n| Strategy::WorkerPool(n)).collect();
    compare_strategies(renderer, &strategies)
}

/// The three strategies side by side: sequential first, then one task
/// per row, then a pool with one worker per core.
pub fn standard_comparison(renderer: &Renderer) -> Result<Report, RenderError> {
    compare_strategies(
        renderer,
        &[Strategy::Sequential, Strategy::RowTasks, Strategy::pool()],
    )
}
