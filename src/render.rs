// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The image generator.  A render allocates one canvas, splits it into
//! rows, and hands each row, along with exclusive ownership of its
//! slice of the canvas, to exactly one writer.  Since no two writers
//! ever hold the same row, the pixels need no locks at all; the only
//! synchronization is the job queue and the final join.
//!
//! Three strategies share the same per-pixel routine and therefore
//! produce byte-identical canvases:
//!
//! * `Sequential` walks every pixel on the calling thread.  It is the
//!   baseline the other two are checked against.
//! * `RowTasks` spawns one scoped thread per row.  Fine for small
//!   images, but concurrency grows with the height of the image.
//! * `WorkerPool(n)` spawns `n` threads, or one per row if the image
//!   has fewer rows, that pull rows off a bounded queue until it is
//!   closed and drained.
//!
//! Threads are started through the scope's builder, so a refused
//! spawn comes back as `SpawnFailure` rather than a panic.

use crossbeam::channel;
use crossbeam::thread::ScopedJoinHandle;
use itertools::iproduct;
use log::{debug, info};
use std::fmt;
use std::io;
use std::time::Instant;

use crate::cancellation::CancelToken;
use crate::canvas::{put_in_row, Canvas};
use crate::colour::{Palette, PixelColour};
use crate::errors::RenderError;
use crate::escape::EscapeConfig;
use crate::viewport::{ImageSize, Viewport};

/// How the rows of an image are spread across threads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// A plain double loop on the calling thread.
    Sequential,
    /// One thread per row, no upper bound.
    RowTasks,
    /// A fixed pool of this many workers sharing a queue of rows,
    /// capped at the height of the image.
    WorkerPool(usize),
}

impl Strategy {
    /// A worker pool with one worker per available core.
    pub fn pool() -> Strategy {
        Strategy::WorkerPool(num_cpus::get())
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::pool()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::RowTasks => write!(f, "row tasks"),
            Strategy::WorkerPool(n) => write!(f, "worker pool ({})", n),
        }
    }
}

/// Everything a render needs besides the strategy.  Once set, this
/// object should not be mutable: every worker reads it concurrently.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Renderer {
    viewport: Viewport,
    config: EscapeConfig,
    palette: Palette,
}

impl Renderer {
    /// A renderer for an explicit viewport, budget and palette.
    pub fn new(viewport: Viewport, config: EscapeConfig, palette: Palette) -> Self {
        Renderer {
            viewport,
            config,
            palette,
        }
    }

    /// The whole set at the given size, with default budget, radius
    /// and palette.
    pub fn for_size(size: ImageSize) -> Self {
        Renderer::new(
            Viewport::for_size(size),
            EscapeConfig::default(),
            Palette::default(),
        )
    }

    /// The region of the plane being drawn.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The iteration budget and escape radius.
    pub fn config(&self) -> &EscapeConfig {
        &self.config
    }

    /// Renders the image to completion.
    pub fn render(&self, strategy: Strategy) -> Result<Canvas, RenderError> {
        self.render_with(strategy, &CancelToken::new())
    }

    /// Renders the image, checking `cancel` between rows.  If the token
    /// is raised before every row has been drawn, the partial canvas is
    /// dropped and `Cancelled` is returned.
    pub fn render_with(
        &self,
        strategy: Strategy,
        cancel: &CancelToken,
    ) -> Result<Canvas, RenderError> {
        if let Strategy::WorkerPool(0) = strategy {
            return Err(RenderError::invalid("a worker pool needs at least one worker"));
        }

        let size = self.viewport.size();
        let mut canvas = Canvas::new(size)?;
        info!(
            "rendering {}x{} ({} iterations) with {}",
            size.width(),
            size.height(),
            self.config.max_iterations(),
            strategy
        );

        let started = Instant::now();
        let rows = match strategy {
            Strategy::Sequential => self.render_sequential(&mut canvas, cancel),
            Strategy::RowTasks => self.render_row_tasks(&mut canvas, cancel)?,
            Strategy::WorkerPool(workers) => self.render_pool(&mut canvas, workers, cancel)?,
        };

        if rows < size.height() {
            info!("render cancelled after {} of {} rows", rows, size.height());
            return Err(RenderError::Cancelled);
        }
        debug_assert_eq!(rows, size.height());
        info!("rendered {} rows in {:?}", rows, started.elapsed());
        Ok(canvas)
    }

    /// The colour of one pixel: map it, iterate it, paint it.
    #[inline]
    fn colour_at(&self, x: usize, y: usize) -> PixelColour {
        let c = self.viewport.pixel_to_point(x, y);
        self.palette
            .colour_for(self.config.calculate(c), self.config.max_iterations())
    }

    fn render_row(&self, row: usize, pixels: &mut [u8]) {
        for x in 0..self.viewport.size().width() {
            put_in_row(pixels, x, self.colour_at(x, row));
        }
    }

    /// Returns the number of complete rows drawn.
    fn render_sequential(&self, canvas: &mut Canvas, cancel: &CancelToken) -> usize {
        let size = canvas.size();
        for (y, x) in iproduct!(0..size.height(), 0..size.width()) {
            if x == 0 && cancel.is_cancelled() {
                return y;
            }
            canvas.put(x, y, self.colour_at(x, y));
        }
        size.height()
    }

    fn render_row_tasks(
        &self,
        canvas: &mut Canvas,
        cancel: &CancelToken,
    ) -> Result<usize, RenderError> {
        let rows = canvas.rows_mut();
        crossbeam::scope(|spawner| {
            let mut handles: Vec<ScopedJoinHandle<usize>> = Vec::new();
            let mut failure = None;

            for (row, pixels) in rows {
                if cancel.is_cancelled() {
                    break;
                }
                let task = spawner.builder().spawn(move |_| {
                    if cancel.is_cancelled() {
                        return 0;
                    }
                    self.render_row(row, pixels);
                    1
                });
                match task {
                    Ok(handle) => handles.push(handle),
                    Err(cause) => {
                        failure = Some(spawn_failure(handles.len(), cause));
                        break;
                    }
                }
            }

            let drawn = join_all(handles)?;
            failure.map_or(Ok(drawn), Err)
        })
        .map_err(|_| RenderError::WorkerPanicked)?
    }

    fn render_pool(
        &self,
        canvas: &mut Canvas,
        workers: usize,
        cancel: &CancelToken,
    ) -> Result<usize, RenderError> {
        let height = canvas.size().height();
        let workers = pool_size(workers, height);
        let rows = canvas.rows_mut();

        crossbeam::scope(|spawner| {
            // Room for every row, so the producer never waits on a
            // worker.
            let (jobs, queue) = channel::bounded::<(usize, &mut [u8])>(height);
            let mut handles: Vec<ScopedJoinHandle<usize>> = Vec::with_capacity(workers);
            let mut failure = None;

            for id in 0..workers {
                let queue = queue.clone();
                let worker = spawner
                    .builder()
                    .name(format!("mandel-worker-{}", id))
                    .spawn(move |_| {
                        let mut drawn = 0;
                        for (row, pixels) in queue.iter() {
                            // Keep draining so the queue empties even
                            // when cancelled.
                            if cancel.is_cancelled() {
                                continue;
                            }
                            self.render_row(row, pixels);
                            drawn += 1;
                        }
                        debug!("worker {} drew {} rows", id, drawn);
                        drawn
                    });
                match worker {
                    Ok(handle) => handles.push(handle),
                    Err(cause) => {
                        failure = Some(spawn_failure(handles.len(), cause));
                        break;
                    }
                }
            }
            drop(queue);

            if failure.is_none() {
                for job in rows {
                    if cancel.is_cancelled() || jobs.send(job).is_err() {
                        break;
                    }
                }
            }
            // Closing the queue only after the last row is in it is what
            // lets the workers tell "empty" from "finished".  On a failed
            // spawn it is closed empty, so the workers that did start
            // exit at once.
            drop(jobs);

            let drawn = join_all(handles)?;
            failure.map_or(Ok(drawn), Err)
        })
        .map_err(|_| RenderError::WorkerPanicked)?
    }
}

/// Workers beyond one per row would never receive a job.
fn pool_size(workers: usize, rows: usize) -> usize {
    workers.min(rows)
}

fn spawn_failure(spawned: usize, cause: io::Error) -> RenderError {
    info!("thread spawn failed after {} threads: {}", spawned, cause);
    RenderError::SpawnFailure { spawned, cause }
}

fn join_all(handles: Vec<ScopedJoinHandle<usize>>) -> Result<usize, RenderError> {
    handles
        .into_iter()
        .map(|handle| handle.join().map_err(|_| RenderError::WorkerPanicked))
        .sum()
}

/// Renders the whole set at `width` x `height` on a pool of `workers`
/// threads, with the default budget, radius and palette.
pub fn generate(width: i64, height: i64, workers: usize) -> Result<Canvas, RenderError> {
    let size = ImageSize::new(width, height)?;
    Renderer::for_size(size).render(Strategy::WorkerPool(workers))
}
