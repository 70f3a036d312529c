#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the orbit of zero under `z*z + c` stays bounded.  To draw
//! it we map each pixel of an image to a point on the plane, iterate
//! until the orbit leaves a circle of radius two or we run out of
//! patience, and colour the pixel by how long it took to leave.  Points
//! that never leave are in the set and are painted black.
//!
//! Every pixel is independent of every other, which makes the image
//! embarrassingly parallel.  Points near the boundary of the set take
//! far longer than points far from it, however, so the work is split
//! by row: each row is a job, rows go into a queue, and a fixed pool
//! of workers drains the queue.  Each worker owns the row it is
//! drawing outright, so no two threads ever touch the same pixel.
//!
//! ```no_run
//! # fn main() -> Result<(), mandelbrot::RenderError> {
//! let canvas = mandelbrot::generate(800, 600, 4)?;
//! mandelbrot::write_png("mandelbrot.png", &canvas)?;
//! # Ok(())
//! # }
//! ```

pub mod cancellation;
pub mod canvas;
pub mod colour;
pub mod compare;
pub mod errors;
pub mod escape;
pub mod output;
pub mod render;
pub mod viewport;

pub use cancellation::CancelToken;
pub use canvas::Canvas;
pub use colour::{Palette, PixelColour};
pub use errors::RenderError;
pub use escape::{has_escaped, iterate_until_escape, mandelbrot_iteration, EscapeConfig};
pub use output::write_png;
pub use render::{generate, Renderer, Strategy};
pub use viewport::{ImageSize, Viewport};
