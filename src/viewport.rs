// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining its leftlower and rightupper corners.
use num::Complex;

use crate::errors::RenderError;

/// Bytes per pixel in the image buffer: R, G, B, A.
pub const CHANNELS: usize = 4;

/// PNG stores each side as a 31-bit integer.
pub const MAX_SIDE: i64 = i32::max_value() as i64;

/// The width and height of an integral plane that is assumed to start
/// at 0,0.  Only constructible through `ImageSize::new`, which
/// guarantees both sides are positive and that the buffer they
/// describe is addressable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

impl ImageSize {
    /// Validates a requested size.  Takes signed numbers because that
    /// is what people type; anything at or below zero is refused, as
    /// is any side longer than the 2^31-1 pixels PNG allows, or any
    /// size whose RGBA buffer would overflow `usize`.
    pub fn new(width: i64, height: i64) -> Result<ImageSize, RenderError> {
        if width <= 0 || height <= 0 {
            return Err(RenderError::invalid(format!(
                "image size must be positive, got {}x{}",
                width, height
            )));
        }
        if width > MAX_SIDE || height > MAX_SIDE {
            return Err(RenderError::invalid(format!(
                "image size {}x{} exceeds {} pixels per side",
                width, height, MAX_SIDE
            )));
        }
        let size = ImageSize {
            width: width as u32,
            height: height as u32,
        };
        size.checked_bytes().ok_or_else(|| {
            RenderError::invalid(format!(
                "a {}x{} image does not fit in addressable memory",
                width, height
            ))
        })?;
        Ok(size)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height as usize
    }

    /// Width and height as the image encoder wants them.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The number of bytes in one row of the RGBA buffer.
    pub fn row_bytes(&self) -> usize {
        self.width() * CHANNELS
    }

    /// The total number of bytes in the RGBA buffer.  Safe to call on
    /// any constructed `ImageSize`; construction has already proven
    /// the product fits.
    pub fn bytes(&self) -> usize {
        self.row_bytes() * self.height()
    }

    fn checked_bytes(&self) -> Option<usize> {
        self.width()
            .checked_mul(self.height())
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .filter(|bytes| *bytes <= isize::max_value() as usize)
    }
}

/// Describes a rectangle of the complex plane and the pixel grid it is
/// drawn onto.  Once built it never changes, and every worker reads it
/// without synchronization.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    size: ImageSize,
    leftlower: Complex<f64>,
    rightupper: Complex<f64>,
}

impl Viewport {
    /// Constructor.  Takes the pixel grid and two points describing
    /// the complex plane.
    pub fn new(
        size: ImageSize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Viewport, RenderError> {
        if !(rightupper.re > leftlower.re) {
            return Err(RenderError::invalid(
                "the left lower corner is not to the left of the right upper corner",
            ));
        }

        if !(rightupper.im > leftlower.im) {
            return Err(RenderError::invalid(
                "the left lower corner is not lower than the right upper corner",
            ));
        }

        Ok(Viewport {
            size,
            leftlower,
            rightupper,
        })
    }

    /// The whole set, from -2.5 to 1.0 on the real axis, with the
    /// imaginary range stretched by the aspect ratio so that pixels
    /// come out square.
    pub fn for_size(size: ImageSize) -> Viewport {
        let aspect = size.height() as f64 / size.width() as f64;
        let imag_range = 3.5 * aspect;
        Viewport {
            size,
            leftlower: Complex::new(-2.5, -imag_range / 2.0),
            rightupper: Complex::new(1.0, imag_range / 2.0),
        }
    }

    /// The pixel grid.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Minimum real and imaginary parts.
    pub fn leftlower(&self) -> Complex<f64> {
        self.leftlower
    }

    /// Maximum real and imaginary parts.
    pub fn rightupper(&self) -> Complex<f64> {
        self.rightupper
    }

    /// Given the column and row of a pixel on the integral plane,
    /// return the complex number at the equivalent location on the
    /// complex plane.  Plain linear interpolation; `x == width` lands
    /// exactly on the right edge.
    #[inline]
    pub fn pixel_to_point(&self, x: usize, y: usize) -> Complex<f64> {
        let (ll, ru) = (self.leftlower, self.rightupper);
        Complex::new(
            ll.re + (x as f64 / self.size.width as f64) * (ru.re - ll.re),
            ll.im + (y as f64 / self.size.height as f64) * (ru.im - ll.im),
        )
    }
}
