// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The image buffer a render writes into.

use crate::colour::PixelColour;
use crate::errors::RenderError;
use crate::viewport::{ImageSize, CHANNELS};

/// A row-major RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    size: ImageSize,
    pixels: Vec<u8>,
}

impl Canvas {
    /// Allocates a zeroed buffer.  Very large images fail here with
    /// `ResourceExhaustion` instead of aborting the process.
    pub fn new(size: ImageSize) -> Result<Canvas, RenderError> {
        let bytes = size.bytes();
        let mut pixels: Vec<u8> = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| RenderError::ResourceExhaustion { bytes })?;
        pixels.resize(bytes, 0);
        Ok(Canvas { size, pixels })
    }

    /// Dimensions of the image.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Reads one pixel.  Panics if `(x, y)` is off the canvas.
    pub fn pixel(&self, x: usize, y: usize) -> PixelColour {
        assert!(x < self.size.width() && y < self.size.height());
        let offset = self.offset(x, y);
        let mut px = [0u8; CHANNELS];
        px.copy_from_slice(&self.pixels[offset..offset + CHANNELS]);
        PixelColour(px)
    }

    /// The raw RGBA bytes, row by row, as an encoder wants them.
    pub fn as_raw(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the canvas, returning its bytes.
    pub fn into_raw(self) -> Vec<u8> {
        self.pixels
    }

    pub(crate) fn offset(&self, x: usize, y: usize) -> usize {
        y * self.size.row_bytes() + x * CHANNELS
    }

    pub(crate) fn put(&mut self, x: usize, y: usize, colour: PixelColour) {
        let offset = self.offset(x, y);
        self.pixels[offset..offset + CHANNELS].copy_from_slice(&colour.0);
    }

    /// Splits the buffer into one exclusive slice per row, tagged with
    /// the row index.  Each slice is handed to exactly one writer.
    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = (usize, &mut [u8])> {
        self.pixels.chunks_mut(self.size.row_bytes()).enumerate()
    }
}

/// Writes a colour into pixel `x` of a row slice.
#[inline]
pub(crate) fn put_in_row(row: &mut [u8], x: usize, colour: PixelColour) {
    let offset = x * CHANNELS;
    row[offset..offset + CHANNELS].copy_from_slice(&colour.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_zeroed_and_sized() {
        let canvas = Canvas::new(ImageSize::new(3, 2).unwrap()).unwrap();
        assert_eq!(canvas.as_raw().len(), 24);
        assert!(canvas.as_raw().iter().all(|b| *b == 0));
    }

    #[test]
    fn put_and_read_back() {
        let mut canvas = Canvas::new(ImageSize::new(3, 2).unwrap()).unwrap();
        canvas.put(2, 1, PixelColour::WHITE);
        canvas.put(0, 0, PixelColour::gray(7));
        assert_eq!(canvas.pixel(2, 1), PixelColour::WHITE);
        assert_eq!(canvas.pixel(0, 0), PixelColour::gray(7));
        assert_eq!(canvas.pixel(1, 0), PixelColour([0, 0, 0, 0]));
        assert_eq!(&canvas.as_raw()[20..24], &[255, 255, 255, 255]);
    }

    #[test]
    fn rows_are_disjoint_and_complete() {
        let mut canvas = Canvas::new(ImageSize::new(5, 4).unwrap()).unwrap();
        let rows: Vec<(usize, &mut [u8])> = canvas.rows_mut().collect();
        assert_eq!(rows.len(), 4);
        for (i, (row, pixels)) in rows.into_iter().enumerate() {
            assert_eq!(row, i);
            assert_eq!(pixels.len(), 20);
            put_in_row(pixels, 4, PixelColour::gray(row as u8));
        }
        for row in 0..4 {
            assert_eq!(canvas.pixel(4, row), PixelColour::gray(row as u8));
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn absurd_buffers_fail_to_allocate() {
        let size = ImageSize::new(1 << 30, 1 << 30).unwrap();
        match Canvas::new(size) {
            Err(RenderError::ResourceExhaustion { bytes }) => assert_eq!(bytes, 1 << 62),
            other => panic!("expected ResourceExhaustion, got {:?}", other),
        }
    }

    #[test]
    #[should_panic]
    fn reading_off_the_canvas_panics() {
        let canvas = Canvas::new(ImageSize::new(2, 2).unwrap()).unwrap();
        canvas.pixel(2, 0);
    }
}
