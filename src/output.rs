// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writes a finished canvas to disk as a PNG.

use image::png::PNGEncoder;
use image::ColorType;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::canvas::Canvas;
use crate::errors::RenderError;

/// Encodes `canvas` as an 8-bit RGBA PNG at `path`, replacing anything
/// already there.  Failures carry the destination and the underlying
/// I/O error.
pub fn write_png<P: AsRef<Path>>(path: P, canvas: &Canvas) -> Result<(), RenderError> {
    let path = path.as_ref();
    let failed = |cause| RenderError::EncodingFailure {
        path: path.display().to_string(),
        cause,
    };

    let output = File::create(path).map_err(failed)?;
    let (width, height) = canvas.size().dimensions();
    PNGEncoder::new(BufWriter::new(output))
        .encode(canvas.as_raw(), width, height, ColorType::RGBA(8))
        .map_err(failed)?;
    info!("wrote {}x{} image to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::PixelColour;
    use crate::viewport::ImageSize;

    #[test]
    fn png_round_trips_through_the_image_crate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let mut canvas = Canvas::new(ImageSize::new(3, 2).unwrap()).unwrap();
        canvas.put(0, 0, PixelColour::WHITE);
        canvas.put(2, 1, PixelColour::gray(40));
        write_png(&path, &canvas).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.into_raw(), canvas.into_raw());
    }

    #[test]
    fn unwritable_destination_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let canvas = Canvas::new(ImageSize::new(2, 2).unwrap()).unwrap();

        match write_png(&path, &canvas) {
            Err(RenderError::EncodingFailure { path: p, .. }) => {
                assert!(p.ends_with("out.png"));
            }
            other => panic!("expected EncodingFailure, got {:?}", other),
        }
    }
}
