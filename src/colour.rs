// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns an escape time into a pixel.

/// One RGBA pixel, eight bits per channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelColour(pub [u8; 4]);

impl PixelColour {
    /// The colour of points that never escape.
    pub const BLACK: PixelColour = PixelColour([0, 0, 0, 255]);
    /// The colour of escaped points under the binary palette.
    pub const WHITE: PixelColour = PixelColour([255, 255, 255, 255]);

    /// A fully opaque gray.
    pub fn gray(intensity: u8) -> PixelColour {
        PixelColour([intensity, intensity, intensity, 255])
    }
}

/// How escape times become colours.  Points inside the set are black
/// under every palette.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Palette {
    /// Escaped points are gray, brighter the longer they took to leave.
    Grayscale,
    /// Escaped points are white.
    Binary,
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Grayscale
    }
}

impl Palette {
    /// `escape` is what `iterate_until_escape` returned for the
    /// point; `max_iterations` is the budget it was given.
    #[inline]
    pub fn colour_for(self, escape: Option<usize>, max_iterations: usize) -> PixelColour {
        match (self, escape) {
            (_, None) => PixelColour::BLACK,
            (Palette::Binary, Some(_)) => PixelColour::WHITE,
            (Palette::Grayscale, Some(i)) => {
                let i = i.min(max_iterations) as u64;
                let intensity = i * 255 / (max_iterations.max(1) as u64);
                PixelColour::gray(intensity as u8)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_points_are_black() {
        assert_eq!(Palette::Grayscale.colour_for(None, 100), PixelColour::BLACK);
        assert_eq!(Palette::Binary.colour_for(None, 100), PixelColour::BLACK);
    }

    #[test]
    fn grayscale_scales_with_escape_time() {
        let p = Palette::Grayscale;
        assert_eq!(p.colour_for(Some(0), 100), PixelColour::gray(0));
        assert_eq!(p.colour_for(Some(50), 100), PixelColour::gray(127));
        assert_eq!(p.colour_for(Some(100), 100), PixelColour::gray(255));
        assert_eq!(p.colour_for(Some(1), 3), PixelColour::gray(85));
    }

    #[test]
    fn grayscale_survives_huge_budgets() {
        let max = 200_000;
        assert_eq!(
            Palette::Grayscale.colour_for(Some(max), max),
            PixelColour::gray(255)
        );
    }

    #[test]
    fn binary_paints_every_escape_white() {
        for &i in &[0, 1, 99, 100] {
            assert_eq!(Palette::Binary.colour_for(Some(i), 100), PixelColour::WHITE);
        }
    }
}
