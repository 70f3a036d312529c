// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  Everything here is a pure function of
//! its arguments, which is what lets every strategy in `render`
//! produce the same bytes.

use num::Complex;

use crate::errors::RenderError;

/// Iteration budget used when nobody says otherwise.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Once an orbit's modulus exceeds 2 it is guaranteed to diverge.
pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

/// One step of the Mandelbrot recurrence.
#[inline]
pub fn mandelbrot_iteration(z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
    z * z + c
}

/// True if `z` lies strictly outside the circle of the given radius.
/// A point exactly on the circle still counts as inside.
#[inline]
pub fn has_escaped(z: Complex<f64>, radius: f64) -> bool {
    z.norm() > radius
}

/// Iterates `z` under `z*z + c` and returns the number of steps it
/// took to leave the circle, or nothing at all if it was still inside
/// after `max_iterations` steps.  A starting `z` that is already
/// outside escapes at step zero.
pub fn iterate_until_escape(
    z: Complex<f64>,
    c: Complex<f64>,
    max_iterations: usize,
    radius: f64,
) -> Option<usize> {
    let mut z = z;
    if has_escaped(z, radius) {
        return Some(0);
    }
    for i in 1..=max_iterations {
        z = mandelbrot_iteration(z, c);
        if has_escaped(z, radius) {
            return Some(i);
        }
    }
    None
}

/// The iteration budget and escape radius, shared read-only by every
/// worker during a render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeConfig {
    max_iterations: usize,
    escape_radius: f64,
}

impl Default for EscapeConfig {
    fn default() -> Self {
        EscapeConfig {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            escape_radius: DEFAULT_ESCAPE_RADIUS,
        }
    }
}

impl EscapeConfig {
    /// Both numbers must be positive; a zero budget would leave the
    /// colorer nothing to divide by.
    pub fn new(max_iterations: usize, escape_radius: f64) -> Result<Self, RenderError> {
        if max_iterations == 0 {
            return Err(RenderError::invalid("iteration budget must be at least 1"));
        }
        if !(escape_radius > 0.0) || !escape_radius.is_finite() {
            return Err(RenderError::invalid(format!(
                "escape radius must be a positive number, got {}",
                escape_radius
            )));
        }
        Ok(EscapeConfig {
            max_iterations,
            escape_radius,
        })
    }

    /// The iteration budget.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The escape radius.
    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    /// Escape time for the point `c`, starting the orbit at the origin.
    #[inline]
    pub fn calculate(&self, c: Complex<f64>) -> Option<usize> {
        iterate_until_escape(
            Complex::new(0.0, 0.0),
            c,
            self.max_iterations,
            self.escape_radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn c(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn iteration_simple() {
        let result = mandelbrot_iteration(c(0.0, 1.0), c(1.0, 0.0));
        assert!(result.norm() < 1e-10);
    }

    #[test]
    fn iteration_matches_recurrence_for_random_points() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let z = c(rng.gen_range(-2.0, 2.0), rng.gen_range(-2.0, 2.0));
            let k = c(rng.gen_range(-2.0, 2.0), rng.gen_range(-2.0, 2.0));
            let expected = c(
                z.re * z.re - z.im * z.im + k.re,
                2.0 * z.re * z.im + k.im,
            );
            let result = mandelbrot_iteration(z, k);
            assert!(
                (result - expected).norm() < 1e-10,
                "mandelbrot_iteration({}, {}) = {}; want {}",
                z,
                k,
                result,
                expected
            );
        }
    }

    #[test]
    fn escape_boundary() {
        let cases = [
            ("inside radius", c(1.0, 0.0), false),
            ("exactly on radius", c(2.0, 0.0), false),
            ("just outside", c(2.1, 0.0), true),
            ("far outside", c(10.0, 0.0), true),
            ("3-4-5 triangle", c(3.0, 4.0), true),
            ("imaginary only inside", c(0.0, 1.5), false),
            ("zero", c(0.0, 0.0), false),
        ];
        for &(name, z, expected) in cases.iter() {
            assert_eq!(has_escaped(z, 2.0), expected, "{}", name);
        }
    }

    #[test]
    fn escapes_immediately_when_already_outside() {
        assert_eq!(iterate_until_escape(c(10.0, 0.0), c(0.0, 0.0), 100, 2.0), Some(0));
    }

    #[test]
    fn escapes_after_first_step() {
        assert_eq!(iterate_until_escape(c(0.0, 0.0), c(2.1, 0.0), 100, 2.0), Some(1));
    }

    #[test]
    fn origin_exhausts_budget() {
        assert_eq!(iterate_until_escape(c(0.0, 0.0), c(0.0, 0.0), 50, 2.0), None);
    }

    #[test]
    fn cusp_exhausts_small_budget() {
        assert_eq!(iterate_until_escape(c(0.0, 0.0), c(0.25, 0.0), 10, 2.0), None);
    }

    #[test]
    fn calculate_classifies_points() {
        let config = EscapeConfig::default();
        assert_eq!(config.max_iterations(), 100);
        assert_eq!(config.calculate(c(0.0, 0.0)), None);
        assert_eq!(config.calculate(c(0.25, 0.0)), None);
        assert_eq!(config.calculate(c(-1.0, 0.0)), None);
        for &p in &[c(2.0, 0.0), c(10.0, 0.0), c(0.0, 1.5)] {
            match config.calculate(p) {
                Some(i) => assert!(i <= config.max_iterations()),
                None => panic!("{} should escape", p),
            }
        }
    }

    #[test]
    fn config_rejects_empty_budget_and_bad_radius() {
        assert!(EscapeConfig::new(0, 2.0).is_err());
        assert!(EscapeConfig::new(10, 0.0).is_err());
        assert!(EscapeConfig::new(10, -1.0).is_err());
        assert!(EscapeConfig::new(10, ::std::f64::NAN).is_err());
        assert!(EscapeConfig::new(10, ::std::f64::INFINITY).is_err());
        assert!(EscapeConfig::new(10, 4.0).is_ok());
    }
}
