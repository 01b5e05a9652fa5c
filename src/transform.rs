//! Contains the transformations that take a pixel on the integral
//! raster plane to a point on the complex plane.  Each transform is a
//! small, pure mapping from one complex number to another; a
//! `TransformStack` chains them in order, leftmost first.
use num::complex::Complex64;

/// The iteration factor used when the caller does not pick one.
pub const DEFAULT_ITERATION_FACTOR: f64 = 10.0;

/// A single step of the pixel-to-plane mapping.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Transform {
    /// Returns its input untouched.
    Identity,
    /// Moves the origin to the center of a raster and flips the y-axis
    /// so that up is positive imaginary.
    PixelToCentered {
        /// Half the raster width.
        half_width: f64,
        /// Half the raster height.
        half_height: f64,
    },
    /// Multiplies by `e^(iθ)`, with the sine and cosine precomputed.
    Rotate {
        /// cos(θ)
        cos: f64,
        /// sin(θ)
        sin: f64,
    },
    /// Divides both parts by the scale factor.
    Scale(f64),
    /// Adds a complex offset.
    Translate(Complex64),
}

impl Transform {
    /// Centers a `width` x `height` raster on the origin.
    pub fn pixel_to_centered(width: u32, height: u32) -> Transform {
        Transform::PixelToCentered {
            half_width: f64::from(width) / 2.0,
            half_height: f64::from(height) / 2.0,
        }
    }

    /// Rotation by `theta` radians.
    pub fn rotate(theta: f64) -> Transform {
        if theta == 0.0 {
            return Transform::Identity;
        }
        Transform::Rotate {
            cos: theta.cos(),
            sin: theta.sin(),
        }
    }

    /// Zoom by `scale` pixels per plane unit.  A zero scale is accepted
    /// and produces infinities.
    pub fn scale(scale: f64) -> Transform {
        if scale == 1.0 {
            return Transform::Identity;
        }
        Transform::Scale(scale)
    }

    /// Shift by `offset`.
    pub fn translate(offset: Complex64) -> Transform {
        if offset.re == 0.0 && offset.im == 0.0 {
            return Transform::Identity;
        }
        Transform::Translate(offset)
    }

    /// Apply this transform to `c`.
    #[inline]
    pub fn apply(&self, c: Complex64) -> Complex64 {
        match *self {
            Transform::Identity => c,
            Transform::PixelToCentered {
                half_width,
                half_height,
            } => Complex64::new(c.re - half_width, -(c.im - half_height)),
            Transform::Rotate { cos, sin } => {
                Complex64::new(c.re * cos - c.im * sin, c.re * sin + c.im * cos)
            }
            Transform::Scale(scale) => Complex64::new(c.re / scale, c.im / scale),
            Transform::Translate(offset) => c + offset,
        }
    }
}

/// An ordered chain of transforms.  Applying the stack applies each
/// member in the order it was pushed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformStack {
    transforms: Vec<Transform>,
}

impl TransformStack {
    /// The empty stack, which is the identity.
    pub fn new() -> Self {
        TransformStack::default()
    }

    /// Append a transform to the end of the chain.
    pub fn then(mut self, transform: Transform) -> Self {
        if transform != Transform::Identity {
            self.transforms.push(transform);
        }
        self
    }

    /// Append every transform of `other`, so that stacks compose.
    pub fn extend(mut self, other: &TransformStack) -> Self {
        self.transforms.extend_from_slice(&other.transforms);
        self
    }

    /// The transforms that will actually run.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Run `c` through the whole chain.
    #[inline]
    pub fn apply(&self, c: Complex64) -> Complex64 {
        self.transforms.iter().fold(c, |c, t| t.apply(c))
    }

    /// Maps the pixel at column `x`, row `y` through the chain.
    #[inline]
    pub fn project(&self, x: u32, y: u32) -> Complex64 {
        self.apply(Complex64::new(f64::from(x), f64::from(y)))
    }
}

impl From<Vec<Transform>> for TransformStack {
    fn from(transforms: Vec<Transform>) -> Self {
        transforms
            .into_iter()
            .fold(TransformStack::new(), TransformStack::then)
    }
}

/// The standard pixel-to-plane mapping used by every render: center the
/// raster, rotate, scale, then translate.
pub fn base_transform(
    width: u32,
    height: u32,
    rotate: f64,
    scale: f64,
    translate: Complex64,
) -> TransformStack {
    TransformStack::new()
        .then(Transform::pixel_to_centered(width, height))
        .then(Transform::rotate(rotate))
        .then(Transform::scale(scale))
        .then(Transform::translate(translate))
}

/// The scale at which the radius-2 disc just fits inside the shorter
/// side of the raster.
pub fn required_scale(width: u32, height: u32) -> f64 {
    f64::from(width.min(height)) / 4.0
}

/// How many iterations it takes to resolve boundary detail at `scale`.
/// `factor` is a quality knob: more iterations per doubling of zoom gives
/// a sharper boundary at a proportional cost.  Scales at or below 1
/// (and anything non-finite) need no iterations at all.
pub fn max_iterations_for_scale(scale: f64, factor: f64) -> usize {
    let iterations = (scale.ln() * factor).floor();
    if iterations.is_finite() && iterations > 0.0 {
        iterations as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::PI;

    fn bits(c: Complex64) -> (u64, u64) {
        (c.re.to_bits(), c.im.to_bits())
    }

    #[test]
    fn neutral_transforms_are_bitwise_identity() {
        let stack = TransformStack::new()
            .then(Transform::scale(1.0))
            .then(Transform::rotate(0.0))
            .then(Transform::translate(Complex64::new(0.0, 0.0)));
        assert!(stack.transforms().is_empty());

        let mut rng = StdRng::seed_from_u64(7);
        let mut points: Vec<Complex64> = (0..1000)
            .map(|_| Complex64::new(rng.gen::<f64>() * 1e6 - 5e5, rng.gen::<f64>() * 1e-6))
            .collect();
        points.push(Complex64::new(-0.0, -0.0));
        points.push(Complex64::new(std::f64::NAN, std::f64::INFINITY));
        for c in points {
            assert_eq!(bits(stack.apply(c)), bits(c));
            assert_eq!(bits(Transform::Identity.apply(c)), bits(c));
        }
    }

    #[test]
    fn pixel_to_centered_flips_y() {
        let t = Transform::pixel_to_centered(16, 10);
        assert_eq!(t.apply(Complex64::new(8.0, 5.0)), Complex64::new(0.0, 0.0));
        assert_eq!(t.apply(Complex64::new(0.0, 0.0)), Complex64::new(-8.0, 5.0));
        assert_eq!(t.apply(Complex64::new(16.0, 10.0)), Complex64::new(8.0, -5.0));
    }

    #[test]
    fn rotate_quarter_turn() {
        let c = Transform::rotate(PI / 2.0).apply(Complex64::new(1.0, 0.0));
        assert!((c.re - 0.0).abs() < 1e-12);
        assert!((c.im - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scale_divides() {
        let c = Transform::scale(4.0).apply(Complex64::new(8.0, -2.0));
        assert_eq!(c, Complex64::new(2.0, -0.5));
    }

    #[test]
    fn zero_scale_propagates_infinity() {
        let c = Transform::scale(0.0).apply(Complex64::new(1.0, 0.0));
        assert!(c.re.is_infinite());
        assert!(c.im.is_nan());
    }

    #[test]
    fn stacks_apply_in_order() {
        let scale_then_shift = TransformStack::new()
            .then(Transform::scale(2.0))
            .then(Transform::translate(Complex64::new(1.0, 0.0)));
        let shift_then_scale = TransformStack::new()
            .then(Transform::translate(Complex64::new(1.0, 0.0)))
            .then(Transform::scale(2.0));
        let c = Complex64::new(4.0, 0.0);
        assert_eq!(scale_then_shift.apply(c), Complex64::new(3.0, 0.0));
        assert_eq!(shift_then_scale.apply(c), Complex64::new(2.5, 0.0));
    }

    #[test]
    fn composition_is_associative() {
        let a = TransformStack::from(vec![Transform::rotate(0.3), Transform::scale(3.0)]);
        let b = TransformStack::from(vec![Transform::translate(Complex64::new(-0.5, 0.25))]);
        let c = TransformStack::from(vec![Transform::pixel_to_centered(7, 9)]);
        let left = a.clone().extend(&b).extend(&c);
        let right = a.clone().extend(&b.clone().extend(&c));
        let point = Complex64::new(3.0, 4.0);
        assert_eq!(bits(left.apply(point)), bits(right.apply(point)));
        assert_eq!(bits(left.apply(point)), bits(c.apply(b.apply(a.apply(point)))));
    }

    #[test]
    fn base_transform_maps_center_and_corner() {
        let t = base_transform(16, 16, 0.0, 4.0, Complex64::new(0.0, 0.0));
        assert_eq!(t.project(8, 8), Complex64::new(0.0, 0.0));
        assert_eq!(t.project(0, 0), Complex64::new(-2.0, 2.0));
        assert_eq!(t.project(0, 16), Complex64::new(-2.0, -2.0));
    }

    #[test]
    fn required_scale_uses_short_side() {
        assert_eq!(required_scale(16, 16), 4.0);
        assert_eq!(required_scale(800, 600), 150.0);
    }

    #[test]
    fn iterations_grow_with_scale() {
        assert_eq!(max_iterations_for_scale(1.0, 10.0), 0);
        assert_eq!(max_iterations_for_scale(0.5, 10.0), 0);
        assert_eq!(max_iterations_for_scale(0.0, 10.0), 0);
        // ln(100) = 4.605...
        assert_eq!(max_iterations_for_scale(100.0, 10.0), 46);
        assert_eq!(max_iterations_for_scale(100.0, 4.5), 20);
        assert!(max_iterations_for_scale(1e6, 10.0) > max_iterations_for_scale(1e3, 10.0));
    }
}
