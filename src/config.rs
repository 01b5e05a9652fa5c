//! Render configuration: everything a caller chooses about a picture,
//! gathered in one immutable value from which the transform, the
//! evaluator, and the renderer are derived.

use num::complex::Complex64;

use crate::error::RenderError;
use crate::escape::Evaluator;
use crate::render::Renderer;
use crate::transform::{
    base_transform, max_iterations_for_scale, required_scale, TransformStack,
    DEFAULT_ITERATION_FACTOR,
};

/// The largest supersampling exponent accepted.
pub const MAX_SMOOTH: u32 = 4;

/// What to render and how to split the work.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Rotation, in radians.
    pub rotate: f64,
    /// Zoom relative to the scale that just fits the radius-2 disc.
    pub zoom: f64,
    /// The point of the complex plane at the center of the image.
    pub center: Complex64,
    /// Iteration bound; derived from the scale when absent.
    pub max_iterations: Option<usize>,
    /// Iterations per unit of log-scale, used when `max_iterations` is
    /// absent.
    pub iteration_factor: f64,
    /// Exponent of the iterated function.
    pub power: f64,
    /// Band count; `default_worker_count` when absent.
    pub workers: Option<usize>,
    /// Supersampling: the image is rendered `2^smooth` times larger in
    /// each direction, then reduced to the output size.
    pub smooth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 1024,
            height: 1024,
            rotate: 0.0,
            zoom: 1.6,
            center: Complex64::new(-0.75, 0.0),
            max_iterations: None,
            iteration_factor: DEFAULT_ITERATION_FACTOR,
            power: 2.0,
            workers: None,
            smooth: 0,
        }
    }
}

impl Config {
    /// Rejects settings that would make a render impossible.  Odd
    /// geometry (a zero zoom, say) is not rejected; it just renders
    /// strangely.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyRaster {
                width: self.width,
                height: self.height,
            });
        }
        if self.workers == Some(0) {
            return Err(RenderError::NoWorkers);
        }
        if self.smooth > MAX_SMOOTH {
            return Err(RenderError::InvalidConfig(format!(
                "smooth must be at most {}, got {}",
                MAX_SMOOTH, self.smooth
            )));
        }
        let (w, h) = self.scaled_size();
        let bytes = w.checked_mul(h).and_then(|n| n.checked_mul(4));
        if w > u64::from(u32::MAX)
            || h > u64::from(u32::MAX)
            || bytes.map_or(true, |n| n > usize::MAX as u64)
        {
            return Err(RenderError::InvalidConfig(format!(
                "supersampled size {}x{} is too large",
                w, h
            )));
        }
        Ok(())
    }

    fn scaled_size(&self) -> (u64, u64) {
        (
            u64::from(self.width) << self.smooth,
            u64::from(self.height) << self.smooth,
        )
    }

    /// The size of the raster actually rendered, before any reduction.
    /// Only meaningful once `validate` has passed.
    pub fn render_size(&self) -> (u32, u32) {
        let (w, h) = self.scaled_size();
        (w as u32, h as u32)
    }

    /// Pixels per plane unit in the rendered raster.
    pub fn scale(&self) -> f64 {
        let (w, h) = self.render_size();
        self.zoom * required_scale(w, h)
    }

    /// The iteration bound, either as given or derived from the scale.
    pub fn iterations(&self) -> usize {
        self.max_iterations
            .unwrap_or_else(|| max_iterations_for_scale(self.scale(), self.iteration_factor))
    }

    /// The pixel-to-plane mapping for the rendered raster.
    pub fn transform(&self) -> TransformStack {
        let (w, h) = self.render_size();
        base_transform(w, h, self.rotate, self.scale(), self.center)
    }

    /// The escape-time function.
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::with_power(self.iterations(), self.power)
    }

    /// How the work gets split.
    pub fn renderer(&self) -> Result<Renderer, RenderError> {
        match self.workers {
            Some(workers) => Renderer::new(workers),
            None => Ok(Renderer::auto()),
        }
    }
}

/// `frames` powers evenly spaced from `from` to `to`, both ends
/// included.  One frame is just `from`.
pub fn power_sweep(from: f64, to: f64, frames: usize) -> Vec<f64> {
    match frames {
        0 => Vec::new(),
        1 => vec![from],
        _ => {
            let step = (to - from) / (frames - 1) as f64;
            (0..frames).map(|i| from + step * i as f64).collect()
        }
    }
}
