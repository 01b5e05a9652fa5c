// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colorizers turn an evaluated point into a pixel.
//!
//! A colorizer is a small closed set of strategies that nest: a constant
//! color, a palette indexed by iteration count, or a dispatch on whether
//! the point stayed bounded.  All of them are pure, so the same point
//! and result always give the same pixel; test images depend on that.

use image::{Luma, Pixel, Rgb, Rgba};
use num::complex::Complex64;

use crate::error::RenderError;
use crate::escape::Evaluation;

/// The default color type.
pub type Color = Rgba<u8>;

/// Pixels that have a natural white and black.
pub trait Monochrome: Pixel {
    /// Every channel at full intensity.
    fn white() -> Self;
    /// Every color channel at zero, fully opaque.
    fn black() -> Self;
}

impl Monochrome for Luma<u8> {
    fn white() -> Self {
        Luma([u8::MAX])
    }
    fn black() -> Self {
        Luma([0])
    }
}

impl Monochrome for Luma<u16> {
    fn white() -> Self {
        Luma([u16::MAX])
    }
    fn black() -> Self {
        Luma([0])
    }
}

impl Monochrome for Rgb<u8> {
    fn white() -> Self {
        Rgb([u8::MAX; 3])
    }
    fn black() -> Self {
        Rgb([0; 3])
    }
}

impl Monochrome for Rgba<u8> {
    fn white() -> Self {
        Rgba([u8::MAX; 4])
    }
    fn black() -> Self {
        Rgba([0, 0, 0, u8::MAX])
    }
}

impl Monochrome for Rgba<u16> {
    fn white() -> Self {
        Rgba([u16::MAX; 4])
    }
    fn black() -> Self {
        Rgba([0, 0, 0, u16::MAX])
    }
}

/// An ordered, non-empty list of colors and a shift into it.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette<P> {
    colors: Vec<P>,
    shift: i64,
}

impl<P: Pixel> Palette<P> {
    /// Builds a palette.  An empty list is rejected, since there would be
    /// nothing to index.
    pub fn new(colors: Vec<P>, shift: i64) -> Result<Self, RenderError> {
        if colors.is_empty() {
            return Err(RenderError::EmptyPalette);
        }
        Ok(Palette { colors, shift })
    }

    /// The colors, in order.
    pub fn colors(&self) -> &[P] {
        &self.colors
    }

    /// The color for a point that took `iterations` steps.  Negative
    /// shifts wrap around.
    pub fn pick(&self, iterations: usize) -> P {
        let len = self.colors.len() as i128;
        let index = (iterations as i128 + i128::from(self.shift)).rem_euclid(len);
        self.colors[index as usize]
    }
}

/// A colorizing strategy.
#[derive(Clone, Debug, PartialEq)]
pub enum Colorizer<P> {
    /// Always the same color.
    Constant(P),
    /// Cycles through a palette by iteration count.
    Palette(Palette<P>),
    /// Hands bounded points to one colorizer and escaped points to the other.
    Bounded {
        /// Used for points that never escaped.
        bounded: Box<Colorizer<P>>,
        /// Used for points that escaped.
        unbounded: Box<Colorizer<P>>,
    },
}

impl<P: Pixel> Colorizer<P> {
    /// A palette-cycling colorizer.
    pub fn palette(colors: Vec<P>, shift: i64) -> Result<Self, RenderError> {
        Palette::new(colors, shift).map(Colorizer::Palette)
    }

    /// Dispatches on `Evaluation::bounded`.
    pub fn bounded(bounded: Colorizer<P>, unbounded: Colorizer<P>) -> Self {
        Colorizer::Bounded {
            bounded: Box::new(bounded),
            unbounded: Box::new(unbounded),
        }
    }

    /// Pick the color for `point`, which evaluated to `result`.
    pub fn colorize(&self, point: Complex64, result: &Evaluation) -> P {
        match self {
            Colorizer::Constant(color) => *color,
            Colorizer::Palette(palette) => palette.pick(result.iterations),
            Colorizer::Bounded { bounded, unbounded } => {
                if result.bounded {
                    bounded.colorize(point, result)
                } else {
                    unbounded.colorize(point, result)
                }
            }
        }
    }
}

impl<P: Monochrome> Colorizer<P> {
    /// White inside the set, black outside; `invert` swaps them.
    pub fn binary(invert: bool) -> Self {
        let (inside, outside) = if invert {
            (P::black(), P::white())
        } else {
            (P::white(), P::black())
        };
        Colorizer::bounded(Colorizer::Constant(inside), Colorizer::Constant(outside))
    }
}

impl Colorizer<Color> {
    /// Black inside the set, and a `count`-color hue wheel outside.
    pub fn rainbow(count: usize, shift: i64) -> Result<Self, RenderError> {
        Ok(Colorizer::bounded(
            Colorizer::Constant(Color::black()),
            Colorizer::palette(rainbow(count), shift)?,
        ))
    }
}

/// `count` colors evenly spaced around the hue wheel, at full saturation
/// and value, starting from red.
pub fn rainbow(count: usize) -> Vec<Color> {
    (0..count)
        .map(|i| hsv(i as f64 / count as f64 * 360.0, 1.0, 1.0))
        .collect()
}

/// Converts a hue in degrees, and saturation and value in `[0, 1]`, to
/// an opaque color.
pub fn hsv(hue: f64, saturation: f64, value: f64) -> Color {
    let h = hue.rem_euclid(360.0) / 60.0;
    let chroma = value * saturation;
    let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = value - chroma;
    let channel = |c: f64| ((c + m) * 255.0).round() as u8;
    Rgba([channel(r), channel(g), channel(b), u8::MAX])
}
