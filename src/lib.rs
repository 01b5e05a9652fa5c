#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane for
//! which repeatedly squaring `z` and adding `c`, starting from zero,
//! never runs off to infinity.  To draw it, each pixel of an image is
//! mapped onto the complex plane, the iteration is run until the point
//! either escapes the disc of radius 2 or exhausts an iteration budget,
//! and the outcome is turned into a color.  Raising `z` to powers other
//! than two gives the Multibrot family.
//!
//! The pieces are deliberately small and pure.  A `TransformStack`
//! maps pixels to points, an `Evaluator` runs the escape-time
//! function, a `Colorizer` picks a pixel, and a `Renderer` splits the
//! image into horizontal bands and runs them on a pool of scoped
//! threads, each writing only its own rows.

pub mod colorize;
pub mod config;
pub mod error;
pub mod escape;
pub mod raster;
pub mod render;
pub mod tiles;
pub mod transform;

pub use colorize::{Color, Colorizer, Monochrome, Palette};
pub use config::Config;
pub use error::RenderError;
pub use escape::{evaluate, Evaluation, Evaluator};
pub use raster::Raster;
pub use render::{default_worker_count, render, Cancel, Renderer};
pub use tiles::Tile;
pub use transform::{
    base_transform, max_iterations_for_scale, required_scale, Transform, TransformStack,
};
