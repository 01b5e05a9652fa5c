//! Errors reported before a render starts.  Once a render is under way
//! nothing can fail short of a bug, and bugs panic.

use failure::Fail;

/// Everything that can stop a render from starting (or, with a
/// cancellation flag, from finishing).
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum RenderError {
    /// A render needs at least one worker.
    #[fail(display = "worker count must be at least 1")]
    NoWorkers,

    /// The raster has no pixels to render.
    #[fail(display = "raster must have a positive size, got {}x{}", width, height)]
    EmptyRaster {
        /// Raster width in pixels.
        width: u32,
        /// Raster height in pixels.
        height: u32,
    },

    /// A palette colorizer needs something to cycle through.
    #[fail(display = "palette must contain at least one color")]
    EmptyPalette,

    /// The caller's cancellation flag was raised.
    #[fail(display = "render cancelled")]
    Cancelled,

    /// A configuration value is out of range.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfig(String),
}
