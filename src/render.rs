// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The tiled parallel renderer.
//!
//! The raster is cut into horizontal bands, and each band is one task:
//! for every pixel in the band, project it onto the complex plane,
//! evaluate it, colorize it, and write it.  A small pool of scoped
//! threads pulls bands off a shared queue until the queue is empty.
//! Because every band owns a disjoint slice of the pixel buffer, the
//! only lock anywhere is on the queue itself.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use image::Pixel;
use itertools::iproduct;
use log::{debug, trace};

use crate::colorize::Colorizer;
use crate::error::RenderError;
use crate::escape::Evaluator;
use crate::raster::{split_bands, Band, Raster};
use crate::tiles::bands;
use crate::transform::TransformStack;

/// A cancellation signal, polled once before each band starts.
pub trait Cancel {
    /// True once the render should stop taking new bands.
    fn is_cancelled(&self) -> bool;
}

impl Cancel for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<F> Cancel for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// How many bands to cut a raster into when the caller doesn't say:
/// four per CPU.  Early-escaping pixels cluster in some bands, so more
/// bands than threads keeps every thread busy until the end.
pub fn default_worker_count() -> usize {
    num_cpus::get() * 4
}

/// The render settings that describe how the work is split, as opposed
/// to what is being drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Renderer {
    workers: usize,
    threads: usize,
}

impl Renderer {
    /// A renderer that splits the raster into `workers` bands.  At most
    /// one thread per CPU runs at a time.
    pub fn new(workers: usize) -> Result<Self, RenderError> {
        if workers == 0 {
            return Err(RenderError::NoWorkers);
        }
        Ok(Renderer {
            workers,
            threads: workers.min(num_cpus::get()),
        })
    }

    /// A renderer with `default_worker_count` bands.
    pub fn auto() -> Self {
        Renderer {
            workers: default_worker_count(),
            threads: num_cpus::get(),
        }
    }

    /// Caps the number of concurrently running threads.  Never more
    /// threads than bands.
    pub fn with_threads(self, threads: usize) -> Result<Self, RenderError> {
        if threads == 0 {
            return Err(RenderError::NoWorkers);
        }
        Ok(Renderer {
            threads: threads.min(self.workers),
            ..self
        })
    }

    /// The number of bands.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The number of threads.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Fill every pixel of `image`.  Returns once all bands are written.
    pub fn render<P>(
        &self,
        image: &mut Raster<P>,
        transform: &TransformStack,
        evaluator: &Evaluator,
        colorizer: &Colorizer<P>,
    ) -> Result<(), RenderError>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send,
    {
        self.run(image, transform, evaluator, colorizer, None)
    }

    /// Like `render`, but checks `cancel` before starting each band.
    /// Bands already under way run to completion; the rest are skipped
    /// and their pixels are left as they were.
    pub fn render_cancellable<P, C>(
        &self,
        image: &mut Raster<P>,
        transform: &TransformStack,
        evaluator: &Evaluator,
        colorizer: &Colorizer<P>,
        cancel: &C,
    ) -> Result<(), RenderError>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send,
        C: Cancel + Sync,
    {
        let cancel: &(dyn Cancel + Sync) = cancel;
        self.run(image, transform, evaluator, colorizer, Some(cancel))
    }

    fn run<P>(
        &self,
        image: &mut Raster<P>,
        transform: &TransformStack,
        evaluator: &Evaluator,
        colorizer: &Colorizer<P>,
        cancel: Option<&(dyn Cancel + Sync)>,
    ) -> Result<(), RenderError>
    where
        P: Pixel + Send + Sync,
        P::Subpixel: Send,
    {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyRaster { width, height });
        }

        // Bands past the row count would all be empty.
        let tiles = bands(width, height, self.workers.min(height as usize));
        debug!(
            "rendering {}x{} in {} bands on {} threads, {} iterations",
            width,
            height,
            tiles.len(),
            self.threads,
            evaluator.max_iterations()
        );

        let pending: Vec<Band<P>> = split_bands(image, &tiles)
            .into_iter()
            .filter(|band| !band.tile().is_empty())
            .collect();
        let queue = Mutex::new(pending.into_iter());
        let cancelled = AtomicBool::new(false);

        crossbeam::scope(|spawner| {
            for _ in 0..self.threads {
                let queue = &queue;
                let cancelled = &cancelled;
                spawner.spawn(move |_| loop {
                    let band = { queue.lock().unwrap_or_else(PoisonError::into_inner).next() };
                    match band {
                        Some(band) => {
                            if cancel.map_or(false, |flag| flag.is_cancelled()) {
                                cancelled.store(true, Ordering::Relaxed);
                                break;
                            }
                            render_band(band, transform, evaluator, colorizer);
                        }
                        None => {
                            break;
                        }
                    }
                });
            }
        })
        .unwrap_or_else(|payload| panic::resume_unwind(payload));

        if cancelled.load(Ordering::Relaxed) {
            debug!("render cancelled");
            return Err(RenderError::Cancelled);
        }
        Ok(())
    }
}

/// Render one band, row by row.
fn render_band<P: Pixel>(
    mut band: Band<P>,
    transform: &TransformStack,
    evaluator: &Evaluator,
    colorizer: &Colorizer<P>,
) {
    let tile = band.tile();
    trace!("band rows {}..{}", tile.min_y, tile.max_y);
    for (y, x) in iproduct!(tile.rows(), tile.columns()) {
        let point = transform.project(x, y);
        let result = evaluator.evaluate(point);
        band.put_pixel(x, y, colorizer.colorize(point, &result));
    }
}

/// Renders `image` with `workers` bands.  This is the one-call form of
/// `Renderer::new(workers)?.render(...)`.
pub fn render<P>(
    image: &mut Raster<P>,
    transform: &TransformStack,
    evaluator: &Evaluator,
    colorizer: &Colorizer<P>,
    workers: usize,
) -> Result<(), RenderError>
where
    P: Pixel + Send + Sync,
    P::Subpixel: Send,
{
    Renderer::new(workers)?.render(image, transform, evaluator, colorizer)
}
