// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time function.
//!
//! Given a point `c` on the complex plane, repeatedly apply
//! `z = z^p + c` starting from zero, and count how many iterations it
//! takes for `z` to leave the disc of radius 2.  Once a point leaves
//! that disc it is guaranteed to go to infinity, so we can stop.  If it
//! never leaves within the iteration budget we call it "bounded," which
//! is a good guess (but not a proof) that the point is in the set.

use num::complex::Complex64;

/// The squared escape radius.  Comparing against the square lets us skip
/// a square root on every iteration.
pub const ESCAPE_RADIUS_SQR: f64 = 4.0;

const D4: f64 = 1.0 / 4.0;
const D16: f64 = D4 / 4.0;

/// The result of running the escape-time function on a single point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// True if the point never left the escape radius within the budget.
    pub bounded: bool,
    /// The iteration at which the point escaped, or the full budget if
    /// it was bounded.
    pub iterations: usize,
    /// The magnitude of `z` at the moment it escaped; zero if bounded.
    pub escape_magnitude: f64,
}

impl Evaluation {
    /// A point that used up the whole budget without escaping.
    pub fn bounded(iterations: usize) -> Self {
        Evaluation {
            bounded: true,
            iterations,
            escape_magnitude: 0.0,
        }
    }

    /// A point that escaped at `iterations` with the given squared magnitude.
    pub fn escaped(iterations: usize, norm_sqr: f64) -> Self {
        Evaluation {
            bounded: false,
            iterations,
            escape_magnitude: norm_sqr.sqrt(),
        }
    }
}

/// Which iteration function an `Evaluator` runs.  Chosen once, when the
/// evaluator is built, so the per-point hot loop never has to look at
/// the power again.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Kernel {
    /// The classic `z^2 + c`, with the cardioid and bulb shortcut.
    Square,
    /// An integer power between 3 and 20, unrolled into multiplications.
    Integer(u32),
    /// Any other power, through the general complex `powf`.
    Real(f64),
}

impl Kernel {
    /// Picks the cheapest kernel able to compute `z^power`.
    pub fn for_power(power: f64) -> Kernel {
        if power == 2.0 {
            Kernel::Square
        } else if power.fract() == 0.0 && power >= 3.0 && power <= 20.0 {
            Kernel::Integer(power as u32)
        } else {
            Kernel::Real(power)
        }
    }
}

/// The evaluation function for one render: an iteration bound and a
/// kernel.  Immutable and `Copy`, so every worker can share one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Evaluator {
    max_iterations: usize,
    kernel: Kernel,
}

impl Evaluator {
    /// An evaluator for the classic Mandelbrot set.
    pub fn new(max_iterations: usize) -> Self {
        Evaluator {
            max_iterations,
            kernel: Kernel::Square,
        }
    }

    /// An evaluator for the Multibrot set of the given power.
    pub fn with_power(max_iterations: usize, power: f64) -> Self {
        Evaluator {
            max_iterations,
            kernel: Kernel::for_power(power),
        }
    }

    /// The iteration bound.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The kernel selected for this evaluator's power.
    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// Run the escape-time function on `c`.
    pub fn evaluate(&self, c: Complex64) -> Evaluation {
        match self.kernel {
            Kernel::Square => {
                if in_main_cardioid_or_bulb(c) {
                    return Evaluation::bounded(self.max_iterations);
                }
                escape_with(c, self.max_iterations, |z| z * z)
            }
            Kernel::Integer(n) => escape_integer(c, self.max_iterations, n),
            Kernel::Real(p) => escape_with(c, self.max_iterations, |z| z.powf(p)),
        }
    }
}

/// One-shot version of `Evaluator::evaluate`.
pub fn evaluate(point: Complex64, max_iterations: usize, power: f64) -> Evaluation {
    Evaluator::with_power(max_iterations, power).evaluate(point)
}

/// Tests whether `c` lies inside the main cardioid or the period-2
/// bulb, both of which are known to be entirely inside the set.  Points
/// here would burn the whole iteration budget anyway.  NaN coordinates
/// fail both comparisons and fall through to the loop.
pub fn in_main_cardioid_or_bulb(c: Complex64) -> bool {
    let x = c.re - D4;
    let y = c.im * c.im;
    let q = x * x + y;
    if q * (q + x) < y * D4 {
        return true;
    }
    (c.re + 1.0) * (c.re + 1.0) + y < D16
}

/// The escape loop itself.  `power` computes `z^p`; it gets inlined and
/// monomorphized for each kernel.
///
/// Starting at `z = c` and testing before stepping is the same sequence
/// of tests as starting at zero and stepping first: the first step from
/// zero always lands on `c`.
#[inline(always)]
fn escape_with<F>(c: Complex64, max_iterations: usize, power: F) -> Evaluation
where
    F: Fn(Complex64) -> Complex64,
{
    let mut z = c;
    for iter in 0..max_iterations {
        let norm_sqr = z.norm_sqr();
        if norm_sqr > ESCAPE_RADIUS_SQR {
            return Evaluation::escaped(iter, norm_sqr);
        }
        z = power(z) + c;
    }
    Evaluation::bounded(max_iterations)
}

// Each arm is a short addition chain; the arm's closure is a separate
// instantiation of `escape_with`, so the match happens once per point.
macro_rules! unrolled_powers {
    ($($n:literal => |$z:ident| $body:block)+) => {
        /// Raises `z` to the integer power `n` (2 through 20) using a
        /// fixed chain of multiplications.  Returns `None` for any other `n`.
        pub fn integer_power(z: Complex64, n: u32) -> Option<Complex64> {
            match n {
                $($n => Some({ let $z = z; $body }),)+
                _ => None,
            }
        }

        fn escape_integer(c: Complex64, max_iterations: usize, n: u32) -> Evaluation {
            match n {
                $($n => escape_with(c, max_iterations, |$z: Complex64| $body),)+
                _ => escape_with(c, max_iterations, |z: Complex64| z.powf(f64::from(n))),
            }
        }
    };
}

unrolled_powers! {
    2 => |z| { z * z }
    3 => |z| { z * z * z }
    4 => |z| { let z2 = z * z; z2 * z2 }
    5 => |z| { let z2 = z * z; let z4 = z2 * z2; z * z4 }
    6 => |z| { let z2 = z * z; let z4 = z2 * z2; z2 * z4 }
    7 => |z| { let z2 = z * z; let z4 = z2 * z2; z * z2 * z4 }
    8 => |z| { let z2 = z * z; let z4 = z2 * z2; z4 * z4 }
    9 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z * z8 }
    10 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z2 * z8 }
    11 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z * z2 * z8 }
    12 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z4 * z8 }
    13 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z * z4 * z8 }
    14 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z2 * z4 * z8 }
    15 => |z| { let z2 = z * z; let z4 = z2 * z2; let z5 = z * z4; let z10 = z5 * z5; z5 * z10 }
    16 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; z8 * z8 }
    17 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; let z16 = z8 * z8; z * z16 }
    18 => |z| { let z2 = z * z; let z4 = z2 * z2; let z8 = z4 * z4; let z16 = z8 * z8; z2 * z16 }
    19 => |z| {
        let z2 = z * z;
        let z4 = z2 * z2;
        let z8 = z4 * z4;
        let z16 = z8 * z8;
        z * z2 * z16
    }
    20 => |z| {
        let z2 = z * z;
        let z4 = z2 * z2;
        let z8 = z4 * z4;
        let z16 = z8 * z8;
        z4 * z16
    }
}
