//! Scalar root finders shared by every solver.

/// Settings for [`newton`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    /// Iteration budget.
    pub max_iterations: usize,
    /// Convergence tolerance on the difference between successive iterates.
    pub tolerance: f64,
    /// Derivatives smaller than this are treated as zero.
    pub min_derivative: f64,
    /// Step added to the iterate when the derivative vanishes.
    pub nudge: f64,
    /// Small positive depth used when the section degenerates.
    pub reset: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-7,
            min_derivative: 1e-12,
            nudge: 0.1,
            reset: 0.01,
        }
    }
}

/// One evaluation of the residual function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Residual {
    /// Residual `f(y)` and its derivative `f'(y)`.
    Value {
        /// f(y).
        f: f64,
        /// df/dy.
        df: f64,
    },
    /// The geometry has no wetted perimeter or area at this iterate, or the
    /// residual is not finite there.
    Degenerate,
}

/// Newton-Raphson failed to meet its tolerance within the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotConverged {
    /// Iterations spent.
    pub iterations: usize,
}

/// Finds a positive root of `residual` by safeguarded Newton-Raphson.
///
/// - a vanishing derivative nudges the iterate up by `options.nudge`
/// - a non-positive step halves the previous iterate
/// - a degenerate geometry resets the iterate to `options.reset`
///
/// # Errors
///
/// Returns [`NotConverged`] if successive iterates never come within
/// `options.tolerance` of each other.
pub fn newton<F>(initial: f64, options: NewtonOptions, mut residual: F) -> Result<f64, NotConverged>
where
    F: FnMut(f64) -> Residual,
{
    let mut y = initial;

    for iteration in 0..options.max_iterations {
        let (f, df) = match residual(y) {
            Residual::Degenerate => {
                y = options.reset;
                continue;
            }
            Residual::Value { f, df } => (f, df),
        };

        if df.abs() < options.min_derivative || !df.is_finite() {
            y += options.nudge;
            continue;
        }

        let mut next = y - f / df;
        if next <= 0.0 || next.is_nan() {
            next = y * 0.5;
        }

        tracing::trace!(iteration, y, next, f, "newton step");

        if (next - y).abs() < options.tolerance {
            return Ok(next);
        }

        y = next;
        if y <= 0.0 {
            y = options.reset;
        }
    }

    Err(NotConverged {
        iterations: options.max_iterations,
    })
}

/// Settings for [`bisect_increasing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    /// Initial upper bound.
    pub upper: f64,
    /// Factor applied to the upper bound while it fails to bracket the target.
    pub growth: f64,
    /// Maximum number of upper-bound evaluations while expanding.
    pub expansions: usize,
    /// Number of bisection halvings.
    pub iterations: usize,
}

/// The bracket never reached the target value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unbracketed {
    /// The last upper bound tried.
    pub upper: f64,
}

/// Finds `x >= 0` with `forward(x) == target` for a monotonically increasing
/// `forward` with `forward(0) <= target`.
///
/// The upper bound starts at `bracket.upper` and is multiplied by
/// `bracket.growth` until `forward(upper) >= target`, then the interval
/// `[0, upper]` is halved `bracket.iterations` times. The midpoint of the
/// final interval is returned.
///
/// # Errors
///
/// Returns [`Unbracketed`] if the upper bound never reaches the target.
pub fn bisect_increasing<F>(target: f64, bracket: Bracket, forward: F) -> Result<f64, Unbracketed>
where
    F: Fn(f64) -> f64,
{
    let mut lo = 0.0;
    let mut hi = bracket.upper;

    let mut bracketed = false;
    for expansion in 0..bracket.expansions {
        if forward(hi) >= target {
            bracketed = true;
            break;
        }
        tracing::trace!(expansion, upper = hi, "expanding bracket");
        hi *= bracket.growth;
    }
    if !bracketed && forward(hi) < target {
        return Err(Unbracketed { upper: hi });
    }

    for _ in 0..bracket.iterations {
        let mid = 0.5 * (lo + hi);
        if forward(mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(0.5 * (lo + hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqrt_two(y: f64) -> Residual {
        Residual::Value {
            f: y * y - 2.0,
            df: 2.0 * y,
        }
    }

    #[test]
    fn newton_finds_square_root() {
        let root = newton(1.0, NewtonOptions::default(), sqrt_two).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-7);
    }

    #[test]
    fn newton_halves_instead_of_going_negative() {
        // From y = 3 the raw step for 1 − 1/y lands at −3.
        let reciprocal = |y: f64| Residual::Value {
            f: 1.0 - 1.0 / y,
            df: 1.0 / (y * y),
        };
        let root = newton(3.0, NewtonOptions::default(), reciprocal).unwrap();
        assert!((root - 1.0).abs() < 1e-6);
    }

    #[test]
    fn newton_nudges_off_flat_derivative() {
        // Derivative vanishes at the initial guess of zero.
        let root = newton(0.0, NewtonOptions::default(), sqrt_two).unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-7);
    }

    #[test]
    fn newton_resets_degenerate_geometry() {
        let mut calls = 0;
        let root = newton(5.0, NewtonOptions::default(), |y| {
            calls += 1;
            if calls == 1 {
                Residual::Degenerate
            } else {
                sqrt_two(y)
            }
        })
        .unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-7);
    }

    #[test]
    fn newton_reports_non_convergence() {
        // Newton on a cube root cycles between 3.0 and 1.5 forever.
        let result = newton(3.0, NewtonOptions::default(), |y| {
            let r = (y - 2.0).cbrt();
            Residual::Value {
                f: r,
                df: 1.0 / (3.0 * r * r),
            }
        });
        assert_eq!(result, Err(NotConverged { iterations: 100 }));
    }

    #[test]
    fn bisection_within_seed() {
        let bracket = Bracket {
            upper: 10.0,
            growth: 2.0,
            expansions: 20,
            iterations: 100,
        };
        let x = bisect_increasing(9.0, bracket, |x| x * x).unwrap();
        assert!((x - 3.0).abs() < 1e-9);
    }

    #[test]
    fn bisection_expands_undersized_bracket() {
        // f(seed) = 1; target is four orders of magnitude larger.
        let forward = |x: f64| x.powf(8.0 / 3.0);
        let target = 1.0e4;
        for growth in [1.5, 2.0] {
            let bracket = Bracket {
                upper: 1.0,
                growth,
                expansions: 80,
                iterations: 100,
            };
            let x = bisect_increasing(target, bracket, forward).unwrap();
            assert!((forward(x) - target).abs() / target < 1e-9);
        }
    }

    #[test]
    fn bisection_reports_unreachable_target() {
        let bracket = Bracket {
            upper: 1.0,
            growth: 2.0,
            expansions: 3,
            iterations: 100,
        };
        let result = bisect_increasing(1.0e6, bracket, |x| x);
        assert!(result.is_err());
    }
}
