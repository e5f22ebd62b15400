/*!
Scalar root finders.

Equations are handed over as a residual closure plus an initial guess and a
bracket `[left, right]` that is known to contain the root. Callers pick the
finder by type, so any [`RootFinder`] can be injected where one is needed.
*/

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RootError {
    #[error("bracket contains non-finite value: [{left}, {right}]")]
    NonFiniteBracket { left: f64, right: f64 },

    #[error("bracket has zero width at {value}")]
    ZeroWidthBracket { value: f64 },

    #[error("no root in bracket: f({left})={left_residual}, f({right})={right_residual}")]
    NoSignChange {
        left: f64,
        right: f64,
        left_residual: f64,
        right_residual: f64,
    },

    #[error("derivative vanished at x = {x}")]
    ZeroDerivative { x: f64 },

    #[error("non-finite residual {residual} at x = {x}")]
    NonFiniteResidual { x: f64, residual: f64 },

    #[error("iteration settled at x = {x} with residual {residual}, no root in bracket")]
    NoRootInBracket { x: f64, residual: f64 },

    #[error("no convergence after {iters} iterations, best x = {best}")]
    MaxIterations { iters: usize, best: f64 },

    #[error("invalid solver config: {reason}")]
    InvalidConfig { reason: &'static str },
}

/** Converged root. */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    pub x: f64,
    pub residual: f64,
    pub iters: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_iters: usize,
    pub x_abs_tol: f64,
    pub x_rel_tol: f64,
    pub residual_tol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iters: 100,
            x_abs_tol: 1e-12,
            x_rel_tol: 1e-12,
            residual_tol: 1e-12,
        }
    }
}

impl SolverConfig {
    /** Checks that every tolerance is finite and non-negative. */
    pub fn validate(&self) -> Result<(), RootError> {
        let check = |value: f64, reason| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(RootError::InvalidConfig { reason })
            }
        };
        check(self.x_abs_tol, "x_abs_tol must be finite and non-negative")?;
        check(self.x_rel_tol, "x_rel_tol must be finite and non-negative")?;
        check(self.residual_tol, "residual_tol must be finite and non-negative")?;
        if self.max_iters == 0 {
            return Err(RootError::InvalidConfig {
                reason: "max_iters must be at least 1",
            });
        }
        Ok(())
    }

    fn x_converged(&self, step: f64, x: f64) -> bool {
        step.abs() <= self.x_abs_tol + self.x_rel_tol * x.abs()
    }
}

pub trait RootFinder {
    /** Finds `x` in `bracket` with `residual(x) ≈ 0`, starting from `guess`. */
    fn find_root<F>(&self, residual: F, guess: f64, bracket: [f64; 2]) -> Result<Root, RootError>
    where
        F: Fn(f64) -> f64;
}

/**
Newton-Raphson with a central-difference derivative.

Iterates that would leave the bracket are pulled back halfway towards the
violated bound, which keeps the residual inside its domain.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Newton {
    pub config: SolverConfig,
}

/** Plain bisection; the bracket endpoints must have residuals of opposite sign. */
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bisection {
    pub config: SolverConfig,
}

impl Newton {
    pub fn new(config: SolverConfig) -> Self {
        Newton { config }
    }
}

impl Bisection {
    pub fn new(config: SolverConfig) -> Self {
        Bisection { config }
    }
}

fn ordered(bracket: [f64; 2]) -> Result<(f64, f64), RootError> {
    let [a, b] = bracket;
    if !a.is_finite() || !b.is_finite() {
        return Err(RootError::NonFiniteBracket { left: a, right: b });
    }
    if a == b {
        return Err(RootError::ZeroWidthBracket { value: a });
    }
    Ok((a.min(b), a.max(b)))
}

fn evaluate<F: Fn(f64) -> f64>(f: &F, x: f64) -> Result<f64, RootError> {
    let residual = f(x);
    if residual.is_finite() {
        Ok(residual)
    } else {
        Err(RootError::NonFiniteResidual { x, residual })
    }
}

impl Newton {
    // Whether the residual changes sign within one tolerance of `x`
    fn straddles_root<F: Fn(f64) -> f64>(
        &self,
        residual: &F,
        x: f64,
        lo: f64,
        hi: f64,
    ) -> Result<bool, RootError> {
        let tol = (self.config.x_abs_tol + self.config.x_rel_tol * x.abs())
            .max(f64::EPSILON * x.abs().max(1.0));
        let below = evaluate(residual, (x - tol).max(lo))?;
        let above = evaluate(residual, (x + tol).min(hi))?;
        Ok(below == 0.0 || above == 0.0 || below.signum() != above.signum())
    }
}

impl RootFinder for Newton {
    fn find_root<F>(&self, residual: F, guess: f64, bracket: [f64; 2]) -> Result<Root, RootError>
    where
        F: Fn(f64) -> f64,
    {
        self.config.validate()?;
        let (lo, hi) = ordered(bracket)?;

        let mut x = if guess.is_finite() && guess > lo && guess < hi {
            guess
        } else {
            0.5 * (lo + hi)
        };

        for iter in 1..=self.config.max_iters {
            let fx = evaluate(&residual, x)?;
            if fx.abs() <= self.config.residual_tol {
                return Ok(Root {
                    x,
                    residual: fx,
                    iters: iter - 1,
                });
            }

            // Step shrinks near the bracket ends so both sample points stay inside
            let h = (f64::EPSILON.sqrt() * x.abs().max(1.0))
                .min(0.5 * (x - lo))
                .min(0.5 * (hi - x));
            if h <= 0.0 {
                return Err(RootError::ZeroDerivative { x });
            }
            let dfx = (evaluate(&residual, x + h)? - evaluate(&residual, x - h)?) / (2.0 * h);
            if dfx == 0.0 {
                return Err(RootError::ZeroDerivative { x });
            }

            let mut next = x - fx / dfx;
            if next <= lo {
                next = 0.5 * (x + lo);
            } else if next >= hi {
                next = 0.5 * (x + hi);
            }
            log::debug!("newton iter {iter}: x = {x}, f(x) = {fx}, next = {next}");

            if self.config.x_converged(next - x, next) {
                let fnext = evaluate(&residual, next)?;
                let accepted = fnext.abs() <= self.config.residual_tol
                    || fnext.signum() != fx.signum()
                    || self.straddles_root(&residual, next, lo, hi)?;
                if !accepted {
                    return Err(RootError::NoRootInBracket {
                        x: next,
                        residual: fnext,
                    });
                }
                return Ok(Root {
                    x: next,
                    residual: fnext,
                    iters: iter,
                });
            }
            x = next;
        }

        Err(RootError::MaxIterations {
            iters: self.config.max_iters,
            best: x,
        })
    }
}

impl RootFinder for Bisection {
    fn find_root<F>(&self, residual: F, _guess: f64, bracket: [f64; 2]) -> Result<Root, RootError>
    where
        F: Fn(f64) -> f64,
    {
        self.config.validate()?;
        let (mut left, mut right) = ordered(bracket)?;

        let mut left_residual = evaluate(&residual, left)?;
        if left_residual.abs() <= self.config.residual_tol {
            return Ok(Root {
                x: left,
                residual: left_residual,
                iters: 0,
            });
        }
        let right_residual = evaluate(&residual, right)?;
        if right_residual.abs() <= self.config.residual_tol {
            return Ok(Root {
                x: right,
                residual: right_residual,
                iters: 0,
            });
        }
        if left_residual.signum() == right_residual.signum() {
            return Err(RootError::NoSignChange {
                left,
                right,
                left_residual,
                right_residual,
            });
        }

        for iter in 1..=self.config.max_iters {
            let mid = 0.5 * (left + right);
            let mid_residual = evaluate(&residual, mid)?;
            log::debug!("bisection iter {iter}: [{left}, {right}], f({mid}) = {mid_residual}");

            if self.config.x_converged(right - left, mid)
                || mid_residual.abs() <= self.config.residual_tol
            {
                return Ok(Root {
                    x: mid,
                    residual: mid_residual,
                    iters: iter,
                });
            }

            if left_residual.signum() == mid_residual.signum() {
                left = mid;
                left_residual = mid_residual;
            } else {
                right = mid;
            }
        }

        Err(RootError::MaxIterations {
            iters: self.config.max_iters,
            best: 0.5 * (left + right),
        })
    }
}
