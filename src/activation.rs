//! Activation functions for NEAT nodes.
//!
//! The set is deliberately closed: inputs pass their value through unchanged,
//! hidden nodes squash with `tanh`, and outputs use the logistic sigmoid so
//! that results land in `(0, 1)`.

use serde::{Deserialize, Serialize};

/// Activation function applied to a node's accumulated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Activation {
    /// Identity function: f(x) = x
    #[default]
    Identity,
    /// Hyperbolic tangent: f(x) = tanh(x)
    Tanh,
    /// Sigmoid: f(x) = 1 / (1 + e^(-x))
    Sigmoid,
}

impl Activation {
    /// All available activation functions.
    pub const ALL: [Self; 3] = [Self::Identity, Self::Tanh, Self::Sigmoid];

    /// Apply this activation function to an input value.
    ///
    /// NaN propagates unchanged; infinities map to the function's limits.
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }

        match self {
            Self::Identity => x,
            Self::Tanh => {
                if x == f64::INFINITY {
                    return 1.0;
                }
                if x == f64::NEG_INFINITY {
                    return -1.0;
                }
                x.tanh()
            }
            Self::Sigmoid => {
                if x == f64::INFINITY {
                    return 1.0;
                }
                if x == f64::NEG_INFINITY {
                    return 0.0;
                }
                // exp(709) is the last finite f64
                let clamped = x.clamp(-700.0, 700.0);
                1.0 / (1.0 + (-clamped).exp())
            }
        }
    }
}
