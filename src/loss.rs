use crate::a_funcs::{ActivFunc, Activation};
use crate::misc::error::Error;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use std::fmt::{self, Display};
use std::str::FromStr;

/// The cost function the output layer is trained against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostFunction {
    #[serde(rename = "mse")]
    MeanSquared,
    /// Only valid with a softmax output layer.
    #[serde(rename = "ce")]
    CrossEntropy,
}

impl CostFunction {
    /// Batch averaged loss of `out` against `target`.
    ///
    /// Mean squared error is `sum(½(out - target)²) / columns`, cross entropy
    /// is `-sum(target * ln(out)) / columns`.
    pub fn loss(&self, out: &Array2<f32>, target: ArrayView2<'_, f32>) -> f32 {
        assert_eq!(out.dim(), target.dim());
        let columns = out.ncols().max(1) as f32;
        let total: f32 = match self {
            CostFunction::MeanSquared => out
                .iter()
                .zip(target)
                .map(|(o, t)| 0.5 * (o - t) * (o - t))
                .sum(),
            CostFunction::CrossEntropy => out
                .iter()
                .zip(target)
                .map(|(o, t)| -t * f32::max(*o, f32::MIN_POSITIVE).ln())
                .sum(),
        };
        total / columns
    }

    /// Gradient of the loss with respect to the output layer's weighted inputs.
    pub fn output_delta(
        &self,
        activation: &Activation,
        weighted_inputs: &Array2<f32>,
        out: &Array2<f32>,
        target: ArrayView2<'_, f32>,
    ) -> Array2<f32> {
        match self {
            CostFunction::MeanSquared => {
                (out - &target) * activation.derivative(weighted_inputs, out)
            }
            // softmax' cancels against the cross entropy gradient
            CostFunction::CrossEntropy => out - &target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CostFunction::MeanSquared => "mse",
            CostFunction::CrossEntropy => "ce",
        }
    }
}

impl Default for CostFunction {
    fn default() -> Self {
        CostFunction::MeanSquared
    }
}

impl FromStr for CostFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mse" => Ok(CostFunction::MeanSquared),
            "ce" => Ok(CostFunction::CrossEntropy),
            other => Err(Error::UnknownCost(other.to_owned())),
        }
    }
}

impl Display for CostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
