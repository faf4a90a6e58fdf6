use enum_dispatch::enum_dispatch;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Serializable name of an activation function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AFunc {
    Sigmoid,
    Identity,
    TanH,
    ReLU,
    Softmax,
}

/// Activation functions operate on whole `(neurons x batch)` matrices so that
/// column-joint functions like softmax fit the same interface as the
/// elementwise ones.
#[enum_dispatch]
pub trait ActivFunc {
    /// Computes `f(inp)`.
    fn evaluate(&self, inp: &Array2<f32>) -> Array2<f32>;
    /// Computes `f'(inp)`. `out` is `f(inp)`, which most functions use instead.
    fn derivative(&self, inp: &Array2<f32>, out: &Array2<f32>) -> Array2<f32>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sigmoid;
impl ActivFunc for Sigmoid {
    fn evaluate(&self, inp: &Array2<f32>) -> Array2<f32> {
        inp.mapv(|x| 1. / (1. + (-x).exp()))
    }
    fn derivative(&self, _inp: &Array2<f32>, out: &Array2<f32>) -> Array2<f32> {
        out.mapv(|o| o * (1. - o))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Identity;
impl ActivFunc for Identity {
    fn evaluate(&self, inp: &Array2<f32>) -> Array2<f32> {
        inp.clone()
    }
    fn derivative(&self, inp: &Array2<f32>, _out: &Array2<f32>) -> Array2<f32> {
        Array2::ones(inp.raw_dim())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TanH;
impl ActivFunc for TanH {
    fn evaluate(&self, inp: &Array2<f32>) -> Array2<f32> {
        inp.mapv(f32::tanh)
    }
    fn derivative(&self, _inp: &Array2<f32>, out: &Array2<f32>) -> Array2<f32> {
        out.mapv(|o| 1. - o * o)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReLU;
impl ActivFunc for ReLU {
    fn evaluate(&self, inp: &Array2<f32>) -> Array2<f32> {
        inp.mapv(|x| f32::max(x, 0.))
    }
    fn derivative(&self, inp: &Array2<f32>, _out: &Array2<f32>) -> Array2<f32> {
        inp.mapv(|x| if x > 0. { 1. } else { 0. })
    }
}

/// Normalizes every column into a probability distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Softmax;
impl ActivFunc for Softmax {
    fn evaluate(&self, inp: &Array2<f32>) -> Array2<f32> {
        let mut out = inp.clone();
        for mut col in out.axis_iter_mut(Axis(1)) {
            let max = col.fold(f32::NEG_INFINITY, |m, &x| f32::max(m, x));
            col.mapv_inplace(|x| (x - max).exp());
            let sum = col.sum();
            col.mapv_inplace(|x| x / sum);
        }
        out
    }

    /// Only the diagonal of the softmax jacobian. Networks never route a
    /// softmax derivative into training: softmax is only accepted as the
    /// output of a cross-entropy network, whose delta skips the derivative.
    fn derivative(&self, _inp: &Array2<f32>, out: &Array2<f32>) -> Array2<f32> {
        out.mapv(|o| o * (1. - o))
    }
}

#[enum_dispatch(ActivFunc)]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "AFunc", into = "AFunc")]
pub enum Activation {
    Sigmoid,
    Identity,
    TanH,
    ReLU,
    Softmax,
}

impl Activation {
    pub fn kind(&self) -> AFunc {
        match self {
            Activation::Sigmoid(_) => AFunc::Sigmoid,
            Activation::Identity(_) => AFunc::Identity,
            Activation::TanH(_) => AFunc::TanH,
            Activation::ReLU(_) => AFunc::ReLU,
            Activation::Softmax(_) => AFunc::Softmax,
        }
    }

    pub fn is_softmax(&self) -> bool {
        self.kind() == AFunc::Softmax
    }
}

impl From<AFunc> for Activation {
    fn from(kind: AFunc) -> Self {
        match kind {
            AFunc::Sigmoid => Sigmoid.into(),
            AFunc::Identity => Identity.into(),
            AFunc::TanH => TanH.into(),
            AFunc::ReLU => ReLU.into(),
            AFunc::Softmax => Softmax.into(),
        }
    }
}

impl From<Activation> for AFunc {
    fn from(activation: Activation) -> Self {
        activation.kind()
    }
}

impl Default for Activation {
    fn default() -> Self {
        Sigmoid.into()
    }
}
