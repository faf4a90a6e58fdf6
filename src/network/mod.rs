pub mod construction;

pub use self::construction::NetworkBuilder;

use crate::helpers::count_matches;
use crate::layers::DenseLayer;
use crate::loss::CostFunction;
use crate::misc::error::Error;

use ndarray::{aview1, Array2, ArrayView2, Axis};

/// A chain of dense layers trained with mini-batch gradient descent.
///
/// The input layer is implicit: inputs are fed straight into the first hidden
/// layer. Every batch matrix holds one sample per column, so inputs are
/// `(in_size x batch_size)` and outputs `(out_size x batch_size)`.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<DenseLayer>,
    cost: CostFunction,
}

impl Network {
    /// Builds a network from `[input, hidden.., output]` sizes with default
    /// activations and Xavier initialization. See [`NetworkBuilder`] for more
    /// control.
    pub fn new(
        layer_sizes: &[usize],
        batch_size: usize,
        l_rate: f32,
        cost: CostFunction,
    ) -> Result<Self, Error> {
        NetworkBuilder::new(layer_sizes)
            .batch_size(batch_size)
            .learning_rate(l_rate)
            .cost(cost)
            .build()
    }

    pub fn builder(layer_sizes: &[usize]) -> NetworkBuilder {
        NetworkBuilder::new(layer_sizes)
    }

    /// Only called by the builder, which guarantees at least one layer.
    pub(crate) fn from_layers(layers: Vec<DenseLayer>, cost: CostFunction) -> Self {
        debug_assert!(!layers.is_empty());
        Self { layers, cost }
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn cost(&self) -> CostFunction {
        self.cost
    }

    pub fn in_size(&self) -> usize {
        self.layers[0].in_size()
    }

    pub fn out_size(&self) -> usize {
        self.output_layer().size()
    }

    pub fn batch_size(&self) -> usize {
        self.layers[0].batch_size()
    }

    pub fn learning_rate(&self) -> f32 {
        self.layers[0].learning_rate()
    }

    /// Network output as of the last [`probe_input`](Network::probe_input).
    pub fn output(&self) -> &Array2<f32> {
        self.output_layer().output()
    }

    fn output_layer(&self) -> &DenseLayer {
        &self.layers[self.layers.len() - 1]
    }

    fn check_target(&self, target: ArrayView2<'_, f32>) -> Result<(), Error> {
        Error::check_shape("target", (self.out_size(), self.batch_size()), target.dim())
    }

    /// Feeds a batch forward through every layer and returns the output.
    pub fn probe_input(&mut self, input: ArrayView2<'_, f32>) -> Result<&Array2<f32>, Error> {
        Error::check_shape("network input", (self.in_size(), self.batch_size()), input.dim())?;

        let (first, rest) = match self.layers.split_first_mut() {
            Some(split) => split,
            None => return Err(Error::config("network has no layers")),
        };
        let mut output = first.forward_pass(input)?;
        for layer in rest {
            output = layer.forward_pass(output.view())?;
        }
        Ok(output)
    }

    /// Back-propagates the error of the last [`probe_input`](Network::probe_input)
    /// against `target`, then updates every layer.
    ///
    /// All deltas are computed before the first weight changes, because every
    /// hidden delta reads the successor's weights as they were during the
    /// forward pass.
    pub fn err_bp(&mut self, target: ArrayView2<'_, f32>) -> Result<(), Error> {
        self.check_target(target)?;

        let (last, hidden) = match self.layers.split_last_mut() {
            Some(split) => split,
            None => return Err(Error::config("network has no layers")),
        };
        last.calc_delta_out(target)?;
        let mut next: &DenseLayer = last;
        for layer in hidden.iter_mut().rev() {
            layer.calc_delta_hidden(next.downstream()?)?;
            next = layer;
        }

        for layer in &mut self.layers {
            layer.update_weights()?;
        }
        Ok(())
    }

    /// One gradient descent step on a batch. Returns the batch loss measured
    /// before the weights were updated.
    pub fn train_step(
        &mut self,
        input: ArrayView2<'_, f32>,
        target: ArrayView2<'_, f32>,
    ) -> Result<f32, Error> {
        self.check_target(target)?;
        let cost = self.cost;
        let loss = cost.loss(self.probe_input(input)?, target);
        self.err_bp(target)?;
        Ok(loss)
    }

    /// Counts the batch columns where the output's largest value sits at the
    /// same index as the target's. Weights are left untouched.
    pub fn test_acc(
        &mut self,
        input: ArrayView2<'_, f32>,
        target: ArrayView2<'_, f32>,
    ) -> Result<usize, Error> {
        self.check_target(target)?;
        let output = self.probe_input(input)?;
        Ok(count_matches(output.view(), target))
    }

    /// Loss of the network on a batch, without training.
    pub fn loss(
        &mut self,
        input: ArrayView2<'_, f32>,
        target: ArrayView2<'_, f32>,
    ) -> Result<f32, Error> {
        self.check_target(target)?;
        let cost = self.cost;
        Ok(cost.loss(self.probe_input(input)?, target))
    }

    /// Runs the network on any number of columns. Unlike
    /// [`probe_input`](Network::probe_input) this keeps the training buffers
    /// intact.
    pub fn predict(&self, input: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        Error::check_shape("network input", (self.in_size(), input.ncols()), input.dim())?;

        let (first, rest) = match self.layers.split_first() {
            Some(split) => split,
            None => return Err(Error::config("network has no layers")),
        };
        let mut output = first.infer(input)?;
        for layer in rest {
            output = layer.infer(output.view())?;
        }
        Ok(output)
    }

    /// Runs the network on a single sample.
    pub fn predict_one(&self, input: &[f32]) -> Result<Vec<f32>, Error> {
        let column = aview1(input).insert_axis(Axis(1));
        Ok(self.predict(column)?.iter().copied().collect())
    }
}
