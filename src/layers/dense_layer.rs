use crate::{
    a_funcs::{ActivFunc, Activation},
    initializer::Initializer,
    layers::Stage,
    loss::CostFunction,
    misc::error::Error,
};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Your run of the mill fully connected (dense) layer.
///
/// Weights are stored as a `(size x in_size)` matrix and every per-batch
/// buffer is a `(rows x batch_size)` matrix with one sample per column.
/// The buffers are overwritten by every pass and only hold meaningful values
/// for the stage recorded in `stage`.
#[derive(Debug, Clone)]
pub struct DenseLayer {
    in_size: usize,
    size: usize,
    batch_size: usize,
    l_rate: f32,

    weights: Array2<f32>,
    biases: Array1<f32>,
    activation: Activation,
    /// Set on the output layer only.
    cost: Option<CostFunction>,

    inputs: Array2<f32>,
    weighted_inputs: Array2<f32>,
    activations: Array2<f32>,
    delta: Array2<f32>,
    stage: Stage,
}

/// Read-only view of the layer downstream of a hidden layer, holding exactly
/// what its delta computation needs: the successor's weights before they are
/// updated and its freshly computed delta.
#[derive(Debug, Clone, Copy)]
pub struct Downstream<'a> {
    weights: ArrayView2<'a, f32>,
    delta: ArrayView2<'a, f32>,
}

impl DenseLayer {
    /// Creates a layer with weights drawn from `init` and zeroed biases.
    pub fn new<I>(
        mut init: I,
        in_size: usize,
        size: usize,
        batch_size: usize,
        l_rate: f32,
        activation: Activation,
    ) -> Self
    where
        I: Initializer,
    {
        Self {
            in_size,
            size,
            batch_size,
            l_rate,
            weights: init.matrix(in_size, size),
            biases: Array1::zeros(size),
            activation,
            cost: None,
            inputs: Array2::zeros((in_size, batch_size)),
            weighted_inputs: Array2::zeros((size, batch_size)),
            activations: Array2::zeros((size, batch_size)),
            delta: Array2::zeros((size, batch_size)),
            stage: Stage::Idle,
        }
    }

    /// Turns this layer into an output layer trained against `cost`.
    pub fn with_cost(mut self, cost: CostFunction) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn in_size(&self) -> usize {
        self.in_size
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn learning_rate(&self) -> f32 {
        self.l_rate
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn cost(&self) -> Option<CostFunction> {
        self.cost
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn biases(&self) -> &Array1<f32> {
        &self.biases
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Activations of the last forward pass.
    pub fn output(&self) -> &Array2<f32> {
        &self.activations
    }

    /// Weighted inputs (pre-activation values) of the last forward pass.
    pub fn weighted_inputs(&self) -> &Array2<f32> {
        &self.weighted_inputs
    }

    /// Delta of the last backward pass.
    pub fn delta(&self) -> &Array2<f32> {
        &self.delta
    }

    fn weighted_sum(&self, input: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut weighted = self.weights.dot(&input);
        weighted += &self.biases.view().insert_axis(Axis(1));
        weighted
    }

    /// Evaluates the layer on any number of columns without touching the
    /// per-batch buffers.
    pub fn infer(&self, input: ArrayView2<'_, f32>) -> Result<Array2<f32>, Error> {
        Error::check_shape("layer input", (self.in_size, input.ncols()), input.dim())?;
        Ok(self.activation.evaluate(&self.weighted_sum(input)))
    }

    /// Evaluates the layer on a full batch and caches everything the backward
    /// pass needs. Returns the layer's activations.
    pub fn forward_pass(&mut self, input: ArrayView2<'_, f32>) -> Result<&Array2<f32>, Error> {
        Error::check_shape("layer input", (self.in_size, self.batch_size), input.dim())?;

        self.weighted_inputs = self.weighted_sum(input);
        self.activations = self.activation.evaluate(&self.weighted_inputs);
        self.inputs.assign(&input);
        self.stage = Stage::Evaluated;

        Ok(&self.activations)
    }

    /// Computes the delta of an output layer from the expected activations.
    pub fn calc_delta_out(&mut self, target: ArrayView2<'_, f32>) -> Result<(), Error> {
        let cost = self
            .cost
            .ok_or(Error::NotReady("compute an output delta on a hidden layer"))?;
        if self.stage == Stage::Idle {
            return Err(Error::NotReady("compute an output delta before a forward pass"));
        }
        Error::check_shape("target", self.activations.dim(), target.dim())?;

        self.delta = cost.output_delta(
            &self.activation,
            &self.weighted_inputs,
            &self.activations,
            target,
        );
        self.stage = Stage::Differentiated;
        Ok(())
    }

    /// Exposes the weights and delta a preceding hidden layer needs for its
    /// own delta. Fails unless this layer's delta is current.
    pub fn downstream(&self) -> Result<Downstream<'_>, Error> {
        if self.stage != Stage::Differentiated {
            return Err(Error::NotReady("expose a delta that hasn't been computed"));
        }
        Ok(Downstream {
            weights: self.weights.view(),
            delta: self.delta.view(),
        })
    }

    /// Back-propagates the delta of the following layer into this one.
    pub fn calc_delta_hidden(&mut self, next: Downstream<'_>) -> Result<(), Error> {
        if self.stage == Stage::Idle {
            return Err(Error::NotReady("compute a hidden delta before a forward pass"));
        }
        let next_size = next.weights.nrows();
        Error::check_shape("successor weights", (next_size, self.size), next.weights.dim())?;
        Error::check_shape("successor delta", (next_size, self.batch_size), next.delta.dim())?;

        let back = next.weights.t().dot(&next.delta);
        self.delta = back * self.activation.derivative(&self.weighted_inputs, &self.activations);
        self.stage = Stage::Differentiated;
        Ok(())
    }

    /// Takes one gradient descent step with the batch averaged gradient.
    pub fn update_weights(&mut self) -> Result<(), Error> {
        if self.stage != Stage::Differentiated {
            return Err(Error::NotReady("update weights before computing the delta"));
        }

        let step = -self.l_rate / self.batch_size as f32;
        let w_grads = self.delta.dot(&self.inputs.t());
        self.weights.scaled_add(step, &w_grads);
        self.biases.scaled_add(step, &self.delta.sum_axis(Axis(1)));

        // the cached activations no longer match the weights
        self.stage = Stage::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        a_funcs::{Identity, Sigmoid, Softmax},
        initializer::{WeightInit, Xavier},
        layers::tests::check,
    };
    use ndarray::array;

    const TOLERANCE: f32 = 0.0001;

    fn create_layer(l_rate: f32) -> DenseLayer {
        let init = WeightInit::new((1..=12).map(|x| x as f32));
        DenseLayer::new(init, 4, 3, 1, l_rate, Identity.into())
    }

    fn inputs() -> Array2<f32> {
        array![[1.], [2.], [3.], [4.]]
    }

    #[test]
    fn dense_eval() {
        let mut layer = create_layer(1.);
        let output = layer.forward_pass(inputs().view()).unwrap().clone();
        let expected = [30., 70., 110.];

        check(&expected, output.as_slice().unwrap(), TOLERANCE, "output");
        assert_eq!(layer.infer(inputs().view()).unwrap(), output);
        assert_eq!(layer.stage(), Stage::Evaluated);
    }

    #[test]
    fn dense_eval_adds_bias_per_column() {
        let init = WeightInit::new(vec![1., 1.]);
        let mut layer = DenseLayer::new(init, 2, 1, 3, 0.5, Identity.into())
            .with_cost(CostFunction::MeanSquared);
        let input = array![[1., 2., 3.], [0., 0., 1.]];
        layer.forward_pass(input.view()).unwrap();
        layer.calc_delta_out(array![[0., 0., 0.]].view()).unwrap();
        layer.update_weights().unwrap();

        // bias -= 0.5 * (1 + 2 + 4) / 3
        check(&[-7. / 6.], layer.biases().as_slice().unwrap(), TOLERANCE, "bias");
        let output = layer.infer(array![[0.], [0.]].view()).unwrap();
        check(&[-7. / 6.], output.as_slice().unwrap(), TOLERANCE, "biased output");
    }

    #[test]
    fn dense_backprop_output() {
        let mut layer = create_layer(1.).with_cost(CostFunction::MeanSquared);
        layer.forward_pass(inputs().view()).unwrap();
        layer
            .calc_delta_out(array![[29.9], [69.8], [109.7]].view())
            .unwrap();
        check(&[0.1, 0.2, 0.3], layer.delta().as_slice().unwrap(), TOLERANCE, "delta");

        layer.update_weights().unwrap();
        let expected = [0.9, 1.8, 2.7, 3.6, 4.8, 5.6, 6.4, 7.2, 8.7, 9.4, 10.1, 10.8];
        check(&expected, layer.weights().as_slice().unwrap(), TOLERANCE, "weights");
        check(&[-0.1, -0.2, -0.3], layer.biases().as_slice().unwrap(), TOLERANCE, "biases");
        assert_eq!(layer.stage(), Stage::Idle);
    }

    #[test]
    fn dense_backprop_hidden() {
        let mut hidden = create_layer(1.);
        let init = WeightInit::new(vec![1., 0., 1., 0., 1., 0.]);
        let mut output = DenseLayer::new(init, 3, 2, 1, 1., Identity.into())
            .with_cost(CostFunction::MeanSquared);

        let h = hidden.forward_pass(inputs().view()).unwrap();
        let out = output.forward_pass(h.view()).unwrap();
        check(&[140., 70.], out.as_slice().unwrap(), TOLERANCE, "output");

        output.calc_delta_out(array![[139.], [71.]].view()).unwrap();
        hidden.calc_delta_hidden(output.downstream().unwrap()).unwrap();
        check(&[1., -1., 1.], hidden.delta().as_slice().unwrap(), TOLERANCE, "hidden delta");
    }

    #[test]
    fn hidden_delta_applies_derivative() {
        let init = WeightInit::new(vec![0.; 2]);
        let mut hidden = DenseLayer::new(init, 1, 2, 1, 1., Sigmoid.into());
        let mut output = DenseLayer::new(WeightInit::new(vec![2., -4.]), 2, 1, 1, 1., Identity.into())
            .with_cost(CostFunction::MeanSquared);

        let h = hidden.forward_pass(array![[1.]].view()).unwrap();
        output.forward_pass(h.view()).unwrap();
        // output is 2·0.5 - 4·0.5 = -1, so the delta is -1 - 0 = -1
        output.calc_delta_out(array![[0.]].view()).unwrap();
        hidden.calc_delta_hidden(output.downstream().unwrap()).unwrap();
        check(&[-0.5, 1.], hidden.delta().as_slice().unwrap(), TOLERANCE, "hidden delta");
    }

    #[test]
    fn cross_entropy_delta_is_output_minus_target() {
        let mut layer = DenseLayer::new(Xavier::with_seed(3), 4, 3, 2, 0.1, Softmax.into())
            .with_cost(CostFunction::CrossEntropy);
        let input = array![[0.5, -1.], [1.5, 0.2], [-0.3, 0.8], [2., 0.1]];
        let target = array![[0., 1.], [1., 0.], [0., 0.]];

        layer.forward_pass(input.view()).unwrap();
        layer.calc_delta_out(target.view()).unwrap();
        assert_eq!(layer.delta(), &(layer.output() - &target));

        // central differences of the batch loss w.r.t. the weighted inputs
        let eps = 1e-2;
        let cols = target.ncols() as f32;
        let weighted = layer.weighted_inputs().clone();
        let loss_at = |z: &Array2<f32>| {
            CostFunction::CrossEntropy.loss(&Softmax.evaluate(z), target.view())
        };
        let mut numeric = Array2::<f32>::zeros(weighted.raw_dim());
        for (idx, grad) in numeric.indexed_iter_mut() {
            let mut plus = weighted.clone();
            plus[idx] += eps;
            let mut minus = weighted.clone();
            minus[idx] -= eps;
            *grad = (loss_at(&plus) - loss_at(&minus)) / (2. * eps) * cols;
        }
        check(
            layer.delta().as_slice().unwrap(),
            numeric.as_slice().unwrap(),
            1e-3,
            "cross entropy gradient",
        );
    }

    #[test]
    fn rejects_wrong_input_shape() {
        let mut layer = create_layer(1.);
        let err = layer.forward_pass(array![[1.], [2.]].view()).unwrap_err();
        assert_eq!(
            err,
            Error::Shape {
                what: "layer input",
                expected: (4, 1),
                found: (2, 1),
            }
        );
        let err = layer.forward_pass(Array2::<f32>::zeros((4, 2)).view()).unwrap_err();
        assert!(matches!(err, Error::Shape { found: (4, 2), .. }));
        assert_eq!(layer.stage(), Stage::Idle);
    }

    #[test]
    fn rejects_wrong_target_shape() {
        let mut layer = create_layer(1.).with_cost(CostFunction::MeanSquared);
        layer.forward_pass(inputs().view()).unwrap();
        let err = layer.calc_delta_out(array![[1.], [2.]].view()).unwrap_err();
        assert!(matches!(err, Error::Shape { what: "target", .. }));
    }

    #[test]
    fn enforces_pass_order() {
        let mut layer = create_layer(1.).with_cost(CostFunction::MeanSquared);
        assert!(matches!(
            layer.calc_delta_out(array![[0.], [0.], [0.]].view()),
            Err(Error::NotReady(_))
        ));
        assert!(matches!(layer.update_weights(), Err(Error::NotReady(_))));
        assert!(matches!(layer.downstream(), Err(Error::NotReady(_))));

        layer.forward_pass(inputs().view()).unwrap();
        assert!(matches!(layer.update_weights(), Err(Error::NotReady(_))));

        layer.calc_delta_out(array![[0.], [0.], [0.]].view()).unwrap();
        layer.update_weights().unwrap();
        // a second update would reuse a delta computed for the old weights
        assert!(matches!(layer.update_weights(), Err(Error::NotReady(_))));
    }

    #[test]
    fn hidden_layer_has_no_output_delta() {
        let mut layer = create_layer(1.);
        layer.forward_pass(inputs().view()).unwrap();
        let err = layer.calc_delta_out(array![[0.], [0.], [0.]].view()).unwrap_err();
        assert_eq!(err, Error::NotReady("compute an output delta on a hidden layer"));
        assert_eq!(layer.stage(), Stage::Evaluated);
    }
}
