use super::Network;
use crate::{
    a_funcs::{AFunc, Activation},
    initializer::{Initializer, Xavier},
    layers::DenseLayer,
    loss::CostFunction,
    misc::error::Error,
};

/// Builder for fully connected networks.
///
/// `sizes` lists the neuron count of every layer, input first and output last,
/// so `[2, 4, 1]` is a network with two inputs, one hidden layer of four
/// neurons and a single output.
#[derive(Debug, Clone)]
pub struct NetworkBuilder<I = Xavier> {
    sizes: Vec<usize>,
    batch_size: usize,
    l_rate: f32,
    cost: CostFunction,
    hidden: Activation,
    output: Option<Activation>,
    init: I,
}

impl NetworkBuilder {
    pub fn new(sizes: &[usize]) -> Self {
        NetworkBuilder {
            sizes: sizes.to_vec(),
            batch_size: 1,
            l_rate: 0.1,
            cost: CostFunction::default(),
            hidden: Activation::default(),
            output: None,
            init: Xavier::new(),
        }
    }
}

impl<I: Initializer> NetworkBuilder<I> {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn learning_rate(mut self, l_rate: f32) -> Self {
        self.l_rate = l_rate;
        self
    }

    pub fn cost(mut self, cost: CostFunction) -> Self {
        self.cost = cost;
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden = activation;
        self
    }

    /// Activation of the output layer. Cross entropy always uses softmax and
    /// rejects anything else.
    pub fn output_activation(mut self, activation: Activation) -> Self {
        self.output = Some(activation);
        self
    }

    /// Replaces the weight initializer. Weights are drawn layer by layer, one
    /// neuron's row at a time.
    pub fn initializer<J: Initializer>(self, init: J) -> NetworkBuilder<J> {
        NetworkBuilder {
            sizes: self.sizes,
            batch_size: self.batch_size,
            l_rate: self.l_rate,
            cost: self.cost,
            hidden: self.hidden,
            output: self.output,
            init,
        }
    }

    fn output_activation_for_cost(&self) -> Result<Activation, Error> {
        match (self.cost, self.output) {
            (CostFunction::CrossEntropy, None) => Ok(AFunc::Softmax.into()),
            (CostFunction::CrossEntropy, Some(a)) if a.is_softmax() => Ok(a),
            (CostFunction::CrossEntropy, Some(a)) => Err(Error::config(format!(
                "cross entropy needs a softmax output layer, got {:?}",
                a.kind()
            ))),
            (CostFunction::MeanSquared, Some(a)) if a.is_softmax() => Err(Error::config(
                "softmax output is only supported with the cross entropy cost",
            )),
            (CostFunction::MeanSquared, a) => Ok(a.unwrap_or_default()),
        }
    }

    fn validate(&self) -> Result<Activation, Error> {
        if self.sizes.len() < 2 {
            return Err(Error::config(format!(
                "a network needs at least an input and an output layer, got {} sizes",
                self.sizes.len()
            )));
        }
        if let Some(pos) = self.sizes.iter().position(|&s| s == 0) {
            return Err(Error::config(format!("layer {} has no neurons", pos)));
        }
        if self.batch_size == 0 {
            return Err(Error::config("batch size must be positive"));
        }
        if !(self.l_rate.is_finite() && self.l_rate > 0.) {
            return Err(Error::config(format!(
                "learning rate must be positive and finite, got {}",
                self.l_rate
            )));
        }
        if self.sizes.len() > 2 && self.hidden.is_softmax() {
            return Err(Error::config("softmax can only be used on the output layer"));
        }
        self.output_activation_for_cost()
    }

    pub fn build(self) -> Result<Network, Error> {
        let output = self.validate()?;
        let NetworkBuilder {
            sizes,
            batch_size,
            l_rate,
            cost,
            hidden,
            mut init,
            ..
        } = self;

        let last = sizes.len() - 2;
        let mut layers = Vec::with_capacity(sizes.len() - 1);
        for (i, pair) in sizes.windows(2).enumerate() {
            let (in_size, size) = (pair[0], pair[1]);
            let layer = if i == last {
                DenseLayer::new(&mut init, in_size, size, batch_size, l_rate, output).with_cost(cost)
            } else {
                DenseLayer::new(&mut init, in_size, size, batch_size, l_rate, hidden)
            };
            layers.push(layer);
        }

        Ok(Network::from_layers(layers, cost))
    }
}
