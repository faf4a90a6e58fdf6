use crate::a_funcs::Activation;
use crate::initializer::Xavier;
use crate::loss::CostFunction;
use crate::misc::error::Error;
use crate::network::{Network, NetworkBuilder};
use crate::trainer::{Data, Logger, MockLogger, StdoutLogger, Trainer};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

fn default_batch_size() -> usize {
    1
}

fn default_learning_rate() -> f32 {
    0.1
}

fn default_cost() -> String {
    CostFunction::default().name().to_owned()
}

fn default_epochs() -> u32 {
    1000
}

/// Shape and hyperparameters of a network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Layer sizes, input first.
    pub layers: Vec<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f32,
    /// `"mse"` or `"ce"`.
    #[serde(default = "default_cost")]
    pub cost: String,
    #[serde(default)]
    pub hidden_activation: Activation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_activation: Option<Activation>,
    /// Seed of the Xavier weight initializer.
    #[serde(default)]
    pub seed: u64,
}

impl NetworkConfig {
    pub fn builder(&self) -> Result<NetworkBuilder, Error> {
        let cost: CostFunction = self.cost.parse()?;
        let mut builder = NetworkBuilder::new(&self.layers)
            .batch_size(self.batch_size)
            .learning_rate(self.learning_rate)
            .cost(cost)
            .hidden_activation(self.hidden_activation);
        if let Some(output) = self.output_activation {
            builder = builder.output_activation(output);
        }
        Ok(builder.initializer(Xavier::with_seed(self.seed)))
    }

    pub fn build(&self) -> Result<Network, Error> {
        self.builder()?.build()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    #[serde(default = "default_epochs")]
    pub epochs: u32,
    /// Seed of the sample shuffler.
    #[serde(default)]
    pub seed: u64,
    /// Print the loss every this many epochs, 0 disables printing.
    #[serde(default)]
    pub log_every: u32,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: default_epochs(),
            seed: 0,
            log_every: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub training: TrainingConfig,
}

impl Config {
    pub fn from_json(s: &str) -> Result<Config, Error> {
        serde_json::from_str(s).map_err(|e| Error::config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Config::from_json(&s)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Builds the configured network and wraps it in a trainer over `data`.
    pub fn trainer<D>(&self, data: D) -> Result<Trainer, Error>
    where
        D: Into<Box<[Data]>>,
    {
        let network = self.network.build()?;
        let logger: Box<dyn Logger> = match self.training.log_every {
            0 => Box::new(MockLogger),
            every => Box::new(StdoutLogger::new(every)),
        };
        Trainer::new(network, data, logger, self.training.seed)
    }
}
