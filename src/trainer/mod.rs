mod logger;

pub use logger::{LogFile, Logger, MockLogger, StdoutLogger};

use crate::helpers::{count_matches, stack_columns, IndexShuffler};
use crate::misc::error::Error;
use crate::network::Network;

use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// A single training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Data {
    pub input: Vec<f32>,
    pub target: Vec<f32>,
}

impl Data {
    pub fn new<I, T>(input: I, target: T) -> Self
    where
        I: AsRef<[f32]>,
        T: AsRef<[f32]>,
    {
        Self {
            input: input.as_ref().to_vec(),
            target: target.as_ref().to_vec(),
        }
    }
}

fn check_sample(network: &Network, sample: &Data) -> Result<(), Error> {
    Error::check_shape("sample input", (network.in_size(), 1), (sample.input.len(), 1))?;
    Error::check_shape("sample target", (network.out_size(), 1), (sample.target.len(), 1))
}

/// Packs samples into `(input, target)` matrices with one sample per column.
fn to_matrices<'a, D>(network: &Network, samples: D) -> Result<(Array2<f32>, Array2<f32>), Error>
where
    D: IntoIterator<Item = &'a Data>,
{
    let mut inputs = Vec::new();
    let mut targets = Vec::new();
    for sample in samples {
        check_sample(network, sample)?;
        inputs.push(sample.input.as_slice());
        targets.push(sample.target.as_slice());
    }
    Ok((
        stack_columns(&inputs, network.in_size()),
        stack_columns(&targets, network.out_size()),
    ))
}

/// Mini-batch stochastic gradient descent over a fixed data set.
///
/// Every epoch reshuffles the sample order and trains on `len / batch_size`
/// full batches, so up to `batch_size - 1` samples sit out each epoch.
#[derive(Debug)]
pub struct Trainer {
    network: Network,
    data: Box<[Data]>,
    shuffler: IndexShuffler,
    logger: Box<dyn Logger>,
    rng: SmallRng,
    batch_count: u32,
    epoch: u32,
}

impl Trainer {
    pub fn new<D>(network: Network, data: D, logger: Box<dyn Logger>, seed: u64) -> Result<Self, Error>
    where
        D: Into<Box<[Data]>>,
    {
        let data = data.into();
        let batch_size = network.batch_size();
        if data.len() < batch_size {
            return Err(Error::config(format!(
                "Batch size cannot be larger than data length. batch_size: {}, data_len: {}",
                batch_size,
                data.len()
            )));
        }
        for sample in data.iter() {
            check_sample(&network, sample)?;
        }

        Ok(Self {
            shuffler: IndexShuffler::new(data.len()),
            batch_count: (data.len() / batch_size) as u32,
            network,
            data,
            logger,
            rng: SmallRng::seed_from_u64(seed),
            epoch: 0,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// Number of finished epochs.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn batch_count(&self) -> u32 {
        self.batch_count
    }

    pub fn iter(&mut self) -> Iter<'_> {
        Iter { inner: self }
    }

    /// Trains for `epochs` epochs and returns the loss of the last one.
    pub fn train(&mut self, epochs: u32) -> Result<Option<f32>, Error> {
        let mut last = None;
        for _ in 0..epochs {
            last = Some(self.do_epoch()?);
        }
        Ok(last)
    }

    /// Trains on the `batch`th group of the current sample order and returns
    /// the batch loss measured before the update. `batch` must be below
    /// [`batch_count`](Trainer::batch_count).
    pub fn do_batch(&mut self, batch: u32) -> Result<f32, Error> {
        let batch_size = self.network.batch_size();
        let data = &self.data;
        let idxs = match self.shuffler.batch(batch as usize, batch_size) {
            Some(idxs) if batch < self.batch_count => idxs,
            _ => {
                return Err(Error::config(format!(
                    "batch {} is out of range, there are {} batches per epoch",
                    batch, self.batch_count
                )))
            }
        };
        let (input, target) = to_matrices(&self.network, idxs.iter().map(|&i| &data[i]))?;

        let loss = self.network.train_step(input.view(), target.view())?;
        self.logger.batch_loss(self.epoch, batch, loss);
        Ok(loss)
    }

    /// Shuffles the data and trains on every full batch. Returns the average
    /// batch loss.
    pub fn do_epoch(&mut self) -> Result<f32, Error> {
        self.shuffler.shuffle(&mut self.rng);

        let mut accumulator = 0.;
        for batch in 0..self.batch_count {
            accumulator += self.do_batch(batch)?;
        }
        let loss = accumulator / self.batch_count as f32;
        self.logger.epoch_loss(self.epoch, loss);
        self.epoch += 1;
        Ok(loss)
    }

    /// Loss of the network over `data` as a single batch.
    pub fn loss(&self, data: &[Data]) -> Result<f32, Error> {
        let (input, target) = self.matrices_of(data)?;
        let output = self.network.predict(input.view())?;
        Ok(self.network.cost().loss(&output, target.view()))
    }

    /// Fraction of `data` classified correctly, by comparing the largest
    /// output with the largest target value.
    pub fn accuracy(&self, data: &[Data]) -> Result<f32, Error> {
        let (input, target) = self.matrices_of(data)?;
        let output = self.network.predict(input.view())?;
        Ok(count_matches(output.view(), target.view()) as f32 / data.len() as f32)
    }

    fn matrices_of(&self, data: &[Data]) -> Result<(Array2<f32>, Array2<f32>), Error> {
        if data.is_empty() {
            return Err(Error::config("cannot evaluate an empty data set"));
        }
        to_matrices(&self.network, data)
    }
}

impl<'a> IntoIterator for &'a mut Trainer {
    type Item = Result<f32, Error>;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Endless iterator over epochs, yielding their losses.
pub struct Iter<'a> {
    inner: &'a mut Trainer,
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<f32, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.inner.do_epoch())
    }
}
