use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

//I used this blog post as reference to the initialization methods ->
//https://towardsdatascience.com/weight-initialization-in-neural-networks-a-journey-from-the-basics-to-kaiming-954fb9b47c79

pub trait Initializer {
    /// Produce the next weight of a layer with `in_size` inputs and `size` neurons.
    fn get(&mut self, in_size: usize, size: usize) -> f32;

    /// Fill a `(size x in_size)` weight matrix, one neuron's row at a time.
    fn matrix(&mut self, in_size: usize, size: usize) -> Array2<f32>
    where
        Self: Sized,
    {
        Array2::from_shape_fn((size, in_size), |_| self.get(in_size, size))
    }
}

///Xavier initialization should be used for layers with symetric activation functions such as sigmoid or tanH
#[derive(Clone, Debug)]
pub struct Xavier {
    rng: SmallRng,
}
impl Xavier {
    pub fn new() -> Xavier {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Xavier {
        Xavier {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for Xavier {
    fn default() -> Self {
        Self::new()
    }
}

impl Initializer for Xavier {
    fn get(&mut self, in_size: usize, _size: usize) -> f32 {
        self.rng.sample::<f32, StandardNormal>(StandardNormal) / (in_size as f32).sqrt()
    }
}

///Kaiming initialization should be used for layers with asymetric activation functions such as RELU
#[derive(Clone, Debug)]
pub struct Kaiming {
    rng: SmallRng,
}
impl Kaiming {
    pub fn new() -> Kaiming {
        Self::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> Kaiming {
        Kaiming {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for Kaiming {
    fn default() -> Self {
        Self::new()
    }
}

impl Initializer for Kaiming {
    fn get(&mut self, in_size: usize, _: usize) -> f32 {
        self.rng.sample::<f32, StandardNormal>(StandardNormal) * (2f32 / (in_size as f32)).sqrt()
    }
}

///Always initializes weights to one
#[derive(Clone, Copy, Debug, Default)]
pub struct Ones;
impl Initializer for Ones {
    fn get(&mut self, _: usize, _: usize) -> f32 {
        1f32
    }
}

/// This initializer accepts an iterator over f32 values and uses them to initialize the weights.
/// Panics if a weights is requested but the iterator returns None.
pub struct WeightInit<T: Iterator<Item = f32>> {
    iter: T,
}
impl<I: Iterator<Item = f32>> WeightInit<I> {
    pub fn new<T: IntoIterator<Item = f32, IntoIter = I>>(weights: T) -> Self {
        Self {
            iter: weights.into_iter(),
        }
    }
}

impl<I: Iterator<Item = f32>> Initializer for WeightInit<I> {
    fn get(&mut self, _in_size: usize, _size: usize) -> f32 {
        self.iter.next().expect("Ran out of weights")
    }
}

/// Lets one initializer feed several layers in turn.
impl<T: Initializer + ?Sized> Initializer for &mut T {
    fn get(&mut self, in_size: usize, size: usize) -> f32 {
        (**self).get(in_size, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fills_rows_in_order() {
        let mut init = WeightInit::new((1..=6).map(|x| x as f32));
        let weights = init.matrix(3, 2);
        assert_eq!(weights, array![[1., 2., 3.], [4., 5., 6.]]);
    }

    #[test]
    fn seeded_xavier_is_reproducible() {
        let a = Xavier::with_seed(7).matrix(4, 3);
        let b = Xavier::with_seed(7).matrix(4, 3);
        let c = Xavier::with_seed(8).matrix(4, 3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn xavier_is_roughly_scaled() {
        let in_size = 100;
        let weights = Xavier::new().matrix(in_size, 100);
        let var = weights.mapv(|w| w * w).mean().unwrap();
        // variance of N(0, 1/in_size)
        assert!((var - 0.01).abs() < 0.002, "variance was {}", var);
    }

    #[test]
    fn kaiming_is_roughly_scaled() {
        let in_size = 50;
        let weights = Kaiming::with_seed(4).matrix(in_size, 200);
        let var = weights.mapv(|w| w * w).mean().unwrap();
        // variance of N(0, 2/in_size)
        assert!((var - 0.04).abs() < 0.006, "variance was {}", var);
        assert_eq!(Kaiming::new().matrix(3, 2), Kaiming::with_seed(0).matrix(3, 2));
    }

    #[test]
    fn borrowed_initializer_advances() {
        fn first<I: Initializer>(mut init: I) -> f32 {
            init.get(1, 1)
        }

        assert_eq!(first(&mut Ones), 1.);

        let mut init = WeightInit::new(vec![0.5, 0.25]);
        assert_eq!(first(&mut init), 0.5);
        assert_eq!(init.get(1, 1), 0.25);
    }
}
