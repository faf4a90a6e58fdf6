use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

/// Index of the largest value in every column. The first maximum wins ties.
pub fn argmax_columns(matrix: ArrayView2<'_, f32>) -> Vec<usize> {
    matrix
        .axis_iter(Axis(1))
        .map(|col| {
            let mut best = 0;
            for (i, x) in col.iter().enumerate() {
                if *x > col[best] {
                    best = i;
                }
            }
            best
        })
        .collect()
}

/// Number of columns whose argmax agrees between `output` and `target`.
pub fn count_matches(output: ArrayView2<'_, f32>, target: ArrayView2<'_, f32>) -> usize {
    assert_eq!(output.dim(), target.dim());
    argmax_columns(output)
        .into_iter()
        .zip(argmax_columns(target))
        .filter(|(o, t)| o == t)
        .count()
}

/// Packs equally long samples into a matrix with one sample per column.
pub fn stack_columns(samples: &[&[f32]], rows: usize) -> Array2<f32> {
    assert!(samples.iter().all(|s| s.len() == rows));
    Array2::from_shape_fn((rows, samples.len()), |(r, c)| samples[c][r])
}

///Shuffles an array of consequtive integers and allows yout to iterate through them in batches
#[derive(Debug, Clone)]
pub struct IndexShuffler {
    idxs: Box<[usize]>,
}

impl IndexShuffler {
    pub fn new(size: usize) -> Self {
        IndexShuffler {
            idxs: (0..size).collect(),
        }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.idxs.shuffle(rng);
    }

    /// The `n`th group of `size` consecutive indices, if there are enough of them.
    pub fn batch(&self, n: usize, size: usize) -> Option<&[usize]> {
        self.idxs.get(n * size..(n + 1) * size)
    }

    pub fn len(&self) -> usize {
        self.idxs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idxs.is_empty()
    }
}
