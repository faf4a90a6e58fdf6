use ffnn::trainer::Data;
use ndarray::{array, Array2};

#[allow(dead_code)]
pub fn xor_data() -> Vec<Data> {
    vec![
        Data::new([0., 0.], [0.]),
        Data::new([0., 1.], [1.]),
        Data::new([1., 0.], [1.]),
        Data::new([1., 1.], [0.]),
    ]
}

/// The XOR truth table as one batch, one sample per column.
#[allow(dead_code)]
pub fn xor_batch() -> (Array2<f32>, Array2<f32>) {
    (array![[0., 0., 1., 1.], [0., 1., 0., 1.]], array![[0., 1., 1., 0.]])
}

/// Mean of the squared errors over every output.
#[allow(dead_code)]
pub fn mean_squared_error(output: &Array2<f32>, target: &Array2<f32>) -> f32 {
    (output - target).mapv(|e| e * e).mean().unwrap_or(f32::NAN)
}

#[allow(dead_code)]
pub fn xor_config_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/demos/xor.json")
}
