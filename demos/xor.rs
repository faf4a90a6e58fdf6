use ffnn::{trainer::Data, Config};

use std::env;

fn main() -> anyhow::Result<()> {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/demos/xor.json").to_owned());
    let config = Config::from_file(&path)?;

    let data = vec![
        Data::new([0., 0.], [0.]),
        Data::new([0., 1.], [1.]),
        Data::new([1., 0.], [1.]),
        Data::new([1., 1.], [0.]),
    ];

    let mut trainer = config.trainer(data.clone())?;
    if let Some(loss) = trainer.train(config.training.epochs)? {
        println!("Final loss: {}", loss);
    }

    for sample in &data {
        let out = trainer.network().predict_one(&sample.input)?;
        println!("{:?} -> {:.3} (expected {})", sample.input, out[0], sample.target[0]);
    }
    Ok(())
}
