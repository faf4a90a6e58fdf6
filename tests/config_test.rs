mod common;

use common::{mean_squared_error, xor_batch, xor_config_path, xor_data};
use ffnn::{Config, CostFunction, Error};

#[test]
fn loads_the_xor_demo() -> anyhow::Result<()> {
    let config = Config::from_file(xor_config_path())?;
    assert_eq!(config.network.layers, vec![2, 4, 1]);

    let network = config.network.build()?;
    assert_eq!(network.cost(), CostFunction::MeanSquared);
    assert_eq!(network.batch_size(), 4);
    Ok(())
}

#[test]
fn xor_demo_config_trains() -> anyhow::Result<()> {
    let mut config = Config::from_file(xor_config_path())?;
    config.training.log_every = 0;

    let mut trainer = config.trainer(xor_data())?;
    trainer.train(config.training.epochs)?;

    let (input, target) = xor_batch();
    let output = trainer.network().predict(input.view())?;
    let err = mean_squared_error(&output, &target);
    assert!(err < 0.05, "Failed to converge, error was {}", err);
    Ok(())
}

#[test]
fn missing_file_names_the_path() {
    let err = Config::from_file("no/such/config.json").unwrap_err();
    assert!(format!("{:#}", err).contains("no/such/config.json"));
}

#[test]
fn invalid_networks_are_rejected() {
    let cases = &[
        r#"{ "network": { "layers": [2] } }"#,
        r#"{ "network": { "layers": [2, 0, 1] } }"#,
        r#"{ "network": { "layers": [2, 1], "batch_size": 0 } }"#,
        r#"{ "network": { "layers": [2, 1], "learning_rate": -0.1 } }"#,
        r#"{ "network": { "layers": [2, 1], "cost": "ce", "output_activation": "tanh" } }"#,
    ];
    for json in cases.iter() {
        let config = Config::from_json(json).unwrap();
        match config.network.build() {
            Err(Error::Config(_)) => {}
            other => panic!("{} gave {:?}", json, other.map(|n| n.layers().len())),
        }
    }
}

#[test]
fn trainer_needs_enough_samples() {
    let config = Config::from_json(r#"{ "network": { "layers": [2, 1], "batch_size": 8 } }"#).unwrap();
    let err = config.trainer(xor_data()).unwrap_err();
    assert!(err.to_string().contains("Batch size cannot be larger than data length"));
}
