pub mod a_funcs;
pub mod config;
pub mod helpers;
pub mod initializer;
pub mod layers;
pub mod loss;
pub mod misc;
pub mod network;
pub mod trainer;

pub use config::Config;
pub use loss::CostFunction;
pub use misc::error::Error;
pub use network::{Network, NetworkBuilder};
