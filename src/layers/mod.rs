pub mod dense_layer;

pub use dense_layer::{DenseLayer, Downstream};

/// Tracks which per-batch buffers of a layer hold current values.
///
/// A layer moves `Idle -> Evaluated -> Differentiated -> Idle` over one
/// training step. Every step checks the stage it needs so that a delta or an
/// update is never computed from a stale buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Buffers are stale, either fresh from construction or after an update.
    Idle,
    /// Inputs, weighted inputs and activations belong to the last forward pass.
    Evaluated,
    /// The delta belongs to the last forward pass as well.
    Differentiated,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Idle
    }
}
