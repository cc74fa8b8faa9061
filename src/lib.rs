//! `bprank` learns per-user rankings over items from implicit feedback and
//! binary item attributes, using the pairwise BPR criterion: attributes of
//! items a user interacted with are trained to score higher than attributes
//! of items they did not.

use std::io::{BufRead, Write};

use rand::Rng;

pub mod bpr;
pub mod data;
pub mod io;
pub mod matrix;
pub mod recommend;
pub mod sampling;
pub mod stats;
pub mod types;
pub mod utils;


/// A model that learns from interaction data through epochs of stochastic
/// updates. Randomness is threaded through explicitly so that training is
/// seedable and deterministic in tests.
pub trait TrainableModel {
    /// Initializes the model and runs the configured number of epochs.
    /// Calling it again discards the learned weights and retrains from
    /// scratch; there are no incremental updates on a trained model.
    fn train<R: Rng>(&mut self, rng: &mut R);

    /// Runs a single training epoch.
    fn iterate<R: Rng>(&mut self, rng: &mut R);
}

/// Computes a compatibility score for a user-item pair.
pub trait Scorable {
    fn predict(&self, user: u32, item: u32) -> f64;
}

/// Round-trips the learned model state through a persistence channel.
pub trait Persistable {
    fn save(&self, out: &mut dyn Write) -> std::io::Result<()>;

    fn load(&mut self, input: &mut dyn BufRead) -> std::io::Result<()>;
}

/// Observer notified at epoch and sub-epoch boundaries during training, so
/// that progress reporting stays out of the training loop itself.
pub trait ProgressObserver {
    fn samples_processed(&mut self, _epoch: u32, _num_samples: u64) {}

    fn epoch_finished(&mut self, _epoch: u32) {}
}
