/**
 * BPRank
 * Copyright (C) 2026 The bprank developers
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::error::Error;
use std::io;
use std::io::prelude::*;

use rand::Rng;

use crate::data::{AttributeIndex, InteractionIndex};
use crate::matrix::WeightModel;
use crate::sampling::TripleSampler;
use crate::{Persistable, ProgressObserver, Scorable, TrainableModel};

/// Hyperparameters of the training run.
#[derive(Clone, Debug)]
pub struct TrainingConfig {
    /// L2 regularization coefficient applied to every weight update.
    pub reg: f64,
    /// Gradient ascent step size.
    pub learn_rate: f64,
    /// Number of epochs.
    pub num_iter: u32,
    /// Update-budget multiplier per epoch.
    pub iteration_length: u64,
    /// Mean of the initial weight distribution.
    pub init_f_mean: f64,
    /// Standard deviation of the initial weight distribution.
    pub init_f_stdev: f64,
    /// Memory ceiling in MiB below which the precomputed sampling index
    /// is built.
    pub fast_sampling_memory_limit: usize,
}

impl Default for TrainingConfig {

    fn default() -> Self {
        TrainingConfig {
            reg: 0.015,
            learn_rate: 0.05,
            num_iter: 10,
            iteration_length: 5,
            init_f_mean: 0.0,
            init_f_stdev: 0.1,
            fast_sampling_memory_limit: 1024,
        }
    }
}

/// Pairwise-ranking model that learns, per user, a linear weighting over
/// binary item attributes such that attributes of interacted items score
/// higher than attributes of unseen items.
///
/// The model owns its weight matrix exclusively for the duration of
/// training; there are no online updates once training has finished, a
/// retrain starts from freshly initialized weights.
pub struct BprLinear {
    config: TrainingConfig,
    interactions: InteractionIndex,
    attributes: AttributeIndex,
    weights: WeightModel,
    sampler: TripleSampler,
    observer: Option<Box<dyn ProgressObserver>>,
    epochs_run: u32,
}

impl BprLinear {

    /// Sets up a model for the given data. The attribute data must be
    /// supplied up front and cover the item range of the interactions,
    /// training without it is refused.
    pub fn new(
        interactions: InteractionIndex,
        attributes: AttributeIndex,
        config: TrainingConfig,
    ) -> Result<Self, Box<dyn Error>> {

        if attributes.num_items() < interactions.num_items() {
            return Err(From::from(format!(
                "Attribute data covers {} items, interactions reference {}",
                attributes.num_items(),
                interactions.num_items()
            )));
        }

        if attributes.num_attributes() == 0 {
            return Err(From::from("Attribute data must be set before training"));
        }

        if !config.init_f_stdev.is_finite() || config.init_f_stdev < 0.0 {
            return Err(From::from(format!(
                "Invalid standard deviation {} for the weight initialization",
                config.init_f_stdev
            )));
        }

        let weights = WeightModel::new(interactions.num_users(), attributes.num_attributes());
        let sampler = TripleSampler::new(&interactions, config.fast_sampling_memory_limit);

        Ok(BprLinear {
            config,
            interactions,
            attributes,
            weights,
            sampler,
            observer: None,
            epochs_run: 0,
        })
    }

    /// Installs an observer that is notified at epoch and sub-epoch
    /// boundaries. The training loop itself never writes to any output sink.
    pub fn set_progress_observer(&mut self, observer: Box<dyn ProgressObserver>) {
        self.observer = Some(observer);
    }

    pub fn uses_fast_sampling(&self) -> bool {
        self.sampler.uses_fast_sampling()
    }

    pub fn num_items(&self) -> usize {
        self.interactions.num_items()
    }

    pub fn weights(&self) -> &WeightModel {
        &self.weights
    }

    /// Placeholder: no convergence metric is computed, the sentinel -1.0 is
    /// returned unconditionally.
    pub fn compute_fit(&self) -> f64 {
        -1.0
    }

    /// Single stochastic update for a sampled triple. Only attributes in the
    /// symmetric difference of the two items are touched; shared attributes
    /// cancel in the margin and their gradient is exactly zero.
    fn update(&mut self, user: u32, positive_item: u32, negative_item: u32) {

        let margin =
            self.score_known(user, positive_item) - self.score_known(user, negative_item);

        // logistic sigmoid of the negative margin
        let gradient = 1.0 / (1.0 + margin.exp());

        let positive_attributes = self.attributes.attributes_of(positive_item);
        let negative_attributes = self.attributes.attributes_of(negative_item);

        for &attribute in positive_attributes.difference(negative_attributes) {
            let weight = self.weights.get(user, attribute);
            let updated = weight + self.config.learn_rate * (gradient - self.config.reg * weight);
            self.weights.set(user, attribute, updated);
        }

        for &attribute in negative_attributes.difference(positive_attributes) {
            let weight = self.weights.get(user, attribute);
            let updated = weight + self.config.learn_rate * (-gradient - self.config.reg * weight);
            self.weights.set(user, attribute, updated);
        }
    }

    /// Score for ids that are known to be in range, as all sampled ids are.
    fn score_known(&self, user: u32, item: u32) -> f64 {
        self.attributes
            .attributes_of(item)
            .iter()
            .map(|&attribute| self.weights.get(user, attribute))
            .sum()
    }
}

impl TrainableModel for BprLinear {

    fn train<R: Rng>(&mut self, rng: &mut R) {

        self.weights
            .init_normal(self.config.init_f_mean, self.config.init_f_stdev, rng);
        self.epochs_run = 0;

        for _ in 0..self.config.num_iter {
            self.iterate(rng);
        }
    }

    /// Runs one epoch: a budget of `num_interactions * iteration_length`
    /// single-triple updates, sampled with replacement. An epoch makes no
    /// guarantee that every interaction is visited.
    fn iterate<R: Rng>(&mut self, rng: &mut R) {

        let num_updates =
            self.interactions.num_interactions() * self.config.iteration_length;
        let notification_block = self.interactions.num_interactions().max(1);

        for num_samples in 1..=num_updates {

            let (user, positive_item, negative_item) =
                self.sampler.sample(&self.interactions, rng);

            self.update(user, positive_item, negative_item);

            if num_samples % notification_block == 0 {
                let epoch = self.epochs_run;
                if let Some(observer) = self.observer.as_mut() {
                    observer.samples_processed(epoch, num_samples);
                }
            }
        }

        let epoch = self.epochs_run;
        if let Some(observer) = self.observer.as_mut() {
            observer.epoch_finished(epoch);
        }

        self.epochs_run += 1;
    }
}

impl Scorable for BprLinear {

    /// Sums the user's weights over the item's attributes. Out-of-range ids
    /// are tolerated at inference time: a diagnostic is emitted and 0.0
    /// returned, so that scoring stays available for partially-unknown
    /// entities.
    fn predict(&self, user: u32, item: u32) -> f64 {

        if user as usize >= self.weights.num_rows() {
            eprintln!("Cannot score unknown user {}", user);
            return 0.0;
        }

        if item as usize >= self.attributes.num_items() {
            eprintln!("Cannot score unknown item {}", item);
            return 0.0;
        }

        self.score_known(user, item)
    }
}

impl Persistable for BprLinear {

    fn save(&self, out: &mut dyn Write) -> io::Result<()> {
        crate::io::write_weight_model(&self.weights, out)
    }

    /// Replaces the weight matrix with the persisted one. The matrix is
    /// reshaped to the persisted dimensions, not merged into the current one.
    fn load(&mut self, input: &mut dyn BufRead) -> io::Result<()> {
        self.weights = crate::io::read_weight_model(input)?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{BprLinear, TrainingConfig};
    use crate::data::{AttributeIndex, InteractionIndex};
    use crate::{Scorable, TrainableModel};

    fn two_attribute_model(learn_rate: f64, reg: f64) -> BprLinear {

        let mut interactions = InteractionIndex::with_dimensions(1, 2);
        interactions.insert(0, 0);

        let mut attributes = AttributeIndex::with_dimensions(2, 0);
        attributes.insert(0, 0);
        attributes.insert(1, 1);

        let config = TrainingConfig {
            learn_rate,
            reg,
            ..TrainingConfig::default()
        };

        BprLinear::new(interactions, attributes, config).unwrap()
    }

    #[test]
    fn update_matches_the_closed_form() {

        let mut model = two_attribute_model(0.1, 0.0);
        model.weights.set(0, 0, 0.2);
        model.weights.set(0, 1, 0.3);

        model.update(0, 0, 1);

        let margin: f64 = 0.2 - 0.3;
        let gradient = 1.0 / (1.0 + margin.exp());

        assert!((model.weights.get(0, 0) - (0.2 + 0.1 * gradient)).abs() < 1e-12);
        assert!((model.weights.get(0, 1) - (0.3 - 0.1 * gradient)).abs() < 1e-12);
    }

    #[test]
    fn shared_attributes_are_untouched() {

        let mut interactions = InteractionIndex::with_dimensions(1, 2);
        interactions.insert(0, 0);

        let mut attributes = AttributeIndex::with_dimensions(2, 0);
        attributes.insert(0, 0);
        attributes.insert(0, 2);
        attributes.insert(1, 1);
        attributes.insert(1, 2);

        let mut model =
            BprLinear::new(interactions, attributes, TrainingConfig::default()).unwrap();

        model.weights.set(0, 0, 0.2);
        model.weights.set(0, 1, 0.3);
        model.weights.set(0, 2, 0.7);

        model.update(0, 0, 1);

        // attribute 2 occurs on both items, its gradient is exactly zero
        assert_eq!(model.weights.get(0, 2), 0.7);
        assert!(model.weights.get(0, 0) > 0.2);
        assert!(model.weights.get(0, 1) < 0.3);
    }

    #[test]
    fn missing_attribute_data_is_refused() {

        let mut interactions = InteractionIndex::with_dimensions(1, 2);
        interactions.insert(0, 0);

        let attributes = AttributeIndex::with_dimensions(2, 0);

        assert!(BprLinear::new(interactions, attributes, TrainingConfig::default()).is_err());
    }

    #[test]
    fn attribute_data_must_cover_the_item_range() {

        let mut interactions = InteractionIndex::with_dimensions(1, 3);
        interactions.insert(0, 2);

        let mut attributes = AttributeIndex::with_dimensions(2, 0);
        attributes.insert(0, 0);

        assert!(BprLinear::new(interactions, attributes, TrainingConfig::default()).is_err());
    }

    #[test]
    fn scoring_unknown_entities_degrades_to_zero() {

        let mut model = two_attribute_model(0.05, 0.0);
        model.weights.set(0, 0, 0.4);

        assert_eq!(model.predict(0, 0), 0.4);
        assert_eq!(model.predict(5, 0), 0.0);
        assert_eq!(model.predict(0, 9), 0.0);
    }

    #[test]
    fn compute_fit_is_a_sentinel() {

        let model = two_attribute_model(0.05, 0.0);
        assert_eq!(model.compute_fit(), -1.0);
    }

    #[test]
    fn training_separates_attribute_preferences() {

        // user 0 likes items carrying attribute 0 and has item 1 (attribute
        // 1 only) as its sole possible negative
        let mut interactions = InteractionIndex::with_dimensions(3, 4);
        interactions.insert(0, 0);
        interactions.insert(0, 2);
        interactions.insert(1, 1);
        interactions.insert(1, 2);
        interactions.insert(2, 0);

        let mut attributes = AttributeIndex::with_dimensions(4, 0);
        attributes.insert(0, 0);
        attributes.insert(1, 1);
        attributes.insert(2, 0);
        attributes.insert(2, 1);
        // item 3 carries no attributes and has no interactions

        let mut model =
            BprLinear::new(interactions, attributes, TrainingConfig::default()).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        model.train(&mut rng);

        assert!(model.predict(0, 0) > model.predict(0, 1));
        assert!(model.predict(1, 1) > model.predict(1, 0));
    }
}
