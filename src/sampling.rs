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

use rand::Rng;

use crate::data::InteractionIndex;

/// Draws `(user, positive item, negative item)` triples for the pairwise
/// updates. The positive item is one the user interacted with, the negative
/// item is one they did not, restricted to items with at least one
/// interaction globally, as an item nobody interacted with carries no signal
/// as a negative.
///
/// Users are rejection-sampled uniformly from the full id range until one
/// with a usable interaction count comes up. Frequent users are not favored
/// per draw; their triples dominate an epoch only through the number of
/// draws.
pub struct TripleSampler {
    fast_index: Option<FastSamplingIndex>,
}

/// Precomputed per-user arrays of eligible positive and negative items,
/// trading memory for O(1) draws without rejection. The arrays are filled
/// lazily, the first time a user is sampled.
struct FastSamplingIndex {
    positive_items: Vec<Option<Vec<u32>>>,
    negative_items: Vec<Option<Vec<u32>>>,
}

impl TripleSampler {

    /// Chooses the sampling strategy: the precomputed index is only used when
    /// its estimated footprint of `num_users * num_items * 4` bytes stays
    /// under `memory_limit_mib`.
    pub fn new(interactions: &InteractionIndex, memory_limit_mib: usize) -> Self {

        let estimated_bytes =
            interactions.num_users() as u64 * interactions.num_items() as u64 * 4;

        let fast_index = if estimated_bytes <= memory_limit_mib as u64 * 1024 * 1024 {
            Some(FastSamplingIndex {
                positive_items: vec![None; interactions.num_users()],
                negative_items: vec![None; interactions.num_users()],
            })
        } else {
            None
        };

        TripleSampler { fast_index }
    }

    pub fn uses_fast_sampling(&self) -> bool {
        self.fast_index.is_some()
    }

    pub fn sample<R: Rng>(
        &mut self,
        interactions: &InteractionIndex,
        rng: &mut R,
    ) -> (u32, u32, u32) {

        let user = sample_user(interactions, rng);

        let (positive_item, negative_item) = match self.fast_index {
            Some(ref mut fast_index) => fast_index.sample_pair(interactions, user, rng),
            None => sample_pair_direct(interactions, user, rng),
        };

        (user, positive_item, negative_item)
    }
}

/// Rejection-samples a user until one with `0 < |interactions| < num_items`
/// comes up. Users without interactions and users who interacted with every
/// item admit no pairwise comparison and are skipped.
fn sample_user<R: Rng>(interactions: &InteractionIndex, rng: &mut R) -> u32 {

    loop {
        let user = rng.gen_range(0..interactions.num_users() as u32);
        let num_items_of_user = interactions.items_of(user).len();

        if num_items_of_user > 0 && num_items_of_user < interactions.num_items() {
            return user;
        }
    }
}

/// Draws the positive item by index and rejection-samples the negative item
/// from the full item range. The rejection loop is unbounded; for a user who
/// interacted with nearly every known item it can take many rounds.
fn sample_pair_direct<R: Rng>(
    interactions: &InteractionIndex,
    user: u32,
    rng: &mut R,
) -> (u32, u32) {

    let items_of_user = interactions.items_of(user);
    let positive_item = items_of_user[rng.gen_range(0..items_of_user.len())];

    let negative_item = loop {
        let candidate = rng.gen_range(0..interactions.num_items() as u32);

        if !interactions.contains(user, candidate) && interactions.item_is_known(candidate) {
            break candidate;
        }
    };

    (positive_item, negative_item)
}

impl FastSamplingIndex {

    fn sample_pair<R: Rng>(
        &mut self,
        interactions: &InteractionIndex,
        user: u32,
        rng: &mut R,
    ) -> (u32, u32) {

        self.ensure_user(interactions, user);

        let positive_items = self.positive_items[user as usize].as_ref().unwrap();
        let negative_items = self.negative_items[user as usize].as_ref().unwrap();

        let positive_item = positive_items[rng.gen_range(0..positive_items.len())];
        let negative_item = negative_items[rng.gen_range(0..negative_items.len())];

        (positive_item, negative_item)
    }

    fn ensure_user(&mut self, interactions: &InteractionIndex, user: u32) {

        if self.positive_items[user as usize].is_some() {
            return;
        }

        let positive_items = interactions.items_of(user).to_vec();

        let negative_items: Vec<u32> = (0..interactions.num_items() as u32)
            .filter(|&item| {
                !interactions.contains(user, item) && interactions.item_is_known(item)
            })
            .collect();

        self.positive_items[user as usize] = Some(positive_items);
        self.negative_items[user as usize] = Some(negative_items);
    }
}


#[cfg(test)]
mod tests {

    use fnv::FnvHashSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::TripleSampler;
    use crate::data::InteractionIndex;

    /// 3 users, 4 items; item 3 has no interactions at all and must never
    /// show up as a negative.
    fn small_dataset() -> InteractionIndex {
        let mut interactions = InteractionIndex::with_dimensions(3, 4);
        interactions.insert(0, 0);
        interactions.insert(0, 2);
        interactions.insert(1, 1);
        interactions.insert(1, 2);
        interactions.insert(2, 0);
        interactions
    }

    fn all_valid_triples(interactions: &InteractionIndex) -> FnvHashSet<(u32, u32, u32)> {

        let mut triples = FnvHashSet::default();

        for user in 0..interactions.num_users() as u32 {
            let num_items_of_user = interactions.items_of(user).len();
            if num_items_of_user == 0 || num_items_of_user == interactions.num_items() {
                continue;
            }

            for &positive in interactions.items_of(user) {
                for negative in 0..interactions.num_items() as u32 {
                    if !interactions.contains(user, negative)
                        && interactions.item_is_known(negative)
                    {
                        triples.insert((user, positive, negative));
                    }
                }
            }
        }

        triples
    }

    fn collect_samples(
        interactions: &InteractionIndex,
        memory_limit_mib: usize,
        num_draws: usize,
        seed: u64,
    ) -> FnvHashSet<(u32, u32, u32)> {

        let mut sampler = TripleSampler::new(interactions, memory_limit_mib);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut observed = FnvHashSet::default();
        for _ in 0..num_draws {
            observed.insert(sampler.sample(interactions, &mut rng));
        }

        observed
    }

    #[test]
    fn memory_limit_selects_the_strategy() {

        let interactions = small_dataset();

        assert!(!TripleSampler::new(&interactions, 0).uses_fast_sampling());
        assert!(TripleSampler::new(&interactions, 1024).uses_fast_sampling());
    }

    #[test]
    fn sampled_triples_are_valid() {

        let interactions = small_dataset();

        for memory_limit_mib in &[0, 1024] {
            let mut sampler = TripleSampler::new(&interactions, *memory_limit_mib);
            let mut rng = StdRng::seed_from_u64(42);

            for _ in 0..2_000 {
                let (user, positive, negative) = sampler.sample(&interactions, &mut rng);

                assert!(interactions.contains(user, positive));
                assert!(!interactions.contains(user, negative));
                assert!(interactions.item_is_known(negative));
                // item 3 has no interactions and is no legitimate negative
                assert_ne!(negative, 3);
            }
        }
    }

    #[test]
    fn both_strategies_reach_the_full_triple_population() {

        let interactions = small_dataset();
        let expected = all_valid_triples(&interactions);

        let direct = collect_samples(&interactions, 0, 20_000, 42);
        let fast = collect_samples(&interactions, 1024, 20_000, 43);

        assert_eq!(direct, expected);
        assert_eq!(fast, expected);
    }

    #[test]
    fn ineligible_users_are_never_sampled() {

        // user 1 has no interactions, user 2 interacted with every item
        let mut interactions = InteractionIndex::with_dimensions(3, 2);
        interactions.insert(0, 0);
        interactions.insert(2, 0);
        interactions.insert(2, 1);

        let mut sampler = TripleSampler::new(&interactions, 1024);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..2_000 {
            let (user, _, _) = sampler.sample(&interactions, &mut rng);
            assert_eq!(user, 0);
        }
    }
}
