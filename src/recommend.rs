use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::data::InteractionIndex;
use crate::Scorable;

/// Result type used to keep the top-n scored items per user via a binary
/// heap.
#[derive(PartialEq, Debug)]
pub struct ScoredItem {
    pub item: u32,
    pub score: f64,
}

/// Ordering for our max-heap. Note that we must use a special implementation
/// here as there is no total order on floating point numbers.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal,
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Scores every item a user has not interacted with yet and retains the
/// `how_many` highest scoring ones per user, in descending score order.
pub fn recommend<S: Scorable>(
    model: &S,
    interactions: &InteractionIndex,
    how_many: usize,
) -> Vec<Vec<ScoredItem>> {

    let num_users = interactions.num_users();
    let num_items = interactions.num_items();

    let mut recommendations: Vec<Vec<ScoredItem>> = Vec::with_capacity(num_users);

    for user in 0..num_users as u32 {

        let mut heap = BinaryHeap::with_capacity(how_many);

        for item in 0..num_items as u32 {

            if interactions.contains(user, item) {
                continue;
            }

            let scored_item = ScoredItem { item, score: model.predict(user, item) };

            if heap.len() < how_many {
                heap.push(scored_item);
            } else {
                let mut top = heap.peek_mut().unwrap();
                if scored_item < *top {
                    *top = scored_item;
                }
            }
        }

        recommendations.push(heap.into_sorted_vec());
    }

    recommendations
}


#[cfg(test)]
mod tests {

    use super::{recommend, ScoredItem};
    use crate::data::InteractionIndex;
    use crate::Scorable;

    struct ScoreTable {
        scores: Vec<Vec<f64>>,
    }

    impl Scorable for ScoreTable {
        fn predict(&self, user: u32, item: u32) -> f64 {
            self.scores[user as usize][item as usize]
        }
    }

    #[test]
    fn scored_item_ordering_reversed() {
        let item_a = ScoredItem { item: 1, score: 0.5 };
        let item_b = ScoredItem { item: 2, score: 1.5 };
        let item_c = ScoredItem { item: 3, score: 0.3 };

        assert!(item_a > item_b);
        assert!(item_a < item_c);
        assert!(item_b < item_c);
    }

    #[test]
    fn top_n_skips_the_interaction_history() {

        let mut interactions = InteractionIndex::with_dimensions(2, 4);
        interactions.insert(0, 0);
        interactions.insert(1, 3);

        let model = ScoreTable {
            scores: vec![
                vec![9.0, 0.25, 0.5, 0.125],
                vec![0.5, 1.0, 0.75, 9.0],
            ],
        };

        let recommendations = recommend(&model, &interactions, 2);

        // item 0 is in user 0's history, despite its high score
        assert_eq!(recommendations[0].len(), 2);
        assert_eq!(recommendations[0][0].item, 2);
        assert_eq!(recommendations[0][1].item, 1);

        assert_eq!(recommendations[1].len(), 2);
        assert_eq!(recommendations[1][0].item, 1);
        assert_eq!(recommendations[1][1].item, 2);
    }
}
