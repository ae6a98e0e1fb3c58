extern crate fnv;

use std::collections::BinaryHeap;

use fnv::{FnvHashMap, FnvHashSet};

use types::{ItemId, ScoredItem, UserId};

/// Produces the recommendations which get evaluated for a user.
pub trait RecommendationSource {
    /// Returns at most `list_size` items ordered by descending score, leaving out the items the
    /// user interacted with during training. `None` means there is no result for this user.
    fn recommendations(&self, user: UserId, list_size: usize) -> Option<Vec<ScoredItem>>;
}

/// Precomputed scored items per user, e.g. read from the output of a batch recommender.
#[derive(Debug, Default, Clone)]
pub struct RecommendationLists {
    scored_items: FnvHashMap<UserId, Vec<ScoredItem>>,
    histories: FnvHashMap<UserId, FnvHashSet<ItemId>>,
}

impl RecommendationLists {

    pub fn new() -> Self {
        RecommendationLists {
            scored_items: FnvHashMap::with_capacity_and_hasher(100, Default::default()),
            histories: FnvHashMap::with_capacity_and_hasher(0, Default::default()),
        }
    }

    /// Items the user consumed in the training data, they will never be handed out.
    pub fn with_histories(mut self, histories: FnvHashMap<UserId, FnvHashSet<ItemId>>) -> Self {
        self.histories = histories;
        self
    }

    pub fn add(&mut self, user: UserId, scored_item: ScoredItem) {
        self.scored_items.entry(user).or_insert_with(Vec::new).push(scored_item);
    }

    pub fn num_users(&self) -> usize {
        self.scored_items.len()
    }

    /// Users with recommendations, in ascending order.
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.scored_items.keys().cloned().collect();
        users.sort();
        users
    }
}

impl RecommendationSource for RecommendationLists {

    fn recommendations(&self, user: UserId, list_size: usize) -> Option<Vec<ScoredItem>> {

        let candidates = self.scored_items.get(&user)?;
        let history = self.histories.get(&user);

        let mut heap = BinaryHeap::with_capacity(list_size);

        for scored_item in candidates.iter() {

            let consumed = history.map_or(false, |items| items.contains(&scored_item.item));

            if consumed || list_size == 0 {
                continue;
            }

            if heap.len() < list_size {
                heap.push(*scored_item);
            } else if let Some(mut top) = heap.peek_mut() {
                if *scored_item < *top {
                    *top = *scored_item;
                }
            }
        }

        Some(heap.into_sorted_vec())
    }
}
