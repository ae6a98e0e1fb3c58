/**
 * TagEntropy
 * Copyright (C) 2018 Sebastian Schelter
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

extern crate fnv;

use std::cmp::Ordering;

use fnv::FnvHashMap;

use error::EntropyError;

pub type ItemId = u64;
pub type UserId = u64;

/// A recommended item together with the score the recommender assigned to it.
#[derive(PartialEq,Clone,Copy,Debug)]
pub struct ScoredItem {
    pub item: ItemId,
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item: ItemId, score: f64) -> Self {
        ScoredItem { item, score }
    }
}

/// Ordering for a bounded max-heap holding the top-n items, note that we must use a special
/// implementation here as there is no total order on floating point numbers.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(Ordering::Less) => Ordering::Greater,
        Some(Ordering::Greater) => Ordering::Less,
        Some(Ordering::Equal) => Ordering::Equal,
        None => Ordering::Equal
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

/// Real-valued vector over the slot space of a tag vocabulary. Only occupied slots are stored,
/// and the set of occupied slots never shrinks.
#[derive(Clone,Debug,PartialEq)]
pub struct SparseTagVector {
    dimensions: usize,
    entries: FnvHashMap<u32, f64>,
}

impl SparseTagVector {

    pub fn new(dimensions: usize) -> Self {
        SparseTagVector {
            dimensions,
            entries: FnvHashMap::with_capacity_and_hasher(0, Default::default()),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slot: u32) -> Option<f64> {
        self.entries.get(&slot).cloned()
    }

    /// Occupies every slot of the vocabulary with `value`.
    pub fn fill(&mut self, value: f64) {
        self.entries.reserve(self.dimensions);
        for slot in 0..self.dimensions as u32 {
            self.entries.insert(slot, value);
        }
    }

    /// Overwrites the value of `slot`.
    pub fn set(&mut self, slot: u32, value: f64) -> Result<(), EntropyError> {
        if slot as usize >= self.dimensions {
            return Err(EntropyError::SlotOutOfRange { slot, dimensions: self.dimensions });
        }
        self.entries.insert(slot, value);
        Ok(())
    }

    /// Elementwise addition, slots missing on either side count as zero.
    pub fn add(&mut self, other: &SparseTagVector) -> Result<(), EntropyError> {
        if other.dimensions != self.dimensions {
            return Err(EntropyError::DimensionMismatch {
                expected: self.dimensions,
                found: other.dimensions,
            });
        }

        for (slot, value) in other.entries.iter() {
            *self.entries.entry(*slot).or_insert(0.0) += *value;
        }

        Ok(())
    }

    pub fn sum(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item=(u32, f64)> + 'a {
        self.entries.iter().map(|(slot, value)| (*slot, *value))
    }
}
