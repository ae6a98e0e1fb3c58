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

use fnv::FnvHashSet;

use error::EntropyError;
use types::{ItemId, ScoredItem};
use vocabulary::{ItemTagLookup, TagVocabulary};

/// Computes the tag entropy of a recommendation list.
///
/// Every distinct item `m` of the list spreads a probability mass of `1 / N` evenly over its
/// `t_m` distinct tags, so each (item, tag) pair has `p = 1 / (t_m * N)`. The entropy term
/// `-p * log2(p)` is computed per pair and the terms of items sharing a tag are summed up in the
/// slot of that tag. Note that this takes the logarithm before aggregating over items, it
/// therefore differs from the textbook entropy of the tag distribution whenever two recommended
/// items share a tag.
///
/// Duplicate items in the list and duplicate tags of an item are ignored, items without tags
/// contribute nothing and an empty list has an entropy of zero. Fails if the lookup returns a
/// tag which the vocabulary does not know.
pub fn compute_entropy<V: ?Sized, L: ?Sized>(
    recommendations: &[ScoredItem],
    vocabulary: &V,
    lookup: &L,
) -> Result<f64, EntropyError>
    where V: TagVocabulary, L: ItemTagLookup {

    let distinct_items: FnvHashSet<ItemId> = recommendations.iter()
        .map(|scored_item| scored_item.item)
        .collect();

    let num_items = distinct_items.len();

    if num_items == 0 {
        return Ok(0.0);
    }

    let mut entropies = vocabulary.new_vector();
    entropies.fill(0.0);

    for item in distinct_items.iter() {

        let item_tags: FnvHashSet<&str> = lookup.tags_of(*item).iter()
            .map(|tag| tag.as_str())
            .collect();

        let num_tags = item_tags.len();

        if num_tags == 0 {
            continue;
        }

        let p = (1.0 / num_tags as f64) * (1.0 / num_items as f64);
        let h = -p * p.log2();

        let mut item_entropies = vocabulary.new_vector();

        for tag in item_tags.iter() {
            let slot = vocabulary.slot_of(tag)?;
            item_entropies.set(slot, h)?;
        }

        entropies.add(&item_entropies)?;
    }

    Ok(entropies.sum())
}
