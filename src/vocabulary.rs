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

use fnv::FnvHashMap;

use error::EntropyError;
use types::{ItemId, SparseTagVector};

/// Gives access to the tags attached to an item. The returned tags may contain duplicates,
/// items without tags yield an empty slice.
pub trait ItemTagLookup {
    fn tags_of(&self, item: ItemId) -> &[String];
}

/// Universe of known tags of an evaluation run, each tag owns a stable slot in `0..num_tags()`.
pub trait TagVocabulary {

    fn num_tags(&self) -> usize;

    fn has_tag(&self, tag: &str) -> bool;

    /// Resolves the slot of a tag, unknown tags are an error.
    fn slot_of(&self, tag: &str) -> Result<u32, EntropyError>;

    fn new_vector(&self) -> SparseTagVector {
        SparseTagVector::new(self.num_tags())
    }
}

/// In-memory tag lists per item.
#[derive(Debug, Default, Clone)]
pub struct ItemTags {
    tags: FnvHashMap<ItemId, Vec<String>>,
}

impl ItemTags {

    pub fn new() -> Self {
        ItemTags { tags: FnvHashMap::with_capacity_and_hasher(100, Default::default()) }
    }

    pub fn add(&mut self, item: ItemId, tag: String) {
        self.tags.entry(item).or_insert_with(Vec::new).push(tag);
    }

    pub fn num_items(&self) -> usize {
        self.tags.len()
    }

    /// Items in arbitrary order, the tags of an item in the order they were added.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item=(ItemId, &'a [String])> + 'a {
        self.tags.iter().map(|(item, tags)| (*item, tags.as_slice()))
    }
}

impl<S: Into<String>> ::std::iter::FromIterator<(ItemId, S)> for ItemTags {
    fn from_iter<T: IntoIterator<Item=(ItemId, S)>>(iter: T) -> Self {
        let mut item_tags = ItemTags::new();
        for (item, tag) in iter {
            item_tags.add(item, tag.into());
        }
        item_tags
    }
}

impl ItemTagLookup for ItemTags {
    fn tags_of(&self, item: ItemId) -> &[String] {
        match self.tags.get(&item) {
            Some(tags) => tags.as_slice(),
            None => &[],
        }
    }
}

/// Tag vocabulary backed by a hash map. Slots are handed out in the order in which tags are
/// first seen.
#[derive(Debug, Default, Clone)]
pub struct Vocabulary {
    slots: FnvHashMap<String, u32>,
    tag_names: Vec<String>,
}

impl Vocabulary {

    pub fn new() -> Self {
        Vocabulary {
            slots: FnvHashMap::with_capacity_and_hasher(100, Default::default()),
            tag_names: Vec::with_capacity(100),
        }
    }

    /// Returns the slot of the tag, assigning the next free slot if the tag is new.
    pub fn insert(&mut self, tag: &str) -> u32 {
        if let Some(slot) = self.slots.get(tag) {
            return *slot;
        }

        let slot = self.tag_names.len() as u32;
        self.slots.insert(tag.to_owned(), slot);
        self.tag_names.push(tag.to_owned());
        slot
    }

    pub fn tag_name(&self, slot: u32) -> Option<&str> {
        self.tag_names.get(slot as usize).map(|name| name.as_str())
    }
}

impl<'a> From<&'a ItemTags> for Vocabulary {

    fn from(item_tags: &'a ItemTags) -> Self {

        let mut items: Vec<(ItemId, &[String])> = item_tags.iter().collect();
        // Slot numbering should not depend on hash map iteration order
        items.sort_by_key(|&(item, _)| item);

        let mut vocabulary = Vocabulary::new();
        for (_, tags) in items {
            for tag in tags {
                vocabulary.insert(tag);
            }
        }

        vocabulary
    }
}

impl TagVocabulary for Vocabulary {

    fn num_tags(&self) -> usize {
        self.tag_names.len()
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.slots.contains_key(tag)
    }

    fn slot_of(&self, tag: &str) -> Result<u32, EntropyError> {
        self.slots.get(tag)
            .cloned()
            .ok_or_else(|| EntropyError::UnknownTag(tag.to_owned()))
    }
}


#[cfg(test)]
mod tests {

    use error::EntropyError;
    use vocabulary::{ItemTagLookup, ItemTags, TagVocabulary, Vocabulary};

    fn movie_tags() -> ItemTags {
        vec![
            (2_u64, "action"),
            (1, "drama"),
            (1, "action"),
            (1, "drama"),
            (3, "Drama"),
        ].into_iter().collect()
    }

    #[test]
    fn lookup_keeps_duplicates() {
        let item_tags = movie_tags();

        assert_eq!(item_tags.num_items(), 3);
        assert_eq!(item_tags.tags_of(1), &["drama", "action", "drama"]);
        assert!(item_tags.tags_of(42).is_empty());
    }

    #[test]
    fn slots_are_dense_and_stable() {
        let vocabulary = Vocabulary::from(&movie_tags());

        assert_eq!(vocabulary.num_tags(), 3);
        assert_eq!(vocabulary.slot_of("drama"), Ok(0));
        assert_eq!(vocabulary.slot_of("action"), Ok(1));
        assert_eq!(vocabulary.slot_of("Drama"), Ok(2));
        assert_eq!(vocabulary.tag_name(1), Some("action"));
        assert_eq!(vocabulary.tag_name(3), None);
    }

    #[test]
    fn tags_are_case_sensitive() {
        let mut vocabulary = Vocabulary::new();
        vocabulary.insert("Comedy");

        assert!(vocabulary.has_tag("Comedy"));
        assert!(!vocabulary.has_tag("comedy"));
    }

    #[test]
    fn inserting_known_tag_keeps_slot() {
        let mut vocabulary = Vocabulary::new();
        assert_eq!(vocabulary.insert("a"), 0);
        assert_eq!(vocabulary.insert("b"), 1);
        assert_eq!(vocabulary.insert("a"), 0);
        assert_eq!(vocabulary.num_tags(), 2);
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let vocabulary = Vocabulary::from(&movie_tags());
        assert_eq!(vocabulary.slot_of("horror"), Err(EntropyError::UnknownTag(String::from("horror"))));
    }

    #[test]
    fn new_vector_spans_vocabulary() {
        let vocabulary = Vocabulary::from(&movie_tags());
        let vector = vocabulary.new_vector();

        assert_eq!(vector.dimensions(), 3);
        assert!(vector.is_empty());
    }
}
