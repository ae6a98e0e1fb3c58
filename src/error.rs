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

use std::error::Error;
use std::fmt;

/// Faults raised while computing the tag entropy of a recommendation list. All of them indicate
/// that the item-tag lookup and the tag vocabulary of a run do not belong together.
#[derive(Debug, Clone, PartialEq)]
pub enum EntropyError {
    /// A tag returned by the lookup is not part of the vocabulary
    UnknownTag(String),
    /// The vocabulary resolved a tag to a slot outside of its own slot space
    SlotOutOfRange { slot: u32, dimensions: usize },
    /// Two tag vectors built from different vocabularies were combined
    DimensionMismatch { expected: usize, found: usize },
}

impl fmt::Display for EntropyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            EntropyError::UnknownTag(ref tag) =>
                write!(f, "Tag '{}' is not part of the vocabulary", tag),
            EntropyError::SlotOutOfRange { slot, dimensions } =>
                write!(f, "Slot {} is outside of a vocabulary with {} tags", slot, dimensions),
            EntropyError::DimensionMismatch { expected, found } =>
                write!(f, "Expected a tag vector with {} dimensions, found {}", expected, found),
        }
    }
}

impl Error for EntropyError {}
