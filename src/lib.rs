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

//! Tag entropy, a diversity metric for recommendation lists.
//!
//! The entropy of a single user's list is computed by [`compute_entropy`], a
//! [`TagEntropyMetric`] evaluates the users of an experimental run and averages their entropies
//! in a [`RunContext`].

extern crate csv;
extern crate fnv;
extern crate scoped_pool;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;
#[macro_use]
extern crate tracing;

pub mod types;
pub mod error;
pub mod vocabulary;
pub mod entropy;
pub mod recommend;
pub mod metric;
pub mod io;

pub use entropy::compute_entropy;
pub use error::EntropyError;
pub use metric::{COLUMN_LABEL, EntropyResult, RunContext, RunReport, TagEntropyMetric};
pub use recommend::{RecommendationLists, RecommendationSource};
pub use types::{ItemId, ScoredItem, SparseTagVector, UserId};
pub use vocabulary::{ItemTagLookup, ItemTags, TagVocabulary, Vocabulary};
