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

extern crate csv;
extern crate fnv;
extern crate serde_json;

use std;
use std::io;
use std::io::prelude::*;
use std::io::stdout;
use std::fs::File;
use std::path::Path;

use fnv::{FnvHashMap, FnvHashSet};

use metric::{EntropyResult, RunReport};
use recommend::RecommendationLists;
use types::{ItemId, ScoredItem, UserId};
use vocabulary::ItemTags;

/// Reads a CSV input file. We expect NO headers, and a tab-separated record per line.
pub fn csv_reader(file: &str) -> Result<csv::Reader<std::fs::File>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_path(file)
}

/// Reads item-tag pairs, one `item<TAB>tag` per line. Items may carry the same tag repeatedly.
pub fn item_tags_from_csv<R>(reader: &mut csv::Reader<R>) -> Result<ItemTags, csv::Error>
    where R: std::io::Read {

    let mut item_tags = ItemTags::new();

    for record in reader.deserialize() {
        let (item, tag): (ItemId, String) = record?;
        item_tags.add(item, tag);
    }

    Ok(item_tags)
}

/// Reads scored recommendations, one `user<TAB>item<TAB>score` per line.
pub fn recommendations_from_csv<R>(
    reader: &mut csv::Reader<R>
) -> Result<RecommendationLists, csv::Error>
    where R: std::io::Read {

    let mut lists = RecommendationLists::new();

    for record in reader.deserialize() {
        let (user, item, score): (UserId, ItemId, f64) = record?;
        lists.add(user, ScoredItem::new(item, score));
    }

    Ok(lists)
}

/// Reads the training interactions, one `user<TAB>item` per line.
pub fn histories_from_csv<R>(
    reader: &mut csv::Reader<R>
) -> Result<FnvHashMap<UserId, FnvHashSet<ItemId>>, csv::Error>
    where R: std::io::Read {

    let mut histories: FnvHashMap<UserId, FnvHashSet<ItemId>> =
        FnvHashMap::with_capacity_and_hasher(100, Default::default());

    for record in reader.deserialize() {
        let (user, item): (UserId, ItemId) = record?;
        histories.entry(user).or_insert_with(FnvHashSet::default).insert(item);
    }

    Ok(histories)
}

/// Struct used for JSON serialization of a user's result. Field names will be used in JSON.
#[derive(Serialize)]
struct UserResult {
    user: UserId,
    #[serde(rename = "TagEntropy")]
    entropy: f64,
}

/// Struct used for JSON serialization of the aggregate result of a run.
#[derive(Serialize)]
struct AggregateResult<'a> {
    list_size: usize,
    users: usize,
    users_without_result: usize,
    failed_users: usize,
    #[serde(flatten)]
    result: &'a EntropyResult,
}

/// Hands the result rows of a run to a JSON lines writer, one row per user followed by the
/// aggregate row. If a `results_path` is supplied, we write to a file at the specified path,
/// otherwise, we output to stdout.
pub fn write_results_to(
    report: &RunReport,
    list_size: usize,
    results_path: Option<String>,
) -> io::Result<()> {

    let mut out: Box<dyn Write> = match results_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    write_results(&mut out, report, list_size)
}

/// Writes the per-user rows and the aggregate row as JSON lines. The entropy of a run without
/// users is written as `null`.
pub fn write_results<W: Write>(
    out: &mut W,
    report: &RunReport,
    list_size: usize,
) -> io::Result<()> {

    for &(user, ref result) in report.per_user.iter() {
        let row = UserResult { user, entropy: result.entropy };
        writeln!(out, "{}", serde_json::to_string(&row)?)?;
    }

    let aggregate = AggregateResult {
        list_size,
        users: report.per_user.len(),
        users_without_result: report.without_result.len(),
        failed_users: report.failures.len(),
        result: &report.aggregate,
    };

    writeln!(out, "{}", serde_json::to_string(&aggregate)?)?;

    out.flush()
}
