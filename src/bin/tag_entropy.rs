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

extern crate getopts;
extern crate num_cpus;
extern crate scoped_pool;
extern crate tagentropy;
#[macro_use]
extern crate tracing;
extern crate tracing_subscriber;

use std::error::Error;
use std::env;
use std::io::stderr;
use std::process;

use getopts::Options;
use scoped_pool::Pool;
use tracing_subscriber::EnvFilter;

use tagentropy::io;
use tagentropy::{TagEntropyMetric, TagVocabulary, Vocabulary};

fn main() {

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("g", "tagsfile", "Item tags file name (required). The file must contain an item \
        and one of its tags per line, separated by a tab.", "PATH");
    opts.optopt("r", "recommendationsfile", "Recommendations file name (required). The file must \
        contain a user, a recommended item and its score per line, separated by tabs.", "PATH");
    opts.optopt("i", "trainingfile", "Training interactions file name (optional). Items a user \
        interacted with in training are never evaluated for that user. The file must contain a \
        user and item pair per line, separated by a tab.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("n", "list-size", "Number of recommendations to evaluate per user (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("t", "threads", "Number of worker threads (optional, defaults to the number of \
        CPUs).", "NUMBER");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        print_usage_and_exit(&program, opts, None);
    }

    let tags_path = match matches.opt_str("g") {
        Some(path) => path,
        None => print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a tags file via --tagsfile."),
        ),
    };

    let recommendations_path = match matches.opt_str("r") {
        Some(path) => path,
        None => print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a recommendations file via --recommendationsfile."),
        ),
    };

    let training_path = matches.opt_str("i");
    let results_path = matches.opt_str("o");

    let list_size: usize = match matches.opt_get_default("n", 10) {
        Ok(list_size) => list_size,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure.to_string());
            print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let num_threads: usize = match matches.opt_get_default("t", num_cpus::get()) {
        Ok(num_threads) if num_threads > 0 => num_threads,
        Ok(_) => {
            print_usage_and_exit(&program, opts, Some("Option 't' must be positive."))
        },
        Err(failure) => {
            let hint = format!("Problem with option 't': {}", failure.to_string());
            print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let evaluation = evaluate(
        &tags_path,
        &recommendations_path,
        training_path,
        list_size,
        num_threads,
        results_path,
    );

    match evaluation {
        Ok(0) => {},
        Ok(num_failures) => {
            error!("Evaluation failed for {} users", num_failures);
            process::exit(1);
        },
        Err(failure) => {
            error!("{}", failure);
            process::exit(2);
        },
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) -> ! {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(usage_exit_code(hint))
}

/// Asking for help is a success, everything else that ends in the usage is a bad invocation.
fn usage_exit_code(hint: Option<&str>) -> i32 {
    match hint {
        Some(_) => 1,
        None => 0,
    }
}

/// Returns the number of users whose evaluation failed.
fn evaluate(
    tags_path: &str,
    recommendations_path: &str,
    training_path: Option<String>,
    list_size: usize,
    num_threads: usize,
    results_path: Option<String>,
) -> Result<usize, Box<dyn Error>> {

    info!("Reading item tags from {}", tags_path);
    let mut tags_reader = io::csv_reader(tags_path)?;
    let item_tags = io::item_tags_from_csv(&mut tags_reader)?;

    let vocabulary = Vocabulary::from(&item_tags);

    info!("Found {} distinct tags for {} items.", vocabulary.num_tags(), item_tags.num_items());

    info!("Reading recommendations from {}", recommendations_path);
    let mut recommendations_reader = io::csv_reader(recommendations_path)?;
    let mut lists = io::recommendations_from_csv(&mut recommendations_reader)?;

    if let Some(training_path) = training_path {
        info!("Reading training interactions from {}", training_path);
        let mut training_reader = io::csv_reader(&training_path)?;
        let histories = io::histories_from_csv(&mut training_reader)?;
        lists = lists.with_histories(histories);
    }

    let users = lists.users();

    info!("Evaluating TagEntropy@{} for {} users on {} threads", list_size, users.len(), num_threads);

    let metric = TagEntropyMetric::new(list_size);
    let context = metric.create_context(&item_tags, &vocabulary);

    let pool = Pool::new(num_threads);
    let report = metric.evaluate_run(&users, &lists, &context, &pool);
    pool.shutdown();

    info!("Writing results...");
    io::write_results_to(&report, metric.list_size(), results_path)?;

    Ok(report.failures.len())
}


#[cfg(test)]
mod tests {

    use usage_exit_code;

    #[test]
    fn bad_invocation_is_not_a_success() {
        assert_eq!(usage_exit_code(Some("Please specify a tags file via --tagsfile.")), 1);
        assert_eq!(usage_exit_code(None), 0);
    }
}
