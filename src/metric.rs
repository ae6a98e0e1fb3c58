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
extern crate scoped_pool;

use std::sync::Mutex;
use std::sync::mpsc;
use std::time::Instant;

use fnv::FnvHashSet;
use scoped_pool::Pool;

use entropy;
use error::EntropyError;
use recommend::RecommendationSource;
use types::UserId;
use vocabulary::{ItemTagLookup, TagVocabulary};

/// Name of the result column holding the tag entropy.
pub const COLUMN_LABEL: &str = "TagEntropy";

/// Result row of the metric, used for single users as well as for the aggregate of a run.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct EntropyResult {
    #[serde(rename = "TagEntropy")]
    pub entropy: f64,
}

impl EntropyResult {
    pub fn new(entropy: f64) -> Self {
        EntropyResult { entropy }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    total_entropy: f64,
    user_count: usize,
}

/// Accumulates the entropies of all users evaluated for one algorithm on one dataset. The
/// context also holds the tag data of the run.
pub struct RunContext<'a, L: 'a + ?Sized, V: 'a + ?Sized> {
    lookup: &'a L,
    vocabulary: &'a V,
    totals: Mutex<Totals>,
}

impl<'a, L: 'a + ?Sized, V: 'a + ?Sized> RunContext<'a, L, V>
    where L: ItemTagLookup, V: TagVocabulary {

    pub fn new(lookup: &'a L, vocabulary: &'a V) -> Self {
        RunContext { lookup, vocabulary, totals: Mutex::new(Totals::default()) }
    }

    pub fn lookup(&self) -> &'a L {
        self.lookup
    }

    pub fn vocabulary(&self) -> &'a V {
        self.vocabulary
    }

    /// Adds the entropy of one user, can be called from several threads.
    pub fn add_user(&self, entropy: f64) {
        let mut totals = self.totals.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        totals.total_entropy += entropy;
        totals.user_count += 1;
    }

    pub fn user_count(&self) -> usize {
        self.totals.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).user_count
    }

    /// Average entropy over all users added so far, `NaN` if no user was added.
    pub fn mean_entropy(&self) -> f64 {
        let totals = *self.totals.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if totals.user_count == 0 {
            f64::NAN
        } else {
            totals.total_entropy / totals.user_count as f64
        }
    }
}

/// Outcome of evaluating all users of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Users with a result, in ascending order of their ids
    pub per_user: Vec<(UserId, EntropyResult)>,
    /// Users without recommendations
    pub without_result: Vec<UserId>,
    pub failures: Vec<(UserId, EntropyError)>,
    pub aggregate: EntropyResult,
}

/// Measures the tag entropy of the top `list_size` recommendations of each user.
#[derive(Debug, Clone, Copy)]
pub struct TagEntropyMetric {
    list_size: usize,
}

impl TagEntropyMetric {

    pub fn new(list_size: usize) -> Self {
        TagEntropyMetric { list_size }
    }

    pub fn list_size(&self) -> usize {
        self.list_size
    }

    /// Distinguishes the columns of metrics computed for different list sizes.
    pub fn suffix(&self) -> String {
        self.list_size.to_string()
    }

    /// Creates the context for evaluating one algorithm on one dataset, bound to the tag data
    /// of that run.
    pub fn create_context<'a, L: ?Sized, V: ?Sized>(
        &self,
        lookup: &'a L,
        vocabulary: &'a V,
    ) -> RunContext<'a, L, V>
        where L: ItemTagLookup, V: TagVocabulary {

        RunContext::new(lookup, vocabulary)
    }

    /// Computes the entropy of a user's recommendations without touching the accumulated
    /// totals. Returns `None` if there are no recommendations for the user.
    pub fn user_entropy<S: ?Sized, L: ?Sized, V: ?Sized>(
        &self,
        user: UserId,
        source: &S,
        context: &RunContext<L, V>,
    ) -> Result<Option<f64>, EntropyError>
        where S: RecommendationSource, L: ItemTagLookup, V: TagVocabulary {

        match source.recommendations(user, self.list_size) {
            Some(recommendations) => {
                let entropy = entropy::compute_entropy(
                    &recommendations,
                    context.vocabulary(),
                    context.lookup(),
                )?;
                Ok(Some(entropy))
            },
            None => Ok(None),
        }
    }

    /// Evaluates a single user and records the entropy in the context.
    pub fn measure_user<S: ?Sized, L: ?Sized, V: ?Sized>(
        &self,
        user: UserId,
        source: &S,
        context: &RunContext<L, V>,
    ) -> Result<Option<EntropyResult>, EntropyError>
        where S: RecommendationSource, L: ItemTagLookup, V: TagVocabulary {

        let outcome = self.user_entropy(user, source, context)?;

        Ok(outcome.map(|entropy| {
            context.add_user(entropy);
            EntropyResult::new(entropy)
        }))
    }

    /// Aggregate result of a run.
    pub fn aggregate<L: ?Sized, V: ?Sized>(&self, context: &RunContext<L, V>) -> EntropyResult
        where L: ItemTagLookup, V: TagVocabulary {

        EntropyResult::new(context.mean_entropy())
    }

    /// Evaluates all `users` on the worker pool, users listed more than once are evaluated once.
    /// Workers only compute entropies and send them back over a channel, the calling thread adds
    /// them to the context one after another.
    pub fn evaluate_run<S: ?Sized, L: ?Sized, V: ?Sized>(
        &self,
        users: &[UserId],
        source: &S,
        context: &RunContext<L, V>,
        pool: &Pool,
    ) -> RunReport
        where S: RecommendationSource + Sync, L: ItemTagLookup + Sync, V: TagVocabulary + Sync {

        let run_start = Instant::now();
        let (sender, receiver) = mpsc::channel();

        let mut seen = FnvHashSet::with_capacity_and_hasher(users.len(), Default::default());

        pool.scoped(|scope| {
            for user in users.iter() {

                let user = *user;

                if !seen.insert(user) {
                    continue;
                }

                let sender = sender.clone();

                scope.execute(move || {
                    let outcome = self.user_entropy(user, source, context);
                    // The receiver outlives the scope, sending cannot fail
                    let _ = sender.send((user, outcome));
                });
            }
        });

        drop(sender);

        let mut per_user = Vec::with_capacity(users.len());
        let mut without_result = Vec::new();
        let mut failures = Vec::new();

        for (user, outcome) in receiver.iter() {
            match outcome {
                Ok(Some(entropy)) => {
                    debug!(user, entropy, "evaluated user");
                    context.add_user(entropy);
                    per_user.push((user, EntropyResult::new(entropy)));
                },
                Ok(None) => {
                    debug!(user, "no recommendations for user");
                    without_result.push(user);
                },
                Err(failure) => {
                    error!(user, error = %failure, "evaluation of user failed");
                    failures.push((user, failure));
                },
            }
        }

        per_user.sort_by_key(|&(user, _)| user);
        without_result.sort();
        failures.sort_by_key(|&(user, _)| user);

        let aggregate = self.aggregate(context);

        info!(
            users = per_user.len(),
            without_result = without_result.len(),
            failures = failures.len(),
            mean_entropy = aggregate.entropy,
            millis = run_start.elapsed().as_millis() as u64,
            "evaluated run"
        );

        if per_user.is_empty() {
            warn!("no user produced a result, the mean entropy of the run is undefined");
        }

        RunReport { per_user, without_result, failures, aggregate }
    }
}


#[cfg(test)]
mod tests {

    use scoped_pool::Pool;
    use serde_json;

    use error::EntropyError;
    use metric::{COLUMN_LABEL, EntropyResult, TagEntropyMetric};
    use recommend::RecommendationLists;
    use types::ScoredItem;
    use vocabulary::{ItemTags, Vocabulary};

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-9
    }

    fn genres() -> ItemTags {
        vec![
            (1_u64, "action"),
            (2, "action"),
            (2, "drama"),
            (3, "drama"),
        ].into_iter().collect()
    }

    fn lists() -> RecommendationLists {
        let mut lists = RecommendationLists::new();
        // entropy 1.5
        lists.add(10, ScoredItem::new(1, 0.9));
        lists.add(10, ScoredItem::new(2, 0.8));
        // entropy 0.0
        lists.add(20, ScoredItem::new(3, 0.4));
        // entropy 1.0
        lists.add(30, ScoredItem::new(1, 0.3));
        lists.add(30, ScoredItem::new(3, 0.2));
        lists
    }

    #[test]
    fn mean_over_users() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&item_tags, &vocabulary);

        context.add_user(1.5);
        context.add_user(0.5);
        context.add_user(1.0);

        assert_eq!(context.user_count(), 3);
        assert!(close_enough_to(metric.aggregate(&context).entropy, 1.0));
        // reading does not change the state
        assert!(close_enough_to(metric.aggregate(&context).entropy, 1.0));
    }

    #[test]
    fn concurrent_adds_are_not_lost() {

        const NUM_USERS: usize = 5000;

        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&item_tags, &vocabulary);
        let pool = Pool::new(4);

        pool.scoped(|scope| {
            for _ in 0..NUM_USERS {
                let context = &context;
                scope.execute(move || context.add_user(1.0));
            }
        });
        pool.shutdown();

        assert_eq!(context.user_count(), NUM_USERS);
        assert!(close_enough_to(context.mean_entropy(), 1.0));
    }

    #[test]
    fn repeated_users_are_evaluated_once() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let lists = lists();
        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&item_tags, &vocabulary);
        let pool = Pool::new(2);

        let report = metric.evaluate_run(&[10, 30, 10, 40, 10, 40], &lists, &context, &pool);
        pool.shutdown();

        let users: Vec<u64> = report.per_user.iter().map(|&(user, _)| user).collect();
        assert_eq!(users, vec![10, 30]);
        assert_eq!(report.without_result, vec![40]);
        assert_eq!(context.user_count(), 2);
        assert!(close_enough_to(report.aggregate.entropy, 1.25));
    }

    #[test]
    fn mean_without_users_is_nan() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&item_tags, &vocabulary);

        assert_eq!(context.user_count(), 0);
        assert!(context.mean_entropy().is_nan());
    }

    #[test]
    fn measure_user_accumulates() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let lists = lists();
        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&item_tags, &vocabulary);

        let result = metric.measure_user(10, &lists, &context).unwrap().unwrap();
        assert!(close_enough_to(result.entropy, 1.5));

        // no recommendations for user 40
        assert_eq!(metric.measure_user(40, &lists, &context), Ok(None));

        let result = metric.measure_user(20, &lists, &context).unwrap().unwrap();
        assert!(close_enough_to(result.entropy, 0.0));

        assert_eq!(context.user_count(), 2);
        assert!(close_enough_to(metric.aggregate(&context).entropy, 0.75));
    }

    #[test]
    fn list_size_truncates_recommendations() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let lists = lists();
        let metric = TagEntropyMetric::new(1);
        let context = metric.create_context(&item_tags, &vocabulary);

        // only item 1 is left, a single item with a single tag
        let result = metric.measure_user(10, &lists, &context).unwrap().unwrap();
        assert!(close_enough_to(result.entropy, 0.0));
        assert_eq!(metric.suffix(), "1");
    }

    #[test]
    fn failing_user_is_not_accumulated() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let mut lists = lists();
        lists.add(50, ScoredItem::new(4, 1.0));

        let mut other_tags = genres();
        other_tags.add(4, String::from("noir"));

        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&other_tags, &vocabulary);

        assert_eq!(
            metric.measure_user(50, &lists, &context),
            Err(EntropyError::UnknownTag(String::from("noir")))
        );
        assert_eq!(context.user_count(), 0);
    }

    #[test]
    fn parallel_run() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let mut lists = lists();
        lists.add(50, ScoredItem::new(4, 1.0));

        let mut other_tags = genres();
        other_tags.add(4, String::from("noir"));

        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&other_tags, &vocabulary);
        let pool = Pool::new(3);

        let report = metric.evaluate_run(&[30, 10, 40, 20, 50], &lists, &context, &pool);
        pool.shutdown();

        let users: Vec<u64> = report.per_user.iter().map(|&(user, _)| user).collect();
        assert_eq!(users, vec![10, 20, 30]);
        assert!(close_enough_to(report.per_user[0].1.entropy, 1.5));
        assert!(close_enough_to(report.per_user[2].1.entropy, 1.0));

        assert_eq!(report.without_result, vec![40]);
        assert_eq!(report.failures, vec![(50, EntropyError::UnknownTag(String::from("noir")))]);

        assert_eq!(context.user_count(), 3);
        assert!(close_enough_to(report.aggregate.entropy, 2.5 / 3.0));
    }

    #[test]
    fn run_without_users_reports_nan() {
        let item_tags = genres();
        let vocabulary = Vocabulary::from(&item_tags);
        let metric = TagEntropyMetric::new(10);
        let context = metric.create_context(&item_tags, &vocabulary);
        let pool = Pool::new(1);

        let report = metric.evaluate_run(&[40], &RecommendationLists::new(), &context, &pool);
        pool.shutdown();

        assert!(report.per_user.is_empty());
        assert!(report.aggregate.entropy.is_nan());
    }

    #[test]
    fn result_column() {
        let row = serde_json::to_value(EntropyResult::new(1.5)).unwrap();
        assert_eq!(row[COLUMN_LABEL], 1.5);
    }
}
