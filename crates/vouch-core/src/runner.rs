//! The test runner
//!
//! Owns the per-suite registry, the four append-only outcome buckets, the
//! coverage accumulator and the top-level execution loop. The runner is an
//! explicitly constructed context: test registration goes through
//! [`Runner::test`] / [`Runner::test_each`] (or a [`Definition`] loaded by
//! the discovery collaborator), never through process-global state.
//!
//! `run` is the error boundary: every registered test lands in exactly one
//! bucket; only discovery and configuration errors (no tests found, unknown
//! suite, missing callback, unknown dependency, dependency cycle) abort the
//! run.

use crate::coverage::Coverage;
use crate::report::{Reporter, TestReport};
use crate::schedule;
use crate::test::{Callback, CoverTag, Expectation, Outcome, Test, TestCtx, TestId, TestResult};
use crate::{RunnerError, RunnerResult};
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::rc::Rc;
use vouch_config::Options;

/// A test-definition source: registers its tests against the runner when
/// loaded. Definition functions are plain `fn` items so sources stay
/// declarative.
pub type DefineFn = fn(&mut Runner);

/// One discovered definition source.
pub struct Definition {
    pub source: PathBuf,
    define: DefineFn,
}

impl Definition {
    pub fn new(source: impl Into<PathBuf>, define: DefineFn) -> Self {
        Definition {
            source: source.into(),
            define,
        }
    }

    pub fn register(&self, runner: &mut Runner) {
        (self.define)(runner);
    }
}

/// The file-discovery collaborator: resolves requested paths into
/// definition sources. An empty resolution is the fatal "no tests found"
/// condition.
pub trait Discovery {
    fn discover(&self, paths: &[PathBuf]) -> RunnerResult<Vec<Definition>>;
}

/// Aggregate state of a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Tests loaded across all suites, including any still pending.
    pub total: usize,
    pub passed: Vec<TestReport>,
    pub failures: Vec<TestReport>,
    pub errors: Vec<TestReport>,
    pub skipped: Vec<TestReport>,
}

impl RunSummary {
    /// The run succeeded only if every loaded test passed.
    pub fn all_passed(&self) -> bool {
        self.passed.len() == self.total
    }
}

/// The test runner: registry, buckets, coverage, execution loop.
pub struct Runner {
    tests: Vec<Test>,
    next_id: u64,
    summary: RunSummary,
    coverage: Coverage,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    pub fn new() -> Self {
        Runner {
            tests: Vec::new(),
            next_id: 0,
            summary: RunSummary::default(),
            coverage: Coverage::new(false),
        }
    }

    /// Replace the coverage accumulator (typically enabled from options).
    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.coverage = coverage;
        self
    }

    /// Register a test with a callback. Returns a builder for declaring
    /// dependencies, expectations and coverage tags.
    pub fn test<F>(&mut self, name: impl Into<String>, callback: F) -> TestBuilder<'_>
    where
        F: Fn(&TestCtx) -> TestResult<()> + 'static,
    {
        let id = self.register(name.into(), Some(Rc::new(callback)));
        TestBuilder {
            runner: self,
            ids: vec![id],
        }
    }

    /// Register a test without a callback yet; running it before
    /// [`TestBuilder::execute`] supplies one is a configuration error.
    pub fn declare(&mut self, name: impl Into<String>) -> TestBuilder<'_> {
        let id = self.register(name.into(), None);
        TestBuilder {
            runner: self,
            ids: vec![id],
        }
    }

    /// Data-provider expansion: one test per row. The first test reuses
    /// `name`; each subsequent row is registered as `"<name> #<i>"`. All
    /// rows share the callback, and builder operations apply to every row's
    /// test, so each reaches its terminal state independently.
    pub fn test_each<R, F>(&mut self, name: &str, rows: Vec<R>, callback: F) -> TestBuilder<'_>
    where
        R: 'static,
        F: Fn(&TestCtx, &R) -> TestResult<()> + 'static,
    {
        let rows = Rc::new(rows);
        let callback = Rc::new(callback);

        let mut ids = Vec::with_capacity(rows.len());
        for index in 0..rows.len() {
            let test_name = if index == 0 {
                name.to_string()
            } else {
                format!("{} #{}", name, index)
            };

            let rows = Rc::clone(&rows);
            let callback = Rc::clone(&callback);
            let bound: Callback = Rc::new(move |t: &TestCtx| callback(t, &rows[index]));
            ids.push(self.register(test_name, Some(bound)));
        }

        TestBuilder { runner: self, ids }
    }

    /// Append to the current registry; no dedup, no identity check.
    fn register(&mut self, name: String, callback: Option<Callback>) -> TestId {
        let id = TestId(self.next_id);
        self.next_id += 1;
        self.tests.push(Test::new(name, id, callback));
        id
    }

    /// The registry for the suite currently loading.
    pub fn tests(&self) -> &[Test] {
        &self.tests
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    pub fn coverage_mut(&mut self) -> &mut Coverage {
        &mut self.coverage
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Run every suite selected by the options (all configured suites, the
    /// one named by `--suite`, or an ad-hoc suite from positional paths).
    pub fn run(
        &mut self,
        options: &Options,
        args: &[PathBuf],
        discovery: &dyn Discovery,
        reporter: &mut dyn Reporter,
    ) -> RunnerResult<()> {
        let suites = select_suites(options, args)?;

        for (name, paths) in suites {
            self.run_suite(&name, &paths, options, discovery, reporter)?;
        }

        Ok(())
    }

    /// Run one suite: reset the registry, load definitions, schedule and
    /// execute.
    pub fn run_suite(
        &mut self,
        name: &str,
        paths: &[PathBuf],
        options: &Options,
        discovery: &dyn Discovery,
        reporter: &mut dyn Reporter,
    ) -> RunnerResult<()> {
        self.tests.clear();

        let definitions = discovery.discover(paths)?;
        for definition in &definitions {
            definition.register(self);
        }

        if self.tests.is_empty() {
            return Err(RunnerError::NoTestsFound);
        }

        let total = self.tests.len();
        self.summary.total += total;
        reporter.suite_started(&title_case(name), total);

        let mut preferred: Vec<usize> = (0..total).collect();
        if options.shuffle {
            preferred.shuffle(&mut rand::rng());
        }

        let order = schedule::execution_order(&self.tests, &preferred)?;

        for index in order {
            let outcome = match self.dependency_allows(index) {
                true => {
                    self.coverage.begin_recording();
                    let outcome = self.tests[index].execute();
                    self.coverage.end_recording();
                    outcome?
                }
                false => self.tests[index].mark_skipped(),
            };
            self.record(index, outcome, reporter);
        }

        Ok(())
    }

    /// A test may execute only once its dependency (if any) has passed.
    /// The scheduler guarantees the dependency is terminal by now.
    fn dependency_allows(&self, index: usize) -> bool {
        let Some(dependency) = self.tests[index].dependency() else {
            return true;
        };

        self.tests
            .iter()
            .find(|test| test.id() == dependency)
            .map(|test| test.state() == Some(&Outcome::Passed))
            .unwrap_or(false)
    }

    /// Move a finished test into its bucket and notify the reporter.
    fn record(&mut self, index: usize, outcome: Outcome, reporter: &mut dyn Reporter) {
        let test = &self.tests[index];
        for tag in test.covers() {
            self.coverage.claim(tag.clone());
        }

        let report = TestReport {
            id: test.id(),
            name: test.name().to_string(),
            index,
            assertions: test.assertions(),
            outcome,
        };

        reporter.test_finished(&report);

        let bucket = match report.outcome {
            Outcome::Passed => &mut self.summary.passed,
            Outcome::Failed(_) => &mut self.summary.failures,
            Outcome::Errored(_) => &mut self.summary.errors,
            Outcome::Skipped => &mut self.summary.skipped,
        };
        bucket.push(report);
    }
}

/// Resolve which suites run: positional paths build an ad-hoc suite,
/// `--suite` selects one configured suite, otherwise every configured suite
/// runs in name order.
fn select_suites(options: &Options, args: &[PathBuf]) -> RunnerResult<Vec<(String, Vec<PathBuf>)>> {
    if !args.is_empty() {
        return Ok(vec![("tests".to_string(), args.to_vec())]);
    }

    if let Some(name) = &options.suite {
        let paths = options
            .suites
            .get(name)
            .ok_or_else(|| RunnerError::SuiteNotFound(name.clone()))?;
        return Ok(vec![(name.clone(), paths.to_vec())]);
    }

    Ok(options
        .suites
        .iter()
        .map(|(name, paths)| (name.clone(), paths.to_vec()))
        .collect())
}

/// Capitalize each whitespace-separated word, for suite headers.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builder returned by test registration; every operation applies to each
/// registered test (one for plain tests, one per row for `test_each`).
pub struct TestBuilder<'r> {
    runner: &'r mut Runner,
    ids: Vec<TestId>,
}

impl TestBuilder<'_> {
    /// The identifier of the first registered test, usable as a dependency
    /// target. `None` when a data expansion was handed zero rows.
    pub fn id(&self) -> Option<TestId> {
        self.ids.first().copied()
    }

    /// All identifiers registered through this builder.
    pub fn ids(&self) -> &[TestId] {
        &self.ids
    }

    /// Supply the callback for a test registered via [`Runner::declare`].
    pub fn execute<F>(self, callback: F) -> Self
    where
        F: Fn(&TestCtx) -> TestResult<()> + 'static,
    {
        let callback: Callback = Rc::new(callback);
        self.apply(|test| test.set_callback(Rc::clone(&callback)))
    }

    /// Declare a dependency: the target must pass for this test to run.
    pub fn depends(self, on: TestId) -> Self {
        self.apply(|test| test.set_dependency(on))
    }

    /// Expect an error of the given kind to be raised.
    pub fn expect(self, kind: impl Into<String>) -> Self {
        let expectation = Expectation {
            kind: kind.into(),
            message: None,
        };
        self.apply(|test| test.set_expectation(expectation.clone()))
    }

    /// Expect an error of the given kind with an exact message.
    pub fn expect_message(self, kind: impl Into<String>, message: impl Into<String>) -> Self {
        let expectation = Expectation {
            kind: kind.into(),
            message: Some(message.into()),
        };
        self.apply(|test| test.set_expectation(expectation.clone()))
    }

    /// Claim coverage of a `"Type::method"` target (or a bare type name).
    pub fn covers(self, target: &str) -> Self {
        let tag = CoverTag::parse(target);
        self.apply(|test| test.add_cover(tag.clone()))
    }

    /// Claim coverage of a free function.
    pub fn covers_fn(self, name: &str) -> Self {
        let tag = CoverTag {
            target: name.to_string(),
            method: None,
        };
        self.apply(|test| test.add_cover(tag.clone()))
    }

    fn apply(self, mut op: impl FnMut(&mut Test)) -> Self {
        for id in &self.ids {
            if let Some(test) = self.runner.tests.iter_mut().find(|test| test.id() == *id) {
                op(test);
            }
        }
        self
    }
}
