//! Vouch test execution engine
//!
//! The core of the framework: the test state machine, the fluent assertion
//! layer, the runner with its dependency scheduler, and the coverage
//! accounting consumed by the reporting layer.
//!
//! A test moves from pending to exactly one of four terminal outcomes
//! (passed, failed, errored, skipped). Outcomes are values, not unwound
//! panics: test callbacks return `TestResult<()>`, and the engine interprets
//! the result together with the test's declared expectation and its recorded
//! assertion count.
//!
//! # Example
//!
//! ```
//! use vouch_core::Runner;
//!
//! let mut runner = Runner::new();
//! runner.test("addition holds", |t| {
//!     t.is(2 + 2).equal(4)?;
//!     Ok(())
//! });
//! ```

pub mod assertion;
pub mod coverage;
pub mod report;
pub mod runner;
pub mod schedule;
pub mod subject;

use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors. Per-test failures never surface here; a test
/// always lands in one of the four outcome buckets. These abort the run
/// before (or instead of) executing tests.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("no callback was provided for test '{0}'")]
    MissingCallback(String),

    #[error("no tests could be found")]
    NoTestsFound,

    #[error("the suite '{0}' is not defined")]
    SuiteNotFound(String),

    #[error("test '{0}' depends on a test that is not part of this run")]
    UnknownDependency(String),

    #[error("dependency cycle detected involving test '{0}'")]
    DependencyCycle(String),

    #[error("failed to discover tests in {path}: {message}")]
    Discovery { path: PathBuf, message: String },
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

// Re-export main types
pub use assertion::Assertion;
pub use coverage::{Counts, Coverage, CoverageSummary, LineStatus, Profiler, SourceRegion};
pub use report::{NullReporter, Reporter, TestReport};
pub use runner::{DefineFn, Definition, Discovery, RunSummary, Runner, TestBuilder};
pub use subject::{Subject, SubjectKind};
pub use test::{CoverTag, Expectation, Outcome, TestCtx, TestError, TestId, TestResult};
