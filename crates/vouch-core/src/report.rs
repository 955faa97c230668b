//! Reporting collaborator seam
//!
//! The engine pushes events to a [`Reporter`]; rendering lives outside the
//! core. Display coordinates for indicator grids derive from
//! [`TestReport::index`], the test's position in its suite registry.

use crate::runner::RunSummary;
use crate::test::{Outcome, TestId};

/// The record of a finished test handed to reporters and kept in the
/// runner's outcome buckets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub id: TestId,
    pub name: String,
    /// Position in the suite registry, the basis for display coordinates.
    pub index: usize,
    /// Assertions recorded during execution.
    pub assertions: u32,
    pub outcome: Outcome,
}

/// Consumes runner events and renders them. All methods default to no-ops
/// so reporters implement only what they render.
pub trait Reporter {
    /// A suite is about to run `total` tests.
    fn suite_started(&mut self, _name: &str, _total: usize) {}

    /// A test reached its terminal state.
    fn test_finished(&mut self, _report: &TestReport) {}

    /// The whole run finished.
    fn results(&mut self, _summary: &RunSummary) {}
}

/// A reporter that renders nothing. Library default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {}
