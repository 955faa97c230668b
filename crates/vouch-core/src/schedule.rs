//! Two-phase dependency scheduling
//!
//! Before any test in a suite executes, the registry is validated and
//! ordered: a dependency on a test that is not part of the run is a
//! configuration error, as is a dependency cycle. The resulting order keeps
//! the preferred (registry or shuffled) sequence wherever dependencies
//! allow, pulling each dependency ahead of its dependents so a dependent's
//! execution always happens-after its dependency's terminal transition.

use crate::test::{Test, TestId};
use crate::{RunnerError, RunnerResult};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Compute the execution order for `tests`, visiting in `preferred` order
/// (indices into `tests`). Every dependency index appears before its
/// dependents in the returned order.
pub(crate) fn execution_order(tests: &[Test], preferred: &[usize]) -> RunnerResult<Vec<usize>> {
    let by_id: HashMap<TestId, usize> = tests
        .iter()
        .enumerate()
        .map(|(index, test)| (test.id(), index))
        .collect();

    // Validate dependencies up front so the error names the dependent test.
    for test in tests {
        if let Some(dependency) = test.dependency() {
            if !by_id.contains_key(&dependency) {
                return Err(RunnerError::UnknownDependency(test.name().to_string()));
            }
        }
    }

    let mut marks = vec![Mark::Unvisited; tests.len()];
    let mut order = Vec::with_capacity(tests.len());

    for &start in preferred {
        visit(start, tests, &by_id, &mut marks, &mut order)?;
    }

    Ok(order)
}

/// Walk the dependency chain rooted at `start` without recursing, so chain
/// length is bounded only by the registry, not the call stack. Each test has
/// at most one dependency, so the walk is a straight line ending at a test
/// with no dependency, an already-ordered test, or a cycle.
fn visit(
    index: usize,
    tests: &[Test],
    by_id: &HashMap<TestId, usize>,
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) -> RunnerResult<()> {
    let mut chain = Vec::new();
    let mut current = index;

    loop {
        match marks[current] {
            Mark::Done => break,
            Mark::Visiting => {
                return Err(RunnerError::DependencyCycle(
                    tests[current].name().to_string(),
                ))
            }
            Mark::Unvisited => {}
        }

        marks[current] = Mark::Visiting;
        chain.push(current);

        match tests[current].dependency() {
            // Presence validated by the caller.
            Some(dependency) => match by_id.get(&dependency) {
                Some(&dep_index) => current = dep_index,
                None => break,
            },
            None => break,
        }
    }

    // Deepest dependency first.
    for &link in chain.iter().rev() {
        marks[link] = Mark::Done;
        order.push(link);
    }
    Ok(())
}
