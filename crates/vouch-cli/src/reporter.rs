//! Terminal reporter - display test results
//!
//! Streams one colored indicator per finished test, then renders the
//! results box, failure and error details, and (when enabled) the coverage
//! tables. Colors map outcomes: green passed, red failed, yellow errored,
//! magenta skipped.

use colored::*;
use std::io::{self, Write};
use vouch_core::{CoverageSummary, Outcome, Reporter, RunSummary, TestReport};

/// The indicator used to represent a test in the output.
const INDICATOR: &str = "◼";

/// Indicators printed per row before wrapping.
const ROW_WIDTH: usize = 50;

/// Terminal reporter with output configuration
pub struct TerminalReporter {
    /// Disable colored output
    no_color: bool,
    /// Indicators printed on the current row
    column: usize,
    failures: Vec<TestReport>,
    errors: Vec<TestReport>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            no_color: false,
            column: 0,
            failures: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Disable colored output
    pub fn with_no_color(mut self, no_color: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        self.no_color = no_color;
        self
    }

    fn indicator(outcome: &Outcome) -> ColoredString {
        match outcome {
            Outcome::Passed => INDICATOR.green(),
            Outcome::Failed(_) => INDICATOR.red(),
            Outcome::Errored(_) => INDICATOR.yellow(),
            Outcome::Skipped => INDICATOR.magenta(),
        }
    }

    fn print_results_box(&self, summary: &RunSummary) {
        let rows = [
            (INDICATOR.green(), "Passes", summary.passed.len()),
            (INDICATOR.red(), "Failures", summary.failures.len()),
            (INDICATOR.yellow(), "Errors", summary.errors.len()),
            (INDICATOR.magenta(), "Skipped", summary.skipped.len()),
        ];

        let texts: Vec<(ColoredString, String)> = rows
            .into_iter()
            .map(|(dot, label, count)| (dot, format!("{:<9} {}", label, count)))
            .collect();
        let text_width = texts.iter().map(|(_, text)| text.len()).max().unwrap_or(0);
        // left pad + indicator + space + text + right pad
        let inner = text_width + 4;

        let title = " Results ";
        println!(
            "  {}{}{}",
            "┌".yellow(),
            title,
            format!("{}┐", "─".repeat(inner - title.len())).yellow()
        );
        for (dot, text) in texts {
            println!(
                "  {} {} {:<text_width$} {}",
                "│".yellow(),
                dot,
                text,
                "│".yellow()
            );
        }
        println!("  {}{}{}", "└".yellow(), "─".repeat(inner).yellow(), "┘".yellow());
    }

    fn print_details(&self) {
        for report in &self.failures {
            println!();
            println!("  {}", format!("FAILED - {}", report.name).red());
            if let Some(message) = report.outcome.message() {
                println!("  {}", message);
            }
        }

        for report in &self.errors {
            println!();
            println!("  {}", format!("ERROR - {}", report.name).yellow());
            if let Some(message) = report.outcome.message() {
                println!("  {}", message);
            }
        }
    }

    /// Render the coverage tables, colored by percentage bands: under 25%
    /// red, under 75% yellow, otherwise green.
    pub fn print_coverage(&self, summary: &CoverageSummary) {
        println!();
        println!("  {}", "Calculating Coverage...".dimmed());
        println!();

        let name_width = summary
            .classes
            .keys()
            .chain(summary.files.keys())
            .map(|name| name.len())
            .max()
            .unwrap_or(0);

        for (name, counts) in summary.classes.iter().chain(summary.files.iter()) {
            let percent = counts.percent();
            let cell = format!("{:>6.2}%  ({}/{})", percent, counts.covered, counts.total);
            let cell = if percent < 25.0 {
                cell.red()
            } else if percent < 75.0 {
                cell.yellow()
            } else {
                cell.green()
            };
            println!("  {:<name_width$}  {}", name, cell);
        }
    }
}

impl Reporter for TerminalReporter {
    fn suite_started(&mut self, name: &str, total: usize) {
        if self.column > 0 {
            println!();
            self.column = 0;
        }
        println!();
        println!("  {} ({} tests)", name.yellow().bold(), total);
        print!("  ");
    }

    fn test_finished(&mut self, report: &TestReport) {
        print!("{} ", Self::indicator(&report.outcome));
        let _ = io::stdout().flush();

        self.column += 1;
        if self.column == ROW_WIDTH {
            print!("\n  ");
            self.column = 0;
        }

        match &report.outcome {
            Outcome::Failed(_) => self.failures.push(report.clone()),
            Outcome::Errored(_) => self.errors.push(report.clone()),
            _ => {}
        }
    }

    fn results(&mut self, summary: &RunSummary) {
        if self.no_color {
            colored::control::set_override(false);
        }

        println!();
        println!();
        self.print_results_box(summary);
        self.print_details();

        let passed = summary.passed.len();
        let count = format!("{} / {}", passed, summary.total);
        let count = if summary.all_passed() {
            count.green()
        } else {
            count.red()
        };
        println!();
        println!("  {} tests passed successfully.", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vouch_core::TestId;

    fn report(name: &str, index: usize, outcome: Outcome) -> TestReport {
        TestReport {
            id: TestId::default(),
            name: name.to_string(),
            index,
            assertions: 1,
            outcome,
        }
    }

    fn finished_summary() -> RunSummary {
        RunSummary {
            total: 3,
            passed: vec![report("ok", 0, Outcome::Passed)],
            failures: vec![report("bad", 1, Outcome::Failed("5 is not equal to 6".into()))],
            errors: vec![report("boom", 2, Outcome::Errored("SomeError: boom".into()))],
            skipped: vec![],
        }
    }

    #[test]
    fn reporter_renders_without_panicking() {
        let mut reporter = TerminalReporter::new().with_no_color(true);
        reporter.suite_started("Tests", 3);
        reporter.test_finished(&report("ok", 0, Outcome::Passed));
        reporter.test_finished(&report("bad", 1, Outcome::Failed("5 is not equal to 6".into())));
        reporter.test_finished(&report("boom", 2, Outcome::Errored("SomeError: boom".into())));
        reporter.results(&finished_summary());
    }

    #[test]
    fn failures_and_errors_are_collected_for_details() {
        let mut reporter = TerminalReporter::new().with_no_color(true);
        reporter.test_finished(&report("bad", 0, Outcome::Failed("nope".into())));
        reporter.test_finished(&report("boom", 1, Outcome::Errored("kind: msg".into())));
        reporter.test_finished(&report("ok", 2, Outcome::Passed));
        assert_eq!(reporter.failures.len(), 1);
        assert_eq!(reporter.errors.len(), 1);
    }

    #[test]
    fn coverage_table_renders_empty_summary() {
        let reporter = TerminalReporter::new().with_no_color(true);
        reporter.print_coverage(&CoverageSummary::default());
    }
}
