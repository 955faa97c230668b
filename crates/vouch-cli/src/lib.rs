//! Vouch command-line harness
//!
//! Test binaries hand their compiled-in [`SourceSet`] to [`harness`] (or
//! [`run`] for explicit control) and get the full command-line surface:
//! option loading from `.vouch.yml`, flag parsing, suite selection, the
//! terminal reporter and the process exit code.
//!
//! EXAMPLES:
//!     my-tests                     Run all configured suites
//!     my-tests -s unit             Run the "unit" suite
//!     my-tests -r tests/fast       Run one directory in random order
//!     my-tests -c                  Collect and display coverage
//!
//! ENVIRONMENT VARIABLES:
//!     NO_COLOR          Set to disable colored output
//!
//! # Example
//!
//! ```no_run
//! use vouch_cli::{harness, SourceSet};
//! use vouch_core::Runner;
//!
//! fn smoke(runner: &mut Runner) {
//!     runner.test("it adds", |t| {
//!         t.is(2 + 2).equal(4)?;
//!         Ok(())
//!     });
//! }
//!
//! fn main() {
//!     let sources = SourceSet::new().add("tests/smoke.rs", smoke);
//!     harness(&sources, None);
//! }
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use vouch_config::Options;
use vouch_core::{Coverage, Profiler, Reporter, Runner};

pub mod discovery;
pub mod reporter;

pub use discovery::SourceSet;
pub use reporter::TerminalReporter;

/// Vouch test runner.
#[derive(Parser, Debug)]
#[command(name = "vouch")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Show version information and exit
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Show coverage data
    #[arg(short, long)]
    coverage: bool,

    /// Run a predefined test suite
    #[arg(short, long)]
    suite: Option<String>,

    /// Run tests within each suite in random order
    #[arg(short, long)]
    random: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,

    /// Files or directories to run instead of the configured suites
    paths: Vec<PathBuf>,
}

/// Run the harness with explicit arguments. Returns the process exit code:
/// zero only when every loaded test passed.
pub fn run<I, T>(args: I, sources: &SourceSet, profiler: Option<&dyn Profiler>) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    if cli.version {
        println!("vouch {}", env!("CARGO_PKG_VERSION"));
        return Ok(0);
    }

    let mut options = Options::load(Path::new(".")).context("failed to load .vouch.yml")?;
    options.apply_cli(cli.random, cli.suite.clone(), cli.coverage);

    let mut reporter = TerminalReporter::new().with_no_color(cli.no_color);
    let mut runner = Runner::new().with_coverage(Coverage::new(options.coverage.enable));

    runner.run(&options, &cli.paths, sources, &mut reporter)?;
    reporter.results(runner.summary());

    if options.coverage.enable {
        if let Some(profiler) = profiler {
            let summary = runner.coverage().report(
                profiler,
                &options.coverage.include,
                &options.coverage.exclude,
            );
            reporter.print_coverage(&summary);
        }
    }

    Ok(if runner.summary().all_passed() { 0 } else { 1 })
}

/// Run the harness from the process environment and exit.
pub fn harness(sources: &SourceSet, profiler: Option<&dyn Profiler>) -> ! {
    match run(std::env::args(), sources, profiler) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
}
