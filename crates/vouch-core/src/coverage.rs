//! Coverage line accounting
//!
//! The engine does not instrument anything itself: an external profiler
//! collaborator feeds raw line-status data through
//! [`Coverage::record_execution`], and resolves the `(target, method)` tags
//! tests claim to exercise into source regions. [`Coverage::report`] joins
//! the two — only executable (non-dead) lines count toward totals, and only
//! executed lines inside claimed regions count as covered.

use crate::test::CoverTag;
use glob::Pattern;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Raw line status as reported by a profiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Used,
    NotUsed,
    Dead,
}

impl LineStatus {
    /// Decode the conventional profiler encoding: 1 used, -1 not used,
    /// -2 dead.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(LineStatus::Used),
            -1 => Some(LineStatus::NotUsed),
            -2 => Some(LineStatus::Dead),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            LineStatus::Used => 1,
            LineStatus::NotUsed => -1,
            LineStatus::Dead => -2,
        }
    }
}

/// A contiguous span of source lines belonging to one function or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRegion {
    pub file: PathBuf,
    pub start: usize,
    pub end: usize,
}

/// The external profiler collaborator: resolves coverage tags to source
/// regions and attributes files to class names.
pub trait Profiler {
    /// The source region implementing `tag`, if the profiler knows it.
    fn region_of(&self, tag: &CoverTag) -> Option<SourceRegion>;

    /// The class implemented in `file`, when there is one; files without a
    /// class are reported under their path instead.
    fn class_of(&self, _file: &Path) -> Option<String> {
        None
    }
}

/// Covered/total line counts for one class or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counts {
    pub covered: usize,
    pub total: usize,
}

impl Counts {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.covered as f64 / self.total as f64) * 100.0
    }
}

/// The final coverage report, keyed by class name and by file path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageSummary {
    pub classes: BTreeMap<String, Counts>,
    pub files: BTreeMap<String, Counts>,
}

impl CoverageSummary {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.files.is_empty()
    }
}

/// Accumulates claimed coverage targets and recorded execution data across
/// the whole run (the per-suite registry resets do not touch it).
#[derive(Default)]
pub struct Coverage {
    enabled: bool,
    recording: bool,
    tags: Vec<CoverTag>,
    executed: HashMap<PathBuf, BTreeMap<usize, LineStatus>>,
}

impl Coverage {
    pub fn new(enabled: bool) -> Self {
        Coverage {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn begin_recording(&mut self) {
        if self.enabled {
            self.recording = true;
        }
    }

    pub fn end_recording(&mut self) {
        self.recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Register a coverage claim from a test's `covers` tag.
    pub fn claim(&mut self, tag: CoverTag) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// Merge raw execution data for one file. A line once seen as used stays
    /// used; ignored while not recording.
    pub fn record_execution(&mut self, file: impl Into<PathBuf>, lines: BTreeMap<usize, LineStatus>) {
        if !self.recording {
            return;
        }

        let entry = self.executed.entry(file.into()).or_default();
        for (line, status) in lines {
            entry
                .entry(line)
                .and_modify(|existing| {
                    if status == LineStatus::Used {
                        *existing = LineStatus::Used;
                    }
                })
                .or_insert(status);
        }
    }

    /// Build the summary: resolve claimed tags through the profiler, filter
    /// files by the include/exclude glob lists, and count lines.
    pub fn report(
        &self,
        profiler: &dyn Profiler,
        include: &[String],
        exclude: &[String],
    ) -> CoverageSummary {
        let claimed = self.claimed_lines(profiler);
        let mut summary = CoverageSummary::default();

        for (file, lines) in &self.executed {
            if !matches_any(file, include) || matches_any(file, exclude) {
                continue;
            }

            let Some(claimed_lines) = claimed.get(file) else {
                continue;
            };

            let total = lines
                .values()
                .filter(|status| **status != LineStatus::Dead)
                .count();
            let covered = lines
                .iter()
                .filter(|(line, status)| {
                    **status == LineStatus::Used && claimed_lines.contains(*line)
                })
                .count();

            let counts = Counts { covered, total };
            match profiler.class_of(file) {
                Some(class) => {
                    summary.classes.insert(class, counts);
                }
                None => {
                    summary.files.insert(file.display().to_string(), counts);
                }
            }
        }

        summary
    }

    fn claimed_lines(&self, profiler: &dyn Profiler) -> HashMap<PathBuf, BTreeSet<usize>> {
        let mut claimed: HashMap<PathBuf, BTreeSet<usize>> = HashMap::new();

        for tag in &self.tags {
            if let Some(region) = profiler.region_of(tag) {
                claimed
                    .entry(region.file)
                    .or_default()
                    .extend(region.start..=region.end);
            }
        }

        claimed
    }
}

fn matches_any(file: &Path, patterns: &[String]) -> bool {
    patterns
        .iter()
        .filter_map(|pattern| Pattern::new(pattern).ok())
        .any(|pattern| pattern.matches_path(file))
}
