//! Stage results and how sequential stages compose.

use crate::reporter::ProcessingReporter;
use crate::violation::Violation;
use camino::Utf8PathBuf;
use complyguard_domain_core::Artifact;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Fail-causing violations keyed by the stage that found them.
pub type FailCauses = BTreeMap<String, Vec<Violation>>;

/// A side output produced by a stage (for example a rendered document).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachable {
    pub kind: String,
    pub location: Utf8PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageResult {
    pub artifacts: Vec<Artifact>,
    pub attachables: BTreeMap<String, Attachable>,
    pub comments: Vec<String>,
    pub violations: Vec<Violation>,
    /// `None` means nothing failed; `Some` is never empty.
    pub fail_causing: Option<FailCauses>,
    /// Union this result's artifacts into the earlier set instead of
    /// replacing it.
    pub append: bool,
}

impl StageResult {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self {
            artifacts,
            ..Self::default()
        }
    }

    pub fn appending(artifacts: Vec<Artifact>) -> Self {
        Self {
            artifacts,
            append: true,
            ..Self::default()
        }
    }

    pub fn is_failed(&self) -> bool {
        self.fail_causing.is_some()
    }

    /// Compose with a later stage that produced a new artifact set.
    ///
    /// Later artifacts replace these unless `later.append`; comments of the
    /// later result go last.
    pub fn merge(self, later: StageResult) -> StageResult {
        let artifacts = if later.append {
            union(self.artifacts, later.artifacts)
        } else {
            later.artifacts
        };
        let mut comments = self.comments;
        comments.extend(later.comments);
        StageResult {
            artifacts,
            attachables: merge_attachables(self.attachables, later.attachables),
            comments,
            violations: concat(self.violations, later.violations),
            fail_causing: merge_fail_causes(self.fail_causing, later.fail_causing),
            append: false,
        }
    }

    /// Compose with a later stage that only adds side information.
    ///
    /// These artifacts are kept; comments of the later result go first.
    pub fn merge_keep_artifacts(self, later: StageResult) -> StageResult {
        let mut comments = later.comments;
        comments.extend(self.comments);
        StageResult {
            artifacts: self.artifacts,
            attachables: merge_attachables(self.attachables, later.attachables),
            comments,
            violations: concat(self.violations, later.violations),
            fail_causing: merge_fail_causes(self.fail_causing, later.fail_causing),
            append: false,
        }
    }
}

fn union(mut earlier: Vec<Artifact>, later: Vec<Artifact>) -> Vec<Artifact> {
    for artifact in later {
        if !earlier.contains(&artifact) {
            earlier.push(artifact);
        }
    }
    earlier
}

fn concat(mut earlier: Vec<Violation>, later: Vec<Violation>) -> Vec<Violation> {
    earlier.extend(later);
    earlier
}

fn merge_attachables(
    mut earlier: BTreeMap<String, Attachable>,
    later: BTreeMap<String, Attachable>,
) -> BTreeMap<String, Attachable> {
    for (key, value) in later {
        if let Some(previous) = earlier.insert(key.clone(), value) {
            warn!(%key, previous = %previous.location, "attachable replaced by a later stage");
        }
    }
    earlier
}

fn merge_fail_causes(earlier: Option<FailCauses>, later: Option<FailCauses>) -> Option<FailCauses> {
    match (earlier, later) {
        (None, None) => None,
        (Some(causes), None) | (None, Some(causes)) => Some(causes),
        (Some(mut earlier), Some(later)) => {
            for (stage, violations) in later {
                earlier.entry(stage).or_default().extend(violations);
            }
            Some(earlier)
        }
    }
}

/// One pipeline step.
///
/// Stages may mutate the working artifacts in place; the returned result is
/// then merged into the running result.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    /// Merge with [`StageResult::merge_keep_artifacts`] instead of
    /// [`StageResult::merge`].
    fn keeps_artifacts(&self) -> bool {
        false
    }

    fn process(&self, artifacts: &mut Vec<Artifact>, reporter: &dyn ProcessingReporter) -> StageResult;
}

/// Run `processors` in order over `artifacts`, merging every stage result.
pub fn run_stages(
    processors: &[Box<dyn Processor>],
    artifacts: Vec<Artifact>,
    reporter: &dyn ProcessingReporter,
) -> StageResult {
    let mut merged = StageResult::new(artifacts);
    for processor in processors {
        info!(stage = processor.name(), artifacts = merged.artifacts.len(), "stage started");
        let result = processor.process(&mut merged.artifacts, reporter);
        merged = if processor.keeps_artifacts() {
            merged.merge_keep_artifacts(result)
        } else {
            merged.merge(result)
        };
        info!(
            stage = processor.name(),
            artifacts = merged.artifacts.len(),
            failed = merged.is_failed(),
            "stage finished"
        );
    }
    merged
}
