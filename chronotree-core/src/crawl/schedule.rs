//! Reveal Schedule
//!
//! The timetable of a simulated crawl, computed up front as plain data.
//!
//! # Timeline
//!
//! All offsets are measured from the moment the crawl starts (defaults):
//!
//! | offset               | phase     | progress | also                               |
//! |----------------------|-----------|----------|------------------------------------|
//! | 300ms                | root      | 5        |                                    |
//! | 800ms                | root      | 15       | root found, tree ready, reveal root |
//! | 1200ms               | branches  | 20       |                                    |
//! | 1500ms + i·180ms     | branches  | ≤ 70     | reveal i-th non-root node (BFS)    |
//! | T + 500ms            | crossrefs | 75       |                                    |
//! | T + 1300ms           | crossrefs | 90       |                                    |
//! | T + 2000ms           | done      | 100      | complete                           |
//!
//! where `T = 1500ms + N·180ms` for `N` non-root nodes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{Dataset, RevealedSet};

/// Stage of a crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlPhase {
    /// Locating the root node.
    Root,
    /// Exploring the hierarchy.
    Branches,
    /// Discovering cross-references.
    Crossrefs,
    /// Finished.
    Done,
}

impl CrawlPhase {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlPhase::Root => "root",
            CrawlPhase::Branches => "branches",
            CrawlPhase::Crossrefs => "crossrefs",
            CrawlPhase::Done => "done",
        }
    }

    /// Status line shown while in this phase.
    pub fn status_label(&self) -> &'static str {
        match self {
            CrawlPhase::Root => "Discovering root node...",
            CrawlPhase::Branches => "Exploring branches...",
            CrawlPhase::Crossrefs => "Discovering connections...",
            CrawlPhase::Done => "Tree complete!",
        }
    }
}

impl std::fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress reported when the root search begins.
const ROOT_START_PROGRESS: u8 = 5;
/// Progress reported when the root is found.
const ROOT_FOUND_PROGRESS: u8 = 15;
/// Progress at the start of branch exploration.
const BRANCHES_START_PROGRESS: u8 = 20;
/// Share of progress spread across node reveals.
const BRANCHES_SPAN: usize = 50;
/// Cap during branch exploration.
const BRANCHES_MAX_PROGRESS: u8 = 70;
const CROSSREFS_START_PROGRESS: u8 = 75;
const CROSSREFS_SETTLE_PROGRESS: u8 = 90;
const DONE_PROGRESS: u8 = 100;

/// Offsets of the simulated crawl, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleTiming {
    /// First progress report.
    pub root_search_ms: u64,
    /// Root found and tree delivered.
    pub root_found_ms: u64,
    /// Branch exploration announced.
    pub branches_ms: u64,
    /// First non-root reveal.
    pub first_reveal_ms: u64,
    /// Gap between consecutive reveals.
    pub reveal_interval_ms: u64,
    /// After the last reveal slot: cross-reference discovery starts.
    pub crossrefs_ms: u64,
    /// After the last reveal slot: cross-reference discovery settles.
    pub crossrefs_settle_ms: u64,
    /// After the last reveal slot: crawl completes.
    pub complete_ms: u64,
}

impl Default for ScheduleTiming {
    fn default() -> Self {
        Self {
            root_search_ms: 300,
            root_found_ms: 800,
            branches_ms: 1200,
            first_reveal_ms: 1500,
            reveal_interval_ms: 180,
            crossrefs_ms: 500,
            crossrefs_settle_ms: 1300,
            complete_ms: 2000,
        }
    }
}

impl ScheduleTiming {
    /// Offset of the first moment after all reveal slots for `reveals` nodes.
    pub fn reveal_end(&self, reveals: usize) -> Duration {
        Duration::from_millis(self.first_reveal_ms + reveals as u64 * self.reveal_interval_ms)
    }

    /// Total crawl length for a tree with `reveals` non-root nodes.
    pub fn total(&self, reveals: usize) -> Duration {
        self.reveal_end(reveals) + Duration::from_millis(self.complete_ms)
    }

    /// Check that offsets are in schedule order.
    pub fn is_ordered(&self) -> bool {
        self.root_search_ms <= self.root_found_ms
            && self.root_found_ms <= self.branches_ms
            && self.branches_ms <= self.first_reveal_ms
            && self.crossrefs_ms <= self.crossrefs_settle_ms
            && self.crossrefs_settle_ms <= self.complete_ms
    }
}

/// One thing that happens at a scheduled moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleAction {
    /// Report phase and progress.
    Phase(CrawlPhase, u8),
    /// Announce the root node.
    RootFound,
    /// Deliver the whole dataset.
    TreeReady,
    /// Reveal one node.
    Reveal(String),
    /// Announce completion.
    Complete,
}

/// Actions due at one offset, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStep {
    pub at: Duration,
    pub actions: Vec<ScheduleAction>,
}

/// Progress for the `index`-th of `total` reveals during branch exploration.
///
/// Integer arithmetic, so the value is exactly `20 + ⌊index·50/total⌋`,
/// capped at 70.
pub fn branch_progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return BRANCHES_START_PROGRESS;
    }
    let progress = usize::from(BRANCHES_START_PROGRESS) + index * BRANCHES_SPAN / total;
    progress.min(usize::from(BRANCHES_MAX_PROGRESS)) as u8
}

/// Build the full timetable for a dataset.
///
/// Steps are sorted by offset. Reveal order is breadth-first, so the layout
/// of the tree has no influence on when a node appears.
pub fn build_schedule(dataset: &Dataset, timing: &ScheduleTiming) -> Vec<ScheduledStep> {
    let order = dataset.breadth_first_ids();
    let (root, rest) = match order.split_first() {
        Some((root, rest)) => (root.clone(), rest),
        None => return Vec::new(),
    };
    let total = rest.len();
    let ms = Duration::from_millis;

    let mut steps = Vec::with_capacity(total + 6);
    steps.push(ScheduledStep {
        at: ms(timing.root_search_ms),
        actions: vec![ScheduleAction::Phase(CrawlPhase::Root, ROOT_START_PROGRESS)],
    });
    steps.push(ScheduledStep {
        at: ms(timing.root_found_ms),
        actions: vec![
            ScheduleAction::Phase(CrawlPhase::Root, ROOT_FOUND_PROGRESS),
            ScheduleAction::RootFound,
            ScheduleAction::TreeReady,
            ScheduleAction::Reveal(root),
        ],
    });
    steps.push(ScheduledStep {
        at: ms(timing.branches_ms),
        actions: vec![ScheduleAction::Phase(CrawlPhase::Branches, BRANCHES_START_PROGRESS)],
    });

    for (index, id) in rest.iter().enumerate() {
        steps.push(ScheduledStep {
            at: ms(timing.first_reveal_ms + index as u64 * timing.reveal_interval_ms),
            actions: vec![
                ScheduleAction::Phase(CrawlPhase::Branches, branch_progress(index, total)),
                ScheduleAction::Reveal(id.clone()),
            ],
        });
    }

    let end = timing.reveal_end(total);
    steps.push(ScheduledStep {
        at: end + ms(timing.crossrefs_ms),
        actions: vec![ScheduleAction::Phase(CrawlPhase::Crossrefs, CROSSREFS_START_PROGRESS)],
    });
    steps.push(ScheduledStep {
        at: end + ms(timing.crossrefs_settle_ms),
        actions: vec![ScheduleAction::Phase(CrawlPhase::Crossrefs, CROSSREFS_SETTLE_PROGRESS)],
    });
    steps.push(ScheduledStep {
        at: end + ms(timing.complete_ms),
        actions: vec![
            ScheduleAction::Phase(CrawlPhase::Done, DONE_PROGRESS),
            ScheduleAction::Complete,
        ],
    });

    // Stable, so custom timings that overlap keep dispatch order within ties.
    steps.sort_by_key(|step| step.at);
    steps
}

/// Ids a crawl following `steps` has revealed once `elapsed` has passed.
pub fn revealed_at(steps: &[ScheduledStep], elapsed: Duration) -> RevealedSet {
    steps
        .iter()
        .take_while(|step| step.at <= elapsed)
        .flat_map(|step| &step.actions)
        .filter_map(|action| match action {
            ScheduleAction::Reveal(id) => Some(id.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::generic_dataset;

    fn progress_values(steps: &[ScheduledStep]) -> Vec<u8> {
        steps
            .iter()
            .flat_map(|s| &s.actions)
            .filter_map(|a| match a {
                ScheduleAction::Phase(_, p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn generic_tree_timetable() {
        let steps = build_schedule(&generic_dataset("Tea"), &ScheduleTiming::default());
        let offsets: Vec<u64> = steps.iter().map(|s| s.at.as_millis() as u64).collect();
        // 9 non-root nodes: T = 1500 + 9 * 180 = 3120
        assert_eq!(
            offsets,
            vec![300, 800, 1200, 1500, 1680, 1860, 2040, 2220, 2400, 2580, 2760, 2940, 3620, 4420, 5120]
        );
        assert_eq!(
            steps[1].actions,
            vec![
                ScheduleAction::Phase(CrawlPhase::Root, 15),
                ScheduleAction::RootFound,
                ScheduleAction::TreeReady,
                ScheduleAction::Reveal("root".to_string()),
            ]
        );
        assert_eq!(steps.last().map(|s| s.actions.last()), Some(Some(&ScheduleAction::Complete)));
    }

    #[test]
    fn reveals_follow_breadth_first_order() {
        let dataset = generic_dataset("Tea");
        let steps = build_schedule(&dataset, &ScheduleTiming::default());
        let revealed: Vec<String> = steps
            .iter()
            .flat_map(|s| &s.actions)
            .filter_map(|a| match a {
                ScheduleAction::Reveal(id) => Some(id.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(revealed, dataset.breadth_first_ids());
    }

    #[test]
    fn progress_is_monotonic_and_capped() {
        let steps = build_schedule(&generic_dataset("Tea"), &ScheduleTiming::default());
        let progress = progress_values(&steps);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress
            .iter()
            .zip(steps.iter().flat_map(|s| &s.actions).filter(|a| matches!(a, ScheduleAction::Phase(..))))
            .all(|(p, a)| !matches!(a, ScheduleAction::Phase(CrawlPhase::Branches, _)) || *p <= 70));
    }

    #[test]
    fn branch_progress_formula() {
        assert_eq!(branch_progress(0, 9), 20);
        assert_eq!(branch_progress(1, 9), 25);
        assert_eq!(branch_progress(8, 9), 64);
        assert_eq!(branch_progress(3, 10), 35);
        assert_eq!(branch_progress(0, 0), 20);
    }

    #[test]
    fn root_only_tree_still_completes() {
        let dataset = Dataset::new(
            crate::model::TreeNode::new("solo", "Solo", crate::model::NodeType::Discipline),
            Vec::new(),
        );
        let steps = build_schedule(&dataset, &ScheduleTiming::default());
        let offsets: Vec<u64> = steps.iter().map(|s| s.at.as_millis() as u64).collect();
        assert_eq!(offsets, vec![300, 800, 1200, 2000, 2800, 3500]);
    }

    #[test]
    fn revealed_at_replays_schedule() {
        let steps = build_schedule(&generic_dataset("Tea"), &ScheduleTiming::default());
        assert!(revealed_at(&steps, Duration::from_millis(799)).is_empty());
        assert_eq!(revealed_at(&steps, Duration::from_millis(800)).len(), 1);
        let partial = revealed_at(&steps, Duration::from_millis(1700));
        assert_eq!(partial.iter().collect::<Vec<_>>(), vec!["root", "origins", "golden-age"]);
        assert_eq!(revealed_at(&steps, Duration::MAX).len(), 10);
    }

    #[test]
    fn default_timing_is_ordered() {
        let timing = ScheduleTiming::default();
        assert!(timing.is_ordered());
        assert_eq!(timing.total(9), Duration::from_millis(5120));
    }
}
