use indicatif::ProgressBar;

use crate::{
    management::ResultLog,
    matching::{KeepRule, TrackDescriptor, duplicate_groups, tier_label},
    tidal::{Result, TrackCatalog},
    warning,
};

use super::{ItemReport, Outcome, RunOptions, RunReport, pause};

/// One song present more than once.
#[derive(Debug, Clone)]
pub struct PlannedGroup {
    pub keep: TrackDescriptor,
    /// In library order.
    pub remove: Vec<TrackDescriptor>,
}

#[derive(Debug, Clone, Default)]
pub struct DedupPlan {
    /// In library order of each group's first member.
    pub groups: Vec<PlannedGroup>,
}

impl DedupPlan {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn removal_count(&self) -> usize {
        self.groups.iter().map(|g| g.remove.len()).sum()
    }
}

/// Decides which favorites to remove. Pure.
pub fn plan(tracks: &[TrackDescriptor], rule: KeepRule) -> DedupPlan {
    let groups = duplicate_groups(tracks, rule)
        .into_iter()
        .map(|group| PlannedGroup {
            keep: tracks[group.keep].clone(),
            remove: group.remove.iter().map(|&i| tracks[i].clone()).collect(),
        })
        .collect();

    DedupPlan { groups }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: usize,
    /// Favorites read at the start of the round.
    pub tracks: usize,
    pub groups: usize,
    pub removed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DedupReport {
    pub rounds: Vec<RoundSummary>,
    pub report: RunReport,
}

/// Removes duplicates in rounds until a round removes nothing.
///
/// The first round works on `initial`; later rounds wait `pacing.round` and read
/// My Tracks again, since the service can surface entries the previous listing
/// missed. At most `max_rounds` rounds run, and a dry run stops after one.
pub async fn run_rounds<C>(
    catalog: &C,
    initial: Vec<TrackDescriptor>,
    log: &ResultLog,
    options: &RunOptions,
    pb: &ProgressBar,
) -> Result<DedupReport>
where
    C: TrackCatalog + ?Sized,
{
    let mut result = DedupReport::default();
    let mut tracks = initial;
    let max_rounds = options.max_rounds.max(1);

    for round in 1..=max_rounds {
        if round > 1 {
            pb.set_message(format!("Round {}: reading My Tracks again...", round));
            pause(options.pacing.round).await;
            tracks = match catalog.favorite_tracks().await {
                Ok(snapshot) => snapshot.tracks,
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warning!("Stopping after round {}: {}", round - 1, e);
                    break;
                }
            };
        }

        let planned = plan(&tracks, options.keep_rule);
        let round_report = remove_duplicates(catalog, &planned, round, log, options, pb).await?;

        let summary = RoundSummary {
            round,
            tracks: tracks.len(),
            groups: planned.groups.len(),
            removed: round_report.removed(),
            failed: round_report.failed(),
        };
        log::debug!("{:?}", summary);
        result.rounds.push(summary);
        result.report.extend(round_report);

        if summary.removed == 0 || options.dry_run {
            break;
        }
    }

    Ok(result)
}

async fn remove_duplicates<C>(
    catalog: &C,
    planned: &DedupPlan,
    round: usize,
    log: &ResultLog,
    options: &RunOptions,
    pb: &ProgressBar,
) -> Result<RunReport>
where
    C: TrackCatalog + ?Sized,
{
    let mut report = RunReport::default();
    pb.set_position(0);
    pb.set_length(planned.removal_count() as u64);

    for group in &planned.groups {
        let kept = format!(
            "kept {} [{}] id={}",
            group.keep.label(),
            tier_label(group.keep.quality()),
            group.keep.source_id()
        );

        for duplicate in &group.remove {
            pb.set_message(format!("Round {}: {}", round, duplicate.label()));
            let detail = format!("[{}] {}", tier_label(duplicate.quality()), kept);

            let outcome = if options.dry_run {
                Outcome::Removed
            } else {
                let removed = catalog.remove_favorite(duplicate.source_id()).await;
                pause(options.pacing.remove).await;
                match removed {
                    Ok(()) => Outcome::Removed,
                    Err(e) if e.is_auth() => return Err(e),
                    Err(e) => Outcome::Failed(format!("remove failed: {}", e)),
                }
            };

            let item = ItemReport::new(duplicate.label(), duplicate.source_id(), outcome).with_detail(detail);
            report.record(log, item, options.dry_run).await;
            pb.inc(1);
        }
    }

    Ok(report)
}
