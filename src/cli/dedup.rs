use tabled::Table;

use crate::{
    cli::{RunFlags, common},
    drivers::{
        self, Pacing, RunOptions,
        dedup::{DedupPlan, plan},
    },
    error, info,
    matching::{KeepRule, TrackDescriptor, tier_label},
    success,
    types::DuplicateTableRow,
    utils,
};

/// Groups shown before asking for confirmation.
const PREVIEW_GROUPS: usize = 10;

fn row(action: &str, track: &TrackDescriptor) -> DuplicateTableRow {
    DuplicateTableRow {
        action: action.to_string(),
        track: utils::truncate(&track.label(), 60),
        quality: tier_label(track.quality()).to_string(),
        album: utils::truncate(track.album().unwrap_or("-"), 40),
    }
}

fn preview(planned: &DedupPlan) {
    let rows: Vec<DuplicateTableRow> = planned
        .groups
        .iter()
        .take(PREVIEW_GROUPS)
        .flat_map(|group| {
            std::iter::once(row("KEEP", &group.keep))
                .chain(group.remove.iter().map(|t| row("REMOVE", t)))
        })
        .collect();

    println!("{}", Table::new(rows));
    if planned.groups.len() > PREVIEW_GROUPS {
        info!(
            "... and {} more groups",
            planned.groups.len() - PREVIEW_GROUPS
        );
    }
}

pub async fn dedup(flags: RunFlags, max_rounds: usize, prefer_versions: bool) {
    let keep_rule = if prefer_versions {
        KeepRule::QualityThenVersion
    } else {
        KeepRule::QualityThenPosition
    };

    let client = common::connect().await;
    let snapshot = common::load_favorites(&client).await;

    let planned = plan(&snapshot.tracks, keep_rule);
    if planned.is_empty() {
        success!("No duplicates found");
        return;
    }

    preview(&planned);
    info!(
        "{} songs are duplicated, {} tracks would be removed",
        planned.groups.len(),
        planned.removal_count()
    );

    if !common::confirmed(
        &format!("Remove {} duplicate tracks?", planned.removal_count()),
        flags.yes,
        flags.dry_run,
    ) {
        info!("Cancelled");
        return;
    }

    let log = common::open_log(
        "dedup",
        flags.log_file,
        &format!("dedup{}", common::dry_run_marker(flags.dry_run)),
    )
    .await;

    let options = RunOptions {
        dry_run: flags.dry_run,
        pacing: Pacing::from_config(),
        keep_rule,
        max_rounds,
    };

    let pb = utils::progress_bar(planned.removal_count());
    let result = drivers::dedup::run_rounds(&client, snapshot.tracks, &log, &options, &pb).await;
    pb.finish_and_clear();

    match result {
        Ok(result) => {
            for round in &result.rounds {
                info!(
                    "Round {}: {} tracks, {} duplicated songs, {} removed, {} errors",
                    round.round, round.tracks, round.groups, round.removed, round.failed
                );
            }
            common::print_summary(&result.report, &log, flags.dry_run);
            success!("Dedup finished: {} tracks removed", result.report.removed());
        }
        Err(e) => error!("Dedup aborted: {}", e),
    }
}
