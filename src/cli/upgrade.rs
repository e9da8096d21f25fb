use tabled::Table;

use crate::{
    cli::{RunFlags, common},
    drivers::{
        self, Pacing, RunOptions,
        upgrade::quality_distribution,
    },
    error, info,
    matching::tier_label,
    success,
    types::QualityTableRow,
    utils, warning,
};

pub async fn upgrade(flags: RunFlags) {
    let client = common::connect().await;
    let snapshot = common::load_favorites(&client).await;
    let tracks = snapshot.tracks;

    let rows: Vec<QualityTableRow> = quality_distribution(&tracks)
        .into_iter()
        .map(|(tier, count)| QualityTableRow {
            quality: tier_label(tier).to_string(),
            tracks: count,
        })
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }

    let top = tracks
        .iter()
        .filter(|t| t.quality().is_some_and(|q| q.is_top()))
        .count();
    let candidates = tracks.len() - top;
    info!(
        "{} tracks are already at the best quality, {} will be checked",
        top, candidates
    );

    if candidates == 0 {
        success!("Nothing to upgrade");
        return;
    }

    if !common::confirmed(
        &format!("Search better versions for {} tracks?", candidates),
        flags.yes,
        flags.dry_run,
    ) {
        info!("Cancelled");
        return;
    }

    let log = common::open_log(
        "upgrade",
        flags.log_file,
        &format!("upgrade{}", common::dry_run_marker(flags.dry_run)),
    )
    .await;

    let options = RunOptions {
        dry_run: flags.dry_run,
        pacing: Pacing::from_config(),
        ..RunOptions::default()
    };

    let pb = utils::progress_bar(tracks.len());
    let report = drivers::upgrade::run(&client, &tracks, &log, &options, &pb).await;
    pb.finish_and_clear();

    match report {
        Ok(report) => {
            common::print_summary(&report, &log, flags.dry_run);
            if report.failed() > 0 {
                warning!("Some originals may still be in My Tracks; run mytracks dedup to clean them up");
            }
            success!("Upgrade finished: {} tracks upgraded", report.upgraded());
        }
        Err(e) => error!("Upgrade aborted: {}", e),
    }
}
