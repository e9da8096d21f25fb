use std::path::PathBuf;

use crate::{
    cli::{RunFlags, common},
    config,
    drivers::{self, Pacing, RunOptions},
    error, info,
    local::{MusicDir, TrackSource},
    success, utils, warning,
};

pub async fn sync(dir: Option<PathBuf>, flags: RunFlags) {
    let Some(dir) = dir.or_else(config::music_dir) else {
        error!("No music folder given. Pass --dir or set MYTRACKS_MUSIC_DIR");
    };
    if !dir.is_dir() {
        error!("{} is not a folder", dir.display());
    }

    let pb = utils::spinner(format!("Scanning {}...", dir.display()));
    let scan = MusicDir::new(&dir).list();
    pb.finish_and_clear();

    info!("Found {} songs in {}", scan.tracks.len(), dir.display());
    if !scan.unparsed.is_empty() {
        warning!(
            "{} files have neither an `Artist - Title` name nor tags and are skipped",
            scan.unparsed.len()
        );
    }
    if scan.tracks.is_empty() && scan.unparsed.is_empty() {
        success!("Nothing to sync");
        return;
    }

    let log = common::open_log(
        "sync",
        flags.log_file,
        &format!("sync {}{}", dir.display(), common::dry_run_marker(flags.dry_run)),
    )
    .await;

    if scan.tracks.is_empty() {
        let report = drivers::sync::record_unparsed(&scan.unparsed, &log, flags.dry_run).await;
        common::print_summary(&report, &log, flags.dry_run);
        success!("Nothing to sync");
        return;
    }

    let client = common::connect().await;

    let options = RunOptions {
        dry_run: flags.dry_run,
        pacing: Pacing::from_config(),
        ..RunOptions::default()
    };

    let pb = utils::progress_bar(scan.tracks.len());
    let report = drivers::sync::run(&client, &scan, &log, &options, &pb).await;
    pb.finish_and_clear();

    match report {
        Ok(report) => {
            common::print_summary(&report, &log, flags.dry_run);
            success!("Sync finished: {} added", report.added());
        }
        Err(e) => error!("Sync aborted: {}", e),
    }
}
