use std::path::PathBuf;

use tabled::Table;

use crate::{
    config,
    drivers::{Outcome, RunReport},
    error, info,
    management::ResultLog,
    tidal::{FavoritesSnapshot, TidalClient, TidalError, TrackCatalog},
    types::SummaryTableRow,
    utils, warning,
};

/// Failures listed after a run before the rest are left to the log file.
const SHOWN_FAILURES: usize = 10;

pub async fn connect() -> TidalClient {
    let pb = utils::spinner("Opening TIDAL session...");
    let client = TidalClient::connect(config::tidal_api_url()).await;
    pb.finish_and_clear();

    match client {
        Ok(client) => {
            info!(
                "Signed in as user {} ({})",
                client.session().user_id,
                client.session().country_code
            );
            client
                .with_max_tracks(config::max_tracks())
                .with_page_delay(config::request_delay())
        }
        Err(TidalError::NotAuthenticated) => {
            error!("No saved login. Please run mytracks auth first.")
        }
        Err(e) => error!("Cannot open TIDAL session. Please run mytracks auth\n Error: {}", e),
    }
}

pub async fn load_favorites(client: &TidalClient) -> FavoritesSnapshot {
    let pb = utils::spinner("Reading My Tracks...");
    let snapshot = client.favorite_tracks().await;
    pb.finish_and_clear();

    let snapshot = match snapshot {
        Ok(snapshot) => snapshot,
        Err(e) => error!("Failed to read My Tracks: {}", e),
    };

    info!("My Tracks holds {} tracks", snapshot.tracks.len());
    if snapshot.unavailable > 0 {
        warning!(
            "{} favorites are no longer available and were left alone",
            snapshot.unavailable
        );
    }
    if snapshot.missing() > 0 {
        warning!(
            "TIDAL reports {} more favorites than it returned",
            snapshot.missing()
        );
    }
    if snapshot.truncated {
        warning!("Reading stopped early; only part of My Tracks is processed");
    }
    snapshot
}

pub async fn open_log(driver: &str, log_file: Option<PathBuf>, title: &str) -> ResultLog {
    let log = match log_file {
        Some(path) => ResultLog::new(path),
        None => ResultLog::for_driver(driver),
    };
    if let Err(e) = log.begin_run(title).await {
        warning!("Cannot write to {}: {}", log.path().display(), e);
    }
    log
}

pub fn print_summary(report: &RunReport, log: &ResultLog, dry_run: bool) {
    let rows: Vec<SummaryTableRow> = report
        .summary()
        .into_iter()
        .map(|(outcome, count)| SummaryTableRow { outcome, count })
        .collect();

    if rows.is_empty() {
        info!("Nothing was processed");
    } else {
        println!("{}", Table::new(rows));
    }

    for failure in report.failures().take(SHOWN_FAILURES) {
        if let Outcome::Failed(reason) = &failure.outcome {
            warning!("{}: {}", utils::truncate(&failure.item, 60), reason);
        }
    }
    let failed = report.failed();
    if failed > SHOWN_FAILURES {
        warning!("... and {} more errors", failed - SHOWN_FAILURES);
    }

    if dry_run {
        info!("Dry run: nothing was changed in My Tracks");
    }
    info!("Log written to {}", log.path().display());
}

/// `true` when the run may go ahead.
pub fn confirmed(question: &str, yes: bool, dry_run: bool) -> bool {
    yes || dry_run || utils::confirm(question)
}

pub fn dry_run_marker(dry_run: bool) -> &'static str {
    if dry_run { " (dry run)" } else { "" }
}
