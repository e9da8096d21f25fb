use std::{collections::HashSet, path::PathBuf};

use indicatif::ProgressBar;

use crate::{
    local::{LocalScan, TrackSource},
    management::ResultLog,
    matching::{Resolution, TrackDescriptor, resolve_match},
    tidal::{Result, TrackCatalog},
    warning,
};

use super::{ItemReport, Outcome, RunOptions, RunReport, SkipReason, pause};

/// Search results considered per local song.
pub const SEARCH_LIMIT: usize = 10;

/// Adds every local song that is not in My Tracks yet.
///
/// Songs already favorited (by matching a favorite, or because the matching
/// search result's id is favorited) are reported as present. A failed
/// favorites pre-load only warns; the run then relies on the id check alone.
pub async fn run<C, S>(
    catalog: &C,
    source: &S,
    log: &ResultLog,
    options: &RunOptions,
    pb: &ProgressBar,
) -> Result<RunReport>
where
    C: TrackCatalog + ?Sized,
    S: TrackSource + ?Sized,
{
    let LocalScan { tracks, unparsed } = source.list();
    let mut report = RunReport::default();

    pb.set_message("Loading My Tracks...");
    let mut favorites: Vec<TrackDescriptor> = match catalog.favorite_tracks().await {
        Ok(snapshot) => snapshot.tracks,
        Err(e) if e.is_auth() => return Err(e),
        Err(e) => {
            warning!("Could not load My Tracks, duplicates are only caught by id: {}", e);
            Vec::new()
        }
    };
    let mut favorite_ids: HashSet<String> =
        favorites.iter().map(|t| t.source_id().to_string()).collect();
    pause(options.pacing.request).await;

    report.extend(record_unparsed(&unparsed, log, options.dry_run).await);

    pb.set_length(tracks.len() as u64);
    for local in &tracks {
        let wanted = &local.descriptor;
        let label = wanted.label();
        let path = local.path.display().to_string();
        pb.set_message(format!("Syncing {}", label));

        let mut item = sync_one(
            catalog,
            wanted,
            &mut favorites,
            &mut favorite_ids,
            options,
        )
        .await?;
        item.item = label;
        if item.source_id.is_empty() {
            item.source_id = path;
        } else if item.detail.is_empty() {
            item.detail = path;
        } else {
            item.detail = format!("{} | {}", item.detail, path);
        }

        report.record(log, item, options.dry_run).await;
        pb.inc(1);
    }

    Ok(report)
}

/// Logs files that could not be identified as skipped malformed input.
pub async fn record_unparsed(paths: &[PathBuf], log: &ResultLog, dry_run: bool) -> RunReport {
    let mut report = RunReport::default();
    for path in paths {
        let name = path.display().to_string();
        let item = ItemReport::new(name.clone(), name, Outcome::Skipped(SkipReason::MalformedInput))
            .with_detail("expected `Artist - Title` file name or tags");
        report.record(log, item, dry_run).await;
    }
    report
}

async fn sync_one<C>(
    catalog: &C,
    wanted: &TrackDescriptor,
    favorites: &mut Vec<TrackDescriptor>,
    favorite_ids: &mut HashSet<String>,
    options: &RunOptions,
) -> Result<ItemReport>
where
    C: TrackCatalog + ?Sized,
{
    if !wanted.is_well_formed() {
        return Ok(ItemReport::new("", "", Outcome::Skipped(SkipReason::MalformedInput)));
    }

    if let Resolution::Found(existing) = resolve_match(wanted, favorites) {
        return Ok(ItemReport::new("", existing.source_id(), Outcome::AlreadyPresent));
    }

    let query = format!("{} {}", wanted.artist(), wanted.title());
    let results = catalog.search_tracks(&query, SEARCH_LIMIT).await;
    pause(options.pacing.request).await;

    let results = match results {
        Ok(results) => results,
        Err(e) if e.is_auth() => return Err(e),
        Err(e) => return Ok(ItemReport::new("", "", Outcome::Failed(format!("search failed: {}", e)))),
    };

    let found = match resolve_match(wanted, &results) {
        Resolution::Found(found) => found.clone(),
        Resolution::Ambiguous(credits) => {
            return Ok(
                ItemReport::new("", "", Outcome::Skipped(SkipReason::AmbiguousMatch))
                    .with_detail(format!("{} different credits match", credits)),
            );
        }
        Resolution::NotFound => {
            return Ok(ItemReport::new("", "", Outcome::Skipped(SkipReason::NotFound)));
        }
    };

    let id = found.source_id().to_string();
    if favorite_ids.contains(&id) {
        return Ok(ItemReport::new("", id, Outcome::AlreadyPresent));
    }

    if !options.dry_run {
        let added = catalog.add_favorite(&id).await;
        pause(options.pacing.modify).await;
        match added {
            Ok(()) => {}
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => return Ok(ItemReport::new("", id, Outcome::Failed(format!("add failed: {}", e)))),
        }
    }

    favorite_ids.insert(id.clone());
    favorites.push(found);
    Ok(ItemReport::new("", id, Outcome::Added))
}
