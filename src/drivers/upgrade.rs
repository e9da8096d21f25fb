use indicatif::ProgressBar;

use crate::{
    management::ResultLog,
    matching::{QualityTier, TrackDescriptor, matches, tier_label},
    tidal::{Result, TrackCatalog},
};

use super::{ItemReport, Outcome, RunOptions, RunReport, SkipReason, pause};

/// Search results considered per favorite.
pub const SEARCH_LIMIT: usize = 20;

/// Best search result that is the same song in a strictly higher tier.
///
/// Results without a known tier are ignored; on equal tiers the earlier result
/// wins.
pub fn find_better_version<'a>(
    current: &TrackDescriptor,
    candidates: &'a [TrackDescriptor],
) -> Option<&'a TrackDescriptor> {
    let mut best: Option<&TrackDescriptor> = None;
    for candidate in candidates {
        if candidate.source_id() == current.source_id() || candidate.quality().is_none() {
            continue;
        }
        if !matches(current, candidate) {
            continue;
        }
        let to_beat = best.map_or(current.quality(), |b| b.quality());
        if candidate.quality() > to_beat {
            best = Some(candidate);
        }
    }
    best
}

/// Number of tracks per tier, highest tier first, unknown last.
pub fn quality_distribution(tracks: &[TrackDescriptor]) -> Vec<(Option<QualityTier>, usize)> {
    let mut tiers: Vec<Option<QualityTier>> = QualityTier::ALL.iter().copied().map(Some).collect();
    tiers.push(None);

    tiers
        .into_iter()
        .map(|tier| (tier, tracks.iter().filter(|t| t.quality() == tier).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Replaces favorites with higher-quality versions of the same song.
///
/// The better version is added before the old one is removed, so a failure
/// in between leaves a duplicate rather than a gap; `dedup` cleans it up.
pub async fn run<C>(
    catalog: &C,
    tracks: &[TrackDescriptor],
    log: &ResultLog,
    options: &RunOptions,
    pb: &ProgressBar,
) -> Result<RunReport>
where
    C: TrackCatalog + ?Sized,
{
    let mut report = RunReport::default();
    pb.set_length(tracks.len() as u64);

    for track in tracks {
        pb.set_message(format!("[{}] {}", tier_label(track.quality()), track.label()));
        let item = upgrade_one(catalog, track, options).await?;
        report.record(log, item, options.dry_run).await;
        pb.inc(1);
    }

    Ok(report)
}

async fn upgrade_one<C>(catalog: &C, track: &TrackDescriptor, options: &RunOptions) -> Result<ItemReport>
where
    C: TrackCatalog + ?Sized,
{
    let label = track.label();
    let id = track.source_id();
    let current = tier_label(track.quality());

    if !track.is_well_formed() {
        return Ok(ItemReport::new(label, id, Outcome::Skipped(SkipReason::MalformedInput)));
    }
    if track.quality().is_some_and(|q| q.is_top()) {
        return Ok(
            ItemReport::new(label, id, Outcome::Skipped(SkipReason::AlreadyBest)).with_detail(current),
        );
    }

    let query = format!("{} {}", track.artist(), track.title());
    let results = catalog.search_tracks(&query, SEARCH_LIMIT).await;
    pause(options.pacing.request).await;

    let results = match results {
        Ok(results) => results,
        Err(e) if e.is_auth() => return Err(e),
        Err(e) => {
            return Ok(ItemReport::new(label, id, Outcome::Failed(format!("search failed: {}", e))));
        }
    };

    let Some(better) = find_better_version(track, &results) else {
        return Ok(
            ItemReport::new(label, id, Outcome::Skipped(SkipReason::NoBetterVersion)).with_detail(current),
        );
    };

    let change = format!(
        "[{}] -> [{}] new id={}",
        current,
        tier_label(better.quality()),
        better.source_id()
    );

    if options.dry_run {
        return Ok(ItemReport::new(label, id, Outcome::Upgraded).with_detail(change));
    }

    let added = catalog.add_favorite(better.source_id()).await;
    pause(options.pacing.modify).await;
    match added {
        Ok(()) => {}
        Err(e) if e.is_auth() => return Err(e),
        Err(e) => {
            return Ok(
                ItemReport::new(label, id, Outcome::Failed(format!("add failed: {}", e))).with_detail(change),
            );
        }
    }

    let removed = catalog.remove_favorite(id).await;
    pause(options.pacing.modify).await;
    match removed {
        Ok(()) => Ok(ItemReport::new(label, id, Outcome::Upgraded).with_detail(change)),
        Err(e) if e.is_auth() => Err(e),
        Err(e) => Ok(ItemReport::new(
            label,
            id,
            Outcome::Failed(format!(
                "better version added but the original could not be removed ({}); run `mytracks dedup`",
                e
            )),
        )
        .with_detail(change)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str, title: &str, artist: &str, quality: Option<QualityTier>) -> TrackDescriptor {
        TrackDescriptor::new(id, title, artist).with_quality(quality)
    }

    #[test]
    fn picks_the_highest_matching_tier() {
        let current = track("1", "Song", "Band", Some(QualityTier::High));
        let results = vec![
            track("2", "Song", "Band", Some(QualityTier::Lossless)),
            track("3", "Other Song", "Band", Some(QualityTier::HiResLossless)),
            track("4", "Song (Remastered)", "Band", Some(QualityTier::HiRes)),
            track("5", "Song", "Band", Some(QualityTier::HiRes)),
        ];

        let better = find_better_version(&current, &results).map(|t| t.source_id());
        assert_eq!(better, Some("4"));
    }

    #[test]
    fn equal_or_unknown_tiers_are_no_upgrade() {
        let current = track("1", "Song", "Band", Some(QualityTier::Lossless));
        let results = vec![
            track("1", "Song", "Band", Some(QualityTier::HiRes)),
            track("2", "Song", "Band", Some(QualityTier::Lossless)),
            track("3", "Song", "Band", None),
        ];
        assert!(find_better_version(&current, &results).is_none());
    }

    #[test]
    fn unknown_current_tier_is_beaten_by_any_known_tier() {
        let current = track("1", "Song", "Band", None);
        let results = vec![track("2", "Song", "Band", Some(QualityTier::Low))];
        assert_eq!(
            find_better_version(&current, &results).map(|t| t.source_id()),
            Some("2")
        );
    }

    #[test]
    fn distribution_lists_tiers_high_to_low() {
        let tracks = vec![
            track("1", "A", "X", Some(QualityTier::Lossless)),
            track("2", "B", "X", None),
            track("3", "C", "X", Some(QualityTier::HiResLossless)),
            track("4", "D", "X", Some(QualityTier::Lossless)),
        ];
        assert_eq!(
            quality_distribution(&tracks),
            vec![
                (Some(QualityTier::HiResLossless), 1),
                (Some(QualityTier::Lossless), 2),
                (None, 1),
            ]
        );
    }
}
