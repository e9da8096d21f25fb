use std::{collections::HashSet, future::Future};

use crate::{matching::TrackDescriptor, types::FavoritesPage, warning};

use super::error::Result;

/// Page size used when reading My Tracks.
pub const PAGE_SIZE: u32 = 100;

/// Complete read of My Tracks.
#[derive(Debug, Clone, Default)]
pub struct FavoritesSnapshot {
    /// Tracks in service order (most recently added first), unique by id.
    pub tracks: Vec<TrackDescriptor>,
    /// Entries whose track is no longer in the catalog or not available in the
    /// account's region.
    pub unavailable: usize,
    /// Total the service claims to hold, when it reported one.
    pub reported_total: Option<u64>,
    /// Reading stopped early (track cap reached or a page failed).
    pub truncated: bool,
}

impl FavoritesSnapshot {
    pub fn from_tracks(tracks: Vec<TrackDescriptor>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    /// Entries the service counted but never returned on any page.
    pub fn missing(&self) -> u64 {
        self.reported_total
            .unwrap_or(0)
            .saturating_sub((self.tracks.len() + self.unavailable) as u64)
    }

    pub fn ids(&self) -> HashSet<String> {
        self.tracks
            .iter()
            .map(|t| t.source_id().to_string())
            .collect()
    }
}

/// Reads every favorites page through `fetch_page(offset, limit)`.
///
/// Only two consecutive empty pages end the listing; a short or empty page on
/// its own does not, because the service sometimes returns them mid-list.
/// Entries without track data are counted as unavailable, repeated ids are
/// dropped and reading stops once `max_tracks` tracks were collected. A failure
/// on the first page is returned; later failures keep what was read so far.
pub async fn collect_favorites<F, Fut>(max_tracks: usize, mut fetch_page: F) -> Result<FavoritesSnapshot>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<FavoritesPage>>,
{
    let mut snapshot = FavoritesSnapshot::default();
    let mut seen: HashSet<u64> = HashSet::new();
    let mut offset = 0;
    let mut consecutive_empty = 0;

    loop {
        let page = match fetch_page(offset, PAGE_SIZE).await {
            Ok(page) => page,
            Err(e) if offset == 0 => return Err(e),
            Err(e) => {
                warning!("Stopped reading My Tracks at offset {}: {}", offset, e);
                snapshot.truncated = true;
                break;
            }
        };

        if let Some(total) = page.total_number_of_items {
            snapshot.reported_total = Some(total);
        }

        if page.items.is_empty() {
            consecutive_empty += 1;
            if consecutive_empty >= 2 {
                break;
            }
            offset += PAGE_SIZE;
            continue;
        }
        consecutive_empty = 0;

        for entry in page.items {
            let Some(track) = entry.item else {
                snapshot.unavailable += 1;
                continue;
            };
            let Some(id) = track.id else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            if let Some(descriptor) = track.to_descriptor() {
                snapshot.tracks.push(descriptor);
            }
        }

        log::debug!(
            "Read {} favorites (offset={}, reported total={:?})",
            snapshot.tracks.len(),
            offset,
            snapshot.reported_total
        );

        if snapshot.tracks.len() >= max_tracks {
            snapshot.tracks.truncate(max_tracks);
            snapshot.truncated = true;
            break;
        }

        offset += PAGE_SIZE;
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use serde_json::json;

    use super::*;
    use crate::tidal::TidalError;

    fn page(value: serde_json::Value) -> FavoritesPage {
        serde_json::from_value(value).unwrap()
    }

    fn item(id: u64, title: &str) -> serde_json::Value {
        json!({
            "created": "2024-01-01T00:00:00.000+0000",
            "item": {
                "id": id,
                "title": title,
                "artist": { "id": 1, "name": "Band" },
                "artists": [{ "id": 1, "name": "Band" }],
                "album": { "id": 9, "title": "Album" },
                "audioQuality": "LOSSLESS"
            }
        })
    }

    async fn run(pages: Vec<Result<FavoritesPage>>, max: usize) -> Result<FavoritesSnapshot> {
        let mut pages: VecDeque<_> = pages.into();
        collect_favorites(max, move |_, _| {
            let next = pages
                .pop_front()
                .unwrap_or_else(|| Ok(page(json!({ "items": [] }))));
            async move { next }
        })
        .await
    }

    #[tokio::test]
    async fn a_single_empty_page_does_not_end_the_listing() {
        let snapshot = run(
            vec![
                Ok(page(json!({ "items": [item(1, "One")], "totalNumberOfItems": 3 }))),
                Ok(page(json!({ "items": [] }))),
                Ok(page(json!({ "items": [item(2, "Two"), { "item": null }] }))),
            ],
            50_000,
        )
        .await
        .unwrap();

        let ids: Vec<&str> = snapshot.tracks.iter().map(|t| t.source_id()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(snapshot.unavailable, 1);
        assert_eq!(snapshot.missing(), 0);
        assert!(!snapshot.truncated);
    }

    #[tokio::test]
    async fn repeated_ids_are_dropped_and_cap_is_enforced() {
        let snapshot = run(
            vec![Ok(page(json!({
                "items": [item(1, "One"), item(1, "One"), item(2, "Two"), item(3, "Three")]
            })))],
            2,
        )
        .await
        .unwrap();

        assert_eq!(snapshot.tracks.len(), 2);
        assert!(snapshot.truncated);
    }

    #[tokio::test]
    async fn first_page_failure_is_an_error_later_ones_truncate() {
        let failed = run(vec![Err(TidalError::Decode("boom".into()))], 10).await;
        assert!(failed.is_err());

        let partial = run(
            vec![
                Ok(page(json!({ "items": [item(1, "One")], "totalNumberOfItems": 5 }))),
                Err(TidalError::Decode("boom".into())),
            ],
            10,
        )
        .await
        .unwrap();
        assert_eq!(partial.tracks.len(), 1);
        assert!(partial.truncated);
        assert_eq!(partial.missing(), 4);
    }
}
