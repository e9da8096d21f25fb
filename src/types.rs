use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::matching::{QualityTier, TrackDescriptor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// Account the access token belongs to, as reported by `GET /sessions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: u64,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesPage {
    #[serde(default)]
    pub items: Vec<FavoriteItem>,
    pub total_number_of_items: Option<u64>,
}

/// One favorites entry; `item` is `null` for tracks pulled from the catalog
/// or unavailable in the account's region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub created: Option<String>,
    pub item: Option<TrackResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<TrackResource>,
    pub total_number_of_items: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResource {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub version: Option<String>,
    /// Seconds.
    pub duration: Option<u64>,
    pub artist: Option<ArtistRef>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    pub album: Option<AlbumRef>,
    pub audio_quality: Option<String>,
    pub media_metadata: Option<MediaMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: Option<u64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: Option<u64>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TrackResource {
    /// Full artist credit: every listed artist, falling back to the main one.
    pub fn artist_credit(&self) -> String {
        let names: Vec<&str> = self
            .artists
            .iter()
            .filter_map(|a| a.name.as_deref())
            .filter(|n| !n.trim().is_empty())
            .collect();

        if names.is_empty() {
            self.artist
                .as_ref()
                .and_then(|a| a.name.clone())
                .unwrap_or_default()
        } else {
            names.join(", ")
        }
    }

    /// Best tier from `audioQuality` and the media tags.
    pub fn quality(&self) -> Option<QualityTier> {
        let reported = self.audio_quality.as_deref().and_then(QualityTier::parse);
        let tagged = self
            .media_metadata
            .as_ref()
            .and_then(|m| QualityTier::from_media_tags(&m.tags));
        reported.max(tagged)
    }

    /// `None` when the resource carries no id to act on.
    pub fn to_descriptor(&self) -> Option<TrackDescriptor> {
        let id = self.id?;
        let mut descriptor = TrackDescriptor::new(
            id.to_string(),
            self.title.clone().unwrap_or_default(),
            self.artist_credit(),
        )
        .with_quality(self.quality());

        if let Some(album) = self.album.as_ref().and_then(|a| a.title.clone()) {
            descriptor = descriptor.with_album(album);
        }
        if let Some(version) = self.version.clone() {
            descriptor = descriptor.with_version(version);
        }
        if let Some(seconds) = self.duration {
            descriptor = descriptor.with_duration(Duration::from_secs(seconds));
        }
        Some(descriptor)
    }
}

#[derive(Tabled)]
pub struct DuplicateTableRow {
    pub action: String,
    pub track: String,
    pub quality: String,
    pub album: String,
}

#[derive(Tabled)]
pub struct QualityTableRow {
    pub quality: String,
    pub tracks: usize,
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub outcome: String,
    pub count: usize,
}
