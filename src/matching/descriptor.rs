use std::{collections::BTreeSet, time::Duration};

use super::{
    normalize::{artist_tokens, normalize_artist, normalize_title},
    quality::QualityTier,
};

/// Immutable, comparison-ready view of one song.
///
/// Built from a favorites entry, a search result or a local file. The
/// normalized forms are computed once in [`TrackDescriptor::new`] and depend
/// only on `title` and `artist`; builders that attach optional metadata never
/// touch them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    source_id: String,
    title: String,
    artist: String,
    album: Option<String>,
    version: Option<String>,
    duration: Option<Duration>,
    quality: Option<QualityTier>,
    normalized_title: String,
    normalized_artist: String,
    artist_names: BTreeSet<String>,
    normalized_key: String,
}

impl TrackDescriptor {
    pub fn new(
        source_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let artist = artist.into();
        let normalized_title = normalize_title(&title);
        let normalized_artist = normalize_artist(&artist);
        let artist_names = artist_tokens(&artist);
        let normalized_key = format!("{normalized_artist} - {normalized_title}");

        Self {
            source_id: source_id.into(),
            title,
            artist,
            album: None,
            version: None,
            duration: None,
            quality: None,
            normalized_title,
            normalized_artist,
            artist_names,
            normalized_key,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into()).filter(|a: &String| !a.trim().is_empty());
        self
    }

    /// Edition text the service keeps apart from the title ("Remastered 2011").
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into()).filter(|v: &String| !v.trim().is_empty());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_quality(mut self, quality: Option<QualityTier>) -> Self {
        self.quality = quality;
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn album(&self) -> Option<&str> {
        self.album.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn quality(&self) -> Option<QualityTier> {
        self.quality
    }

    pub fn normalized_title(&self) -> &str {
        &self.normalized_title
    }

    pub fn normalized_artist(&self) -> &str {
        &self.normalized_artist
    }

    pub fn artist_names(&self) -> &BTreeSet<String> {
        &self.artist_names
    }

    pub fn normalized_key(&self) -> &str {
        &self.normalized_key
    }

    /// Descriptors without a usable title or artist never match anything.
    pub fn is_well_formed(&self) -> bool {
        !self.normalized_title.is_empty() && !self.artist_names.is_empty()
    }

    /// "Artist - Title (Version)" for console and log output.
    pub fn label(&self) -> String {
        match self.version() {
            Some(version) => format!("{} - {} ({})", self.artist, self.title, version),
            None => format!("{} - {}", self.artist, self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_key_depends_on_title_and_artist_only() {
        let a = TrackDescriptor::new("1", "Hello!", "Adele").with_album("25");
        let b = TrackDescriptor::new("2", "hello", "ADELE")
            .with_quality(Some(QualityTier::Lossless))
            .with_version("Remastered");
        assert_eq!(a.normalized_key(), "adele - hello");
        assert_eq!(a.normalized_key(), b.normalized_key());
    }

    #[test]
    fn blank_optional_metadata_is_dropped() {
        let d = TrackDescriptor::new("1", "Song", "Band")
            .with_album("  ")
            .with_version("");
        assert_eq!(d.album(), None);
        assert_eq!(d.version(), None);
        assert_eq!(d.label(), "Band - Song");
    }

    #[test]
    fn missing_title_or_artist_is_not_well_formed() {
        assert!(TrackDescriptor::new("1", "Song", "Band").is_well_formed());
        assert!(!TrackDescriptor::new("1", "", "Band").is_well_formed());
        assert!(!TrackDescriptor::new("1", "Song", " ").is_well_formed());
        assert!(!TrackDescriptor::new("1", "!!!", "Band").is_well_formed());
    }
}
