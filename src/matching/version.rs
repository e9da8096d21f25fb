use once_cell::sync::Lazy;
use regex::Regex;

use super::descriptor::TrackDescriptor;

static REMASTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:remaster(?:ed)?|digital remaster)\b").unwrap());
static EXPLICIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bexplicit\b").unwrap());
static CLEAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bclean\b").unwrap());
static STEREO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bstereo\b").unwrap());
static MONO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bmono\b").unwrap());
static ALBUM_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\balbum version\b").unwrap());
static SINGLE_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsingle version\b").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// Edition traits read from a track's title, version and album text.
///
/// Fields are declared in precedence order and every field is "greater is
/// preferred", so the derived `Ord` ranks two editions of the same song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTraits {
    /// Remaster year; `0` for a remaster without a year, `-1` when not remastered.
    pub remaster_year: i32,
    /// `1` explicit, `0` unmarked, `-1` clean.
    pub explicit: i8,
    /// `1` stereo, `0` unmarked, `-1` mono.
    pub stereo: i8,
    /// `1` album version, `0` unmarked, `-1` single version.
    pub album_version: i8,
}

impl VersionTraits {
    pub fn of(track: &TrackDescriptor) -> Self {
        let tag = [
            Some(track.title()),
            track.version(),
            track.album(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        let remaster_year = if REMASTER.is_match(&tag) {
            YEAR.find(&tag)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .unwrap_or(0)
        } else {
            -1
        };

        Self {
            remaster_year,
            explicit: marker(&tag, &EXPLICIT, &CLEAN),
            stereo: marker(&tag, &STEREO, &MONO),
            album_version: marker(&tag, &ALBUM_VERSION, &SINGLE_VERSION),
        }
    }
}

fn marker(tag: &str, preferred: &Regex, avoided: &Regex) -> i8 {
    if preferred.is_match(tag) {
        1
    } else if avoided.is_match(tag) {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_remaster_ranks_above_older_and_plain() {
        let newer = TrackDescriptor::new("1", "Song", "Band").with_version("2019 Remaster");
        let older = TrackDescriptor::new("2", "Song - Remastered 2009", "Band");
        let plain = TrackDescriptor::new("3", "Song", "Band");
        let undated = TrackDescriptor::new("4", "Song", "Band").with_album("Remastered Hits");

        assert_eq!(VersionTraits::of(&newer).remaster_year, 2019);
        assert_eq!(VersionTraits::of(&older).remaster_year, 2009);
        assert_eq!(VersionTraits::of(&undated).remaster_year, 0);
        assert_eq!(VersionTraits::of(&plain).remaster_year, -1);
        assert!(VersionTraits::of(&newer) > VersionTraits::of(&older));
        assert!(VersionTraits::of(&undated) > VersionTraits::of(&plain));
    }

    #[test]
    fn markers_prefer_explicit_stereo_album_versions() {
        let explicit = TrackDescriptor::new("1", "Song (Explicit)", "Band");
        let clean = TrackDescriptor::new("2", "Song (Clean)", "Band");
        assert!(VersionTraits::of(&explicit) > VersionTraits::of(&clean));

        let mono = VersionTraits::of(&TrackDescriptor::new("3", "Song - Mono", "Band"));
        let stereo = VersionTraits::of(&TrackDescriptor::new("4", "Song - Stereo", "Band"));
        assert_eq!((mono.stereo, stereo.stereo), (-1, 1));

        let single = VersionTraits::of(&TrackDescriptor::new("5", "Song (Single Version)", "B"));
        assert_eq!(single.album_version, -1);
    }
}
