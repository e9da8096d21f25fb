use std::path::{Path, PathBuf};

use lofty::prelude::{Accessor, TaggedFileExt};
use walkdir::WalkDir;

use crate::matching::TrackDescriptor;

pub const AUDIO_EXTENSIONS: &[&str] = &["flac", "mp3", "wav", "m4a", "ogg", "aac", "opus"];

/// Folders that never hold library music.
pub const SKIPPED_DIRS: &[&str] = &["Sin clasificar", "__pycache__"];

/// One audio file with the song it was identified as.
#[derive(Debug, Clone)]
pub struct LocalTrack {
    pub path: PathBuf,
    pub descriptor: TrackDescriptor,
}

#[derive(Debug, Clone, Default)]
pub struct LocalScan {
    /// Identified files, sorted by path.
    pub tracks: Vec<LocalTrack>,
    /// Audio files that yielded neither an `Artist - Title` name nor tags.
    pub unparsed: Vec<PathBuf>,
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn is_skipped(name: &str) -> bool {
    name.starts_with('.') || SKIPPED_DIRS.contains(&name)
}

/// Splits an `Artist - Title` file stem.
///
/// Only the first ` - ` separates, so titles may contain dashes themselves.
/// A leading track number (`01 - Artist - Title`) is dropped.
pub fn parse_file_stem(stem: &str) -> Option<(String, String)> {
    let (artist, title) = stem.split_once(" - ")?;
    let (artist, title) = (artist.trim(), title.trim());

    if !artist.is_empty() && artist.chars().all(|c| c.is_ascii_digit()) {
        if let Some(parsed) = parse_file_stem(title) {
            return Some(parsed);
        }
    }

    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist.to_string(), title.to_string()))
}

fn from_tags(path: &Path) -> Option<(String, String)> {
    let tagged = match lofty::read_from_path(path) {
        Ok(tagged) => tagged,
        Err(e) => {
            log::debug!("No readable tags in {}: {}", path.display(), e);
            return None;
        }
    };

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    let artist = tag.artist()?.trim().to_string();
    let title = tag.title()?.trim().to_string();

    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist, title))
}

/// Walks `dir` for audio files and identifies each one.
///
/// The file name is tried first and embedded tags second. Hidden entries and
/// [`SKIPPED_DIRS`] are not descended into; unreadable entries are ignored.
pub fn scan(dir: &Path) -> LocalScan {
    let mut result = LocalScan::default();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !e.file_name().to_str().map(is_skipped).unwrap_or(false)
        })
        .filter_map(Result::ok);

    for entry in walker {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_audio_file(path) {
            continue;
        }

        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let identified = parse_file_stem(stem).or_else(|| from_tags(path));

        match identified {
            Some((artist, title)) => result.tracks.push(LocalTrack {
                path: path.to_path_buf(),
                descriptor: TrackDescriptor::new(path.display().to_string(), title, artist),
            }),
            None => result.unparsed.push(path.to_path_buf()),
        }
    }

    log::debug!(
        "Scanned {}: {} tracks, {} unparsed",
        dir.display(),
        result.tracks.len(),
        result.unparsed.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_extensions_are_case_insensitive() {
        assert!(is_audio_file(Path::new("/tmp/a.FLAC")));
        assert!(is_audio_file(Path::new("/tmp/a.opus")));
        assert!(!is_audio_file(Path::new("/tmp/cover.jpg")));
        assert!(!is_audio_file(Path::new("/tmp/noext")));
    }

    #[test]
    fn stem_splits_on_first_separator_only() {
        assert_eq!(
            parse_file_stem("Daft Punk - Harder - Better"),
            Some(("Daft Punk".into(), "Harder - Better".into()))
        );
        assert_eq!(parse_file_stem("NoSeparator"), None);
        assert_eq!(parse_file_stem(" - Title"), None);
    }

    #[test]
    fn leading_track_number_is_dropped() {
        assert_eq!(
            parse_file_stem("07 - Radiohead - Reckoner"),
            Some(("Radiohead".into(), "Reckoner".into()))
        );
        // a numeric artist name without a further separator stays as is
        assert_eq!(
            parse_file_stem("311 - Amber"),
            Some(("311".into(), "Amber".into()))
        );
    }
}
