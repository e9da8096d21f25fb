//! # Local Module
//!
//! Turns a folder of audio files into songs to look up. [`TrackSource`] is the
//! seam the sync driver depends on; [`MusicDir`] is the filesystem version.

mod scan;

use std::path::PathBuf;

pub use scan::{AUDIO_EXTENSIONS, LocalScan, LocalTrack, SKIPPED_DIRS, parse_file_stem, scan};

/// Lists local songs.
pub trait TrackSource {
    fn list(&self) -> LocalScan;
}

/// A music folder on disk, usually one subfolder per artist.
#[derive(Debug, Clone)]
pub struct MusicDir {
    root: PathBuf,
}

impl MusicDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl TrackSource for MusicDir {
    fn list(&self) -> LocalScan {
        scan(&self.root)
    }
}

impl TrackSource for LocalScan {
    fn list(&self) -> LocalScan {
        self.clone()
    }
}
