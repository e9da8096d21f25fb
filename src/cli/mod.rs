//! # CLI Module
//!
//! User-facing commands. Each one opens the TIDAL session, shows what it is
//! about to do, asks for confirmation where something gets removed, hands the
//! work to a driver and prints a summary table.
//!
//! - [`auth`] - log in through the browser and cache the token
//! - [`sync`] - add a local music folder to My Tracks
//! - [`upgrade`] - replace favorites with better-quality versions
//! - [`dedup`] - remove duplicate favorites
//!
//! Setup failures (no login, no session, first listing) end the program through
//! the `error!` macro; per-track problems only show up in the summary and log.

mod auth;
mod common;
mod dedup;
mod sync;
mod upgrade;

use std::path::PathBuf;

pub use auth::auth;
pub use dedup::dedup;
pub use sync::sync;
pub use upgrade::upgrade;

/// Flags shared by the commands that change My Tracks.
#[derive(Debug, Clone, Default)]
pub struct RunFlags {
    pub dry_run: bool,
    /// Skip the confirmation prompt.
    pub yes: bool,
    /// Write the result log here instead of the data directory.
    pub log_file: Option<PathBuf>,
}
