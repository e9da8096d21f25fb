//! TIDAL My Tracks maintenance library
//!
//! Keeps a TIDAL favorites collection in shape: adds songs from a local music
//! folder, replaces favorites with better-quality versions and removes
//! duplicates. All three jobs share one fuzzy track matcher and duplicate
//! grouper.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints for the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `drivers` - sync, upgrade and dedup run logic
//! - `local` - Local music folder scanning
//! - `management` - Token persistence and result logs
//! - `matching` - Track descriptors, matcher and duplicate grouper
//! - `server` - Local HTTP server for OAuth callbacks
//! - `tidal` - TIDAL API client and the catalog capability it implements
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod drivers;
pub mod local;
pub mod management;
pub mod matching;
pub mod server;
pub mod tidal;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Boxed error with `Send + Sync` bounds, for code that mixes error sources.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// ```
/// info!("Found {} duplicates", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for failures the program cannot continue after, such as a missing
/// login. Code after the macro does not run.
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
