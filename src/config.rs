//! Configuration management for mytracks.
//!
//! Values come from environment variables, which may be provided through a
//! `.env` file in the local data directory. Everything except the client id has
//! a default that works against the public TIDAL endpoints:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Built-in defaults

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::Res;

pub const DEFAULT_AUTH_URL: &str = "https://login.tidal.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://auth.tidal.com/v1/oauth2/token";
pub const DEFAULT_API_URL: &str = "https://api.tidal.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SCOPE: &str = "r_usr w_usr w_sub";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_MAX_TRACKS: usize = 50_000;

/// Directory holding `.env`, the token cache and the result logs.
///
/// - Linux: `~/.local/share/mytracks`
/// - macOS: `~/Library/Application Support/mytracks`
/// - Windows: `%LOCALAPPDATA%/mytracks`
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(env!("CARGO_PKG_NAME"));
    path
}

/// Loads environment variables from `<data dir>/.env` when that file exists.
///
/// Creates the data directory if needed. A missing `.env` file is not an error;
/// configuration may come from the process environment alone.
pub async fn load_env() -> Res<()> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir).await?;

    let path = dir.join(".env");
    if path.exists() {
        dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
    }
    Ok(())
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                log::warn!("Ignoring invalid {}={:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

fn millis_or(key: &str, default: u64) -> Duration {
    Duration::from_millis(parsed_or(key, default))
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// OAuth client id registered for the application. Required.
pub fn tidal_client_id() -> Result<String, String> {
    env::var("TIDAL_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| "TIDAL_API_AUTH_CLIENT_ID must be set".to_string())
}

/// OAuth client secret, only sent when configured.
pub fn tidal_client_secret() -> Option<String> {
    env::var("TIDAL_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

pub fn tidal_redirect_uri() -> String {
    var_or("TIDAL_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn tidal_scope() -> String {
    var_or("TIDAL_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn tidal_auth_url() -> String {
    var_or("TIDAL_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn tidal_token_url() -> String {
    var_or("TIDAL_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

pub fn tidal_api_url() -> String {
    var_or("TIDAL_API_URL", DEFAULT_API_URL)
}

/// Default local library for `sync` when `--dir` is not given.
pub fn music_dir() -> Option<PathBuf> {
    env::var("MYTRACKS_MUSIC_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Pause after each search or listing call.
pub fn request_delay() -> Duration {
    millis_or("MYTRACKS_REQUEST_DELAY_MS", 500)
}

/// Pause after each add or replace.
pub fn modify_delay() -> Duration {
    millis_or("MYTRACKS_MODIFY_DELAY_MS", 1000)
}

/// Pause after each removal during dedup.
pub fn remove_delay() -> Duration {
    millis_or("MYTRACKS_REMOVE_DELAY_MS", 300)
}

/// Pause between dedup rounds.
pub fn round_delay() -> Duration {
    millis_or("MYTRACKS_ROUND_DELAY_MS", 3000)
}

/// Upper bound on favorites read in one listing.
pub fn max_tracks() -> usize {
    parsed_or("MYTRACKS_MAX_TRACKS", DEFAULT_MAX_TRACKS)
}
