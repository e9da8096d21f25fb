//! # TIDAL Module
//!
//! Remote side of every command: the [`TrackCatalog`] capability the drivers
//! are written against, and [`TidalClient`], its implementation over the TIDAL
//! v1 API.
//!
//! Transient failures (429, 5xx, timeouts) are retried through [`with_retry`];
//! everything else surfaces as a [`TidalError`].

pub mod auth;
mod client;
mod error;
mod favorites;
mod retry;

use async_trait::async_trait;

use crate::matching::TrackDescriptor;

pub use client::TidalClient;
pub use error::{Result, TidalError};
pub use favorites::{FavoritesSnapshot, PAGE_SIZE, collect_favorites};
pub use retry::{RetryConfig, with_retry};

/// What the drivers need from a streaming service.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// The whole My Tracks collection, most recently added first.
    async fn favorite_tracks(&self) -> Result<FavoritesSnapshot>;

    /// Catalog search, best matches first, at most `limit` results.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackDescriptor>>;

    async fn add_favorite(&self, track_id: &str) -> Result<()>;

    async fn remove_favorite(&self, track_id: &str) -> Result<()>;
}
