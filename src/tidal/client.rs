use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use tokio::{sync::Mutex, time::sleep};

use crate::{
    management::TokenManager,
    matching::TrackDescriptor,
    types::{FavoritesPage, SearchPage, SessionInfo},
};

use super::{
    TrackCatalog, auth,
    error::{Result, TidalError},
    favorites::{FavoritesSnapshot, collect_favorites},
    retry::{RetryConfig, with_retry},
};

/// Wait assumed when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER: u64 = 5;

/// Maps non-success responses to [`TidalError`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER);
        return Err(TidalError::RateLimited { retry_after });
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(TidalError::Auth(body));
    }

    Err(TidalError::Status { status, body })
}

/// Authenticated handle on one TIDAL account.
///
/// Owns the token manager for the run; every request asks it for a valid access
/// token, so long runs survive token expiry.
pub struct TidalClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
    session: SessionInfo,
    retry: RetryConfig,
    max_tracks: usize,
    page_delay: Duration,
}

impl TidalClient {
    pub fn new(api_url: impl Into<String>, tokens: TokenManager, session: SessionInfo) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(tokens),
            session,
            retry: RetryConfig::default(),
            max_tracks: crate::config::DEFAULT_MAX_TRACKS,
            page_delay: Duration::ZERO,
        }
    }

    /// Loads the cached token and resolves the session it belongs to.
    pub async fn connect(api_url: impl Into<String>) -> Result<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let mut tokens = TokenManager::load().await.map_err(|e| {
            log::debug!("No usable token cache: {}", e);
            TidalError::NotAuthenticated
        })?;

        let http = Client::new();
        let access_token = tokens.get_valid_token().await;
        let session = with_retry(&RetryConfig::default(), "session lookup", || {
            auth::fetch_session(&http, &api_url, &access_token)
        })
        .await?;

        log::debug!(
            "Session for user {} ({})",
            session.user_id,
            session.country_code
        );

        Ok(Self {
            http,
            ..Self::new(api_url, tokens, session)
        })
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_tracks(mut self, max_tracks: usize) -> Self {
        self.max_tracks = max_tracks;
        self
    }

    /// Pause between favorites pages.
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn session(&self) -> &SessionInfo {
        &self.session
    }

    fn favorites_path(&self) -> String {
        format!("users/{}/favorites/tracks", self.session.user_id)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        form: Option<&[(&str, String)]>,
    ) -> Result<Response> {
        let url = format!("{}/{}", self.api_url, path);
        log::debug!("{} {} {:?}", method, url, query);

        let access_token = self.tokens.lock().await.get_valid_token().await;
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(access_token)
            .query(&[("countryCode", self.session.country_code.as_str())])
            .query(query);
        if let Some(form) = form {
            request = request.form(form);
        }

        ensure_success(request.send().await?).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.call(Method::GET, path, query, None)
            .await?
            .json::<T>()
            .await
            .map_err(|e| TidalError::Decode(e.to_string()))
    }

    async fn favorites_page(&self, offset: u32, limit: u32) -> Result<FavoritesPage> {
        if offset > 0 && !self.page_delay.is_zero() {
            sleep(self.page_delay).await;
        }

        let path = self.favorites_path();
        let query = [
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
            ("order", "DATE".to_string()),
            ("orderDirection", "DESC".to_string()),
        ];
        with_retry(&self.retry, "favorites page", || self.get_json(&path, &query)).await
    }
}

#[async_trait]
impl TrackCatalog for TidalClient {
    async fn favorite_tracks(&self) -> Result<FavoritesSnapshot> {
        collect_favorites(self.max_tracks, |offset, limit| {
            self.favorites_page(offset, limit)
        })
        .await
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<TrackDescriptor>> {
        let params = [
            ("query", query.to_string()),
            ("limit", limit.to_string()),
            ("offset", "0".to_string()),
        ];
        let page: SearchPage = with_retry(&self.retry, "search", || {
            self.get_json("search/tracks", &params)
        })
        .await?;

        Ok(page
            .items
            .iter()
            .take(limit)
            .filter_map(|t| t.to_descriptor())
            .collect())
    }

    async fn add_favorite(&self, track_id: &str) -> Result<()> {
        let path = self.favorites_path();
        let form = [("trackId", track_id.to_string())];
        with_retry(&self.retry, "add favorite", || {
            self.call(Method::POST, &path, &[], Some(form.as_slice()))
        })
        .await?;
        Ok(())
    }

    async fn remove_favorite(&self, track_id: &str) -> Result<()> {
        let path = format!("{}/{}", self.favorites_path(), track_id);
        with_retry(&self.retry, "remove favorite", || {
            self.call(Method::DELETE, &path, &[], None)
        })
        .await?;
        Ok(())
    }
}
