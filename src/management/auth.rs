use std::path::PathBuf;

use chrono::Utc;

use crate::{config, tidal, types::Token};

/// Seconds before expiry at which the access token is refreshed.
const REFRESH_MARGIN: u64 = 240;

pub struct TokenManager {
    token: Token,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager { token }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Access token, refreshed first when it is about to expire.
    ///
    /// A failed refresh keeps the current token; the next call against the API
    /// then fails with an authentication error.
    pub async fn get_valid_token(&mut self) -> String {
        if self.is_expired() {
            match tidal::auth::refresh_token(&self.token.refresh_token).await {
                Ok(new_token) => {
                    self.token = new_token;
                    if let Err(e) = self.persist().await {
                        log::warn!("Failed to save refreshed token: {}", e);
                    }
                }
                Err(e) => log::warn!("Token refresh failed: {}", e),
            }
        }

        self.token.access_token.clone()
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        let lifetime = self.token.expires_in.saturating_sub(REFRESH_MARGIN);
        now >= self.token.obtained_at + lifetime
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache").join("token.json")
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(obtained_at: u64, expires_in: u64) -> Token {
        Token {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            scope: "r_usr w_usr".into(),
            expires_in,
            obtained_at,
        }
    }

    #[test]
    fn fresh_token_is_not_expired() {
        let now = Utc::now().timestamp() as u64;
        assert!(!TokenManager::new(token(now, 3600)).is_expired());
    }

    #[test]
    fn token_inside_refresh_margin_is_expired() {
        let now = Utc::now().timestamp() as u64;
        assert!(TokenManager::new(token(now - 3400, 3600)).is_expired());
        // lifetimes shorter than the margin must not underflow
        assert!(TokenManager::new(token(now, 60)).is_expired());
    }
}
