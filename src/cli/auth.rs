use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config, error, info, management::TokenManager, success, tidal, types::PkceToken, warning};

pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    if let Err(e) = config::tidal_client_id() {
        error!("{}. Add it to {}", e, config::data_dir().join(".env").display());
    }

    info!("Waiting for the TIDAL login to complete in your browser...");
    let token = match tidal::auth::auth(shared_state).await {
        Ok(token) => token,
        Err(e) => error!("Authentication failed: {}", e),
    };

    let token_manager = TokenManager::new(token);
    if let Err(e) = token_manager.persist().await {
        error!("Failed to save token to cache: {}", e);
    }

    match tidal::auth::fetch_session(
        &Client::new(),
        &config::tidal_api_url(),
        &token_manager.current_token().access_token,
    )
    .await
    {
        Ok(session) => success!(
            "Authentication successful! Signed in as user {} ({})",
            session.user_id,
            session.country_code
        ),
        Err(e) => {
            success!("Authentication successful!");
            warning!("Could not read the session yet: {}", e);
        }
    }
}
