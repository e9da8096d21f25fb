use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    config,
    server::start_api_server,
    types::{PkceToken, SessionInfo, Token},
    utils, warning,
};

use super::{
    client::ensure_success,
    error::{Result, TidalError},
};

/// How long `auth` waits for the browser to come back to the callback server.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

impl TokenResponse {
    /// Refresh responses may omit the refresh token; the old one stays valid then.
    fn into_token(self, previous_refresh_token: Option<&str>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string))
                .unwrap_or_default(),
            scope: self.scope.unwrap_or_default(),
            expires_in: self.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Runs the OAuth 2.0 authorization code flow with PKCE.
///
/// Starts the local callback server, opens the login page in the browser and
/// waits until the callback handler stored a token in `shared_state`.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<Token> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let auth_url = authorization_url(&code_challenge)?;

    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    wait_for_token(shared_state)
        .await
        .ok_or_else(|| TidalError::Auth("no callback received before timeout".into()))
}

/// Login page URL carrying the PKCE challenge.
pub fn authorization_url(code_challenge: &str) -> Result<Url> {
    let client_id = config::tidal_client_id().map_err(TidalError::Auth)?;
    let redirect_uri = config::tidal_redirect_uri();
    let scope = config::tidal_scope();

    Url::parse_with_params(
        &config::tidal_auth_url(),
        &[
            ("client_id", client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", scope.as_str()),
        ],
    )
    .map_err(|e| TidalError::Auth(format!("invalid authorization URL: {}", e)))
}

async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

fn client_form<'a>(
    client_id: &'a str,
    client_secret: Option<&'a str>,
    mut form: Vec<(&'a str, &'a str)>,
) -> Vec<(&'a str, &'a str)> {
    form.push(("client_id", client_id));
    if let Some(secret) = client_secret {
        form.push(("client_secret", secret));
    }
    form
}

async fn request_token(form: &[(&str, &str)], previous_refresh_token: Option<&str>) -> Result<Token> {
    let response = Client::new()
        .post(config::tidal_token_url())
        .form(form)
        .send()
        .await?;

    let response = ensure_success(response).await.map_err(|e| match e {
        TidalError::Status { status, body } if status.is_client_error() => {
            TidalError::Auth(format!("{}: {}", status, body))
        }
        other => other,
    })?;

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| TidalError::Decode(e.to_string()))?;

    Ok(body.into_token(previous_refresh_token))
}

/// Trades a refresh token for a new access token.
pub async fn refresh_token(refresh_token: &str) -> Result<Token> {
    let client_id = config::tidal_client_id().map_err(TidalError::Auth)?;
    let client_secret = config::tidal_client_secret();

    let form = client_form(
        &client_id,
        client_secret.as_deref(),
        vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    );

    request_token(&form, Some(refresh_token)).await
}

/// Exchanges the authorization code from the callback for a token.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token> {
    let client_id = config::tidal_client_id().map_err(TidalError::Auth)?;
    let client_secret = config::tidal_client_secret();
    let redirect_uri = config::tidal_redirect_uri();

    let form = client_form(
        &client_id,
        client_secret.as_deref(),
        vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ],
    );

    request_token(&form, None).await
}

/// Resolves the user id and country code the access token belongs to.
pub async fn fetch_session(client: &Client, api_url: &str, access_token: &str) -> Result<SessionInfo> {
    log::debug!("GET {}/sessions", api_url);

    let response = client
        .get(format!("{}/sessions", api_url))
        .bearer_auth(access_token)
        .send()
        .await?;

    ensure_success(response)
        .await?
        .json::<SessionInfo>()
        .await
        .map_err(|e| TidalError::Decode(e.to_string()))
}
