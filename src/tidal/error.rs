use thiserror::Error;

/// Errors raised while talking to the TIDAL API.
#[derive(Error, Debug)]
pub enum TidalError {
    /// Connection failures, timeouts and other transport problems.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("TIDAL returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// 429 Too Many Requests, with the advertised wait in seconds.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Authentication is missing, expired or was rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The response body could not be understood.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// No cached token; `mytracks auth` has not been run yet.
    #[error("Not authenticated, run `mytracks auth` first")]
    NotAuthenticated,
}

impl TidalError {
    /// Errors no retry or later item can recover from.
    pub fn is_auth(&self) -> bool {
        matches!(self, TidalError::Auth(_) | TidalError::NotAuthenticated)
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TidalError::Http(e) => e.is_timeout() || e.is_connect(),
            TidalError::Status { status, .. } => status.is_server_error(),
            TidalError::RateLimited { .. } => true,
            TidalError::Auth(_) | TidalError::Decode(_) | TidalError::NotAuthenticated => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TidalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn server_errors_and_rate_limits_are_transient() {
        let bad_gateway = TidalError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        };
        assert!(bad_gateway.is_transient());
        assert!(TidalError::RateLimited { retry_after: 3 }.is_transient());
    }

    #[test]
    fn client_errors_are_not_transient() {
        let not_found = TidalError::Status {
            status: StatusCode::NOT_FOUND,
            body: "gone".into(),
        };
        assert!(!not_found.is_transient());
        assert!(!TidalError::Auth("expired".into()).is_transient());
        assert_eq!(
            not_found.to_string(),
            "TIDAL returned 404 Not Found: gone"
        );
    }
}
