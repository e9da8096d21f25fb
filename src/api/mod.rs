//! # API Module
//!
//! Endpoints of the short-lived local server started by `mytracks auth`.
//!
//! - [`callback`] - receives the authorization code from the TIDAL login page
//!   and exchanges it for a token using the stored PKCE verifier
//! - [`health`] - reports that the server is up, with the crate version

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
