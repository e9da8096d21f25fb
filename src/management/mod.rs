mod auth;
mod log;

pub use auth::TokenManager;
pub use log::ResultLog;
