//! Errors surfaced by the client crate on top of [`ApiError`].

use aventura_core::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A remote call failed; see [`ApiError`] for the taxonomy.
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Configuration is invalid or a transport could not be built.
    #[error("config error: {0}")]
    Config(String),

    /// The operation acts as the current user and nobody is logged in.
    #[error("no user is logged in")]
    NotLoggedIn,

    /// The user service answered 2xx without a user; carries its message.
    #[error("authentication returned no user: {0}")]
    MissingUser(String),
}

/// Failures writing or clearing the persisted session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("session encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
