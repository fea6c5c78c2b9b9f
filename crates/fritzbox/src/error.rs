/// Errors from the router collaborator.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The router answered with a non-success status code.
    #[error("Router API error ({status}): {body}")]
    Api {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body was not the JSON shape we expect.
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Login rejected for user {username}")]
    LoginRejected { username: String },

    /// Too many failed logins; the router refuses attempts for a while.
    #[error("Login blocked by router for {seconds}s")]
    LoginBlocked { seconds: u32 },

    #[error("Unsupported login challenge: {0}")]
    UnsupportedChallenge(String),

    #[error("Malformed session info: {0}")]
    MalformedSession(String),

    /// A REST call was made before a successful `connect()`.
    #[error("Not connected to router")]
    NotConnected,
}
