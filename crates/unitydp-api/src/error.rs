use thiserror::Error;

/// Top-level error type for the `unitydp-api` crate.
///
/// Covers every failure mode across the client: authentication and
/// session handling, HTTP transport, the card's string protocol, and
/// point resolution. Embedding applications map these into their own
/// response codes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed, or the card rejected the current session token.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The card answered with something the wire codec cannot use
    /// (non-200 status, malformed body).
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    // ── Points ──────────────────────────────────────────────────────
    /// Attribute name not present in the subsystem's point registry.
    #[error("Unknown attribute: {name}")]
    UnknownAttribute { name: String },

    /// A point write failed. Writes go out one POST per point; points
    /// already written before this one are not rolled back.
    #[error("Write to point {point} failed: {source}")]
    Write {
        point: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this error indicates the session is invalid
    /// and re-authentication might resolve it.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Write { source, .. } => source.is_transient(),
            _ => false,
        }
    }

    /// Returns `true` if this is an unknown-attribute lookup failure.
    pub fn is_unknown_attribute(&self) -> bool {
        matches!(self, Self::UnknownAttribute { .. })
    }
}
