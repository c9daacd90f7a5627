//! Error taxonomy shared by every stage of the pipeline.

/// Result alias over [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by configuration, invocation and activation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An interactive step was aborted by the user.
    #[error("user cancelled {0}")]
    UserCancelled(String),

    /// A collected value is empty or malformed.
    #[error("{field}: {reason}")]
    ValidationFailed {
        /// Human-readable name of the offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// No record is stored under the requested nickname.
    #[error("provider configuration not found for {0}")]
    ConfigNotFound(String),

    /// The stored record belongs to a different provider variant.
    #[error("provider configuration for {nickname} is {found}, expected {expected}")]
    ConfigMismatch {
        /// Nickname that was looked up.
        nickname: String,
        /// Provider id the caller asked for.
        expected: &'static str,
        /// Provider id found in the record.
        found: &'static str,
    },

    /// No variant is registered under the given provider id.
    #[error("unknown provider id {0}")]
    UnknownProvider(String),

    /// Model discovery returned an empty list.
    #[error("no models found for the given configuration")]
    NoModelsAvailable,

    /// The live test completion during configuration failed.
    #[error("connection credentials test failed: {0}")]
    CredentialTestFailed(#[source] Box<Error>),

    /// Network or backend failure.
    #[error("transport error: {0}")]
    Transport(#[source] anyhow::Error),

    /// The caller cancelled an in-flight invocation.
    #[error("invocation cancelled")]
    InvocationCancelled,

    /// The host lacks a required capability until it is restarted.
    #[error("restart required to enable the proposed host API")]
    RestartRequired,

    /// A functionally overlapping extension is active.
    #[error("{0} is active and needs to be disabled")]
    ConflictingFeature(String),

    /// The config store failed to read or write.
    #[error("config store: {0}")]
    Store(#[source] anyhow::Error),
}

impl Error {
    /// Wrap any error as a transport failure.
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }

    /// Wrap any error as a store failure.
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        Self::Store(err.into())
    }

    /// Whether this error was caused by the user backing out.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserCancelled(_) | Self::InvocationCancelled)
    }
}
