//! Invocation request (fill-in-middle).

use tokio_util::sync::CancellationToken;

/// A single completion request against a configured provider.
///
/// Built fresh per call and consumed by `Provider::invoke`. Cancelling
/// `cancel` aborts the in-flight network call.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Text before the cursor.
    pub prefix: String,
    /// Text after the cursor.
    pub suffix: String,
    /// Generation budget in tokens.
    pub max_tokens: u32,
    /// Sequences that halt generation.
    pub stop: Option<Vec<String>>,
    /// Sampling temperature, backend default when unset.
    pub temperature: Option<f32>,
    /// Cancellation handle observed by the transport.
    pub cancel: CancellationToken,
}

impl InvocationRequest {
    /// Create a request with a 128 token budget and a fresh cancellation
    /// handle.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            max_tokens: 128,
            stop: None,
            temperature: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the generation budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the stop sequences.
    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Use the caller's cancellation handle.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}
