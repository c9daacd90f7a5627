//! Invocation executor.

use ocore::{Backend, CompletionRequest, Endpoint, Error, InvocationRequest, Result};

/// Run one fill-in-middle completion of `model` at `endpoint`.
///
/// The transport future is raced against `request.cancel`; on cancellation
/// it is dropped, which aborts the call, and `InvocationCancelled` is
/// returned. Transport failures are returned as-is, without retry. The
/// first choice's text is returned verbatim.
pub async fn invoke<B: Backend>(
    backend: &B,
    endpoint: &Endpoint,
    model: &str,
    request: InvocationRequest,
) -> Result<String> {
    let body = CompletionRequest::from_invocation(model, &request);
    let completion = tokio::select! {
        biased;
        _ = request.cancel.cancelled() => {
            tracing::debug!("invocation of {model} cancelled");
            return Err(Error::InvocationCancelled);
        }
        completion = backend.complete(endpoint, &body) => completion?,
    };

    let text = completion
        .first_text()
        .ok_or_else(|| Error::transport(anyhow::anyhow!("completion returned no choices")))?;
    tracing::debug!("model output: {}...", preview(&text));
    Ok(text)
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(50) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn preview_truncates_on_char_boundary() {
        let text = "é".repeat(60);
        assert_eq!(preview(&text).chars().count(), 50);
        assert_eq!(preview("short"), "short");
    }
}
