//! Pre-flight compatibility gate.
//!
//! Two probes, combined by priority: the capability probe runs first and,
//! if it fails, the conflict probe is never consulted. Any verdict other
//! than [`Verdict::Ok`] is fatal for the activation.

use crate::{Error, Result};

/// Outcome of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The feature may run.
    Ok,
    /// The host must be restarted to enable a required capability.
    RestartRequired,
    /// A functionally overlapping extension is active.
    ConflictingFeatureActive {
        /// Identifier of the conflicting extension.
        extension: String,
    },
}

impl Verdict {
    /// Remediation actions offered for this verdict.
    pub fn remediations(&self) -> &'static [Remediation] {
        match self {
            Self::Ok => &[],
            Self::RestartRequired => &[Remediation::Restart, Remediation::ViewLogs],
            Self::ConflictingFeatureActive { .. } => {
                &[Remediation::ReloadWindow, Remediation::ViewLogs]
            }
        }
    }

    /// Message surfaced to the user along with the remediations.
    pub fn message(&self) -> String {
        match self {
            Self::Ok => String::new(),
            Self::RestartRequired => {
                "oopilot: Please restart the editor to apply the latest updates".into()
            }
            Self::ConflictingFeatureActive { extension } => format!(
                "To ensure oopilot functions correctly, kindly disable {extension} and reload the window"
            ),
        }
    }
}

/// A user-actionable way out of a failed gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    Restart,
    ReloadWindow,
    ViewLogs,
}

impl Remediation {
    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Restart => "Restart",
            Self::ReloadWindow => "Reload Window",
            Self::ViewLogs => "View Logs",
        }
    }
}

/// Host environment probed by the gate.
pub trait Environment: Send + Sync {
    /// Attempt a host call that needs the opt-in capability. An error means
    /// the capability is unavailable.
    fn probe_capability(&self) -> impl Future<Output = anyhow::Result<()>> + Send;

    /// Identifier of the conflicting extension, if it is installed.
    fn conflicting_extension(&self) -> Option<String>;

    /// Surface `verdict` to the user with `options` and carry out the
    /// chosen one.
    fn offer_remediation(
        &self,
        verdict: &Verdict,
        options: &[Remediation],
    ) -> impl Future<Output = ()> + Send;
}

/// Run both probes in priority order.
pub async fn evaluate<E: Environment>(env: &E) -> Verdict {
    if let Err(e) = env.probe_capability().await {
        tracing::error!("proposed API disabled: {e:#}");
        tracing::warn!("proposed API is disabled, restart required");
        return Verdict::RestartRequired;
    }

    match env.conflicting_extension() {
        Some(extension) => {
            tracing::warn!("{extension} is active");
            Verdict::ConflictingFeatureActive { extension }
        }
        None => Verdict::Ok,
    }
}

/// Evaluate the gate and halt on anything but [`Verdict::Ok`].
///
/// A failed verdict is surfaced through [`Environment::offer_remediation`]
/// before the fatal error is returned.
pub async fn enforce<E: Environment>(env: &E) -> Result<()> {
    let verdict = evaluate(env).await;
    let err = match &verdict {
        Verdict::Ok => {
            tracing::info!("compatibility check passed");
            return Ok(());
        }
        Verdict::RestartRequired => Error::RestartRequired,
        Verdict::ConflictingFeatureActive { extension } => {
            Error::ConflictingFeature(extension.clone())
        }
    };

    env.offer_remediation(&verdict, verdict.remediations()).await;
    Err(err)
}
