/// Best-effort side effects
///
/// Notifications and account propagation run after the primary write has
/// committed. Their failure is logged at `warn` and reported back as an
/// [`EffectOutcome`]; it never turns into an error response. The client
/// only ever sees the fixed reason of the [`Effect`] that failed, never the
/// collaborator's own error text.

use serde::Serialize;

use crate::mail::{Delivery, EmailMessage, Mailer};

/// The kinds of follow-up work that may fail without failing the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Delivery,
    AccountSync,
    AccountRemoval,
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Effect::Delivery => "email_delivery",
            Effect::AccountSync => "sync_volunteer_account",
            Effect::AccountRemoval => "remove_volunteer_account",
        }
    }

    /// Reason reported to the client
    pub fn failure_reason(&self) -> &'static str {
        match self {
            Effect::Delivery => "delivery failed",
            Effect::AccountSync => "account sync failed",
            Effect::AccountRemoval => "account removal failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum EffectOutcome {
    Delivered,
    Skipped,
    Failed(&'static str),
}

impl EffectOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, EffectOutcome::Failed(_))
    }

    /// Collapses a fallible effect; the error itself only reaches the log
    pub fn from_result<T, E: std::fmt::Display>(effect: Effect, result: Result<T, E>) -> Self {
        match result {
            Ok(_) => EffectOutcome::Delivered,
            Err(e) => {
                tracing::warn!(effect = effect.name(), error = %e, "Best-effort step failed");
                EffectOutcome::Failed(effect.failure_reason())
            }
        }
    }
}

/// Sends `message`, swallowing any failure
pub async fn notify(mailer: &dyn Mailer, to: &str, message: &EmailMessage) -> EffectOutcome {
    match mailer.send(to, message).await {
        Ok(Delivery::Sent { .. }) => EffectOutcome::Delivered,
        Ok(Delivery::Skipped) => EffectOutcome::Skipped,
        Err(e) => {
            tracing::warn!(to = %to, subject = %message.subject, error = %e, "Email delivery failed");
            EffectOutcome::Failed(Effect::Delivery.failure_reason())
        }
    }
}
