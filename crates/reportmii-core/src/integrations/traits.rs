use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;
use crate::events::Event;

/// Redirect target for paying add-on blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
    /// Add-on blocks billed by this checkout.
    pub quantity: usize,
    pub amount: u64,
    pub currency: String,
}

/// Hosted payment page for add-on blocks.
///
/// The wizard stays on block selection until the caller reports the payment
/// back through [`crate::wizard::AnalysisWizard::confirm_checkout`].
pub trait CheckoutProvider: Send + Sync {
    /// Unique identifier (e.g. "hosted").
    fn name(&self) -> &str;

    fn create_checkout(
        &self,
        analysis_id: &str,
        quantity: usize,
        amount: u64,
        currency: &str,
    ) -> Result<CheckoutSession, IntegrationError>;
}

/// Receives wizard events. Delivery is best effort.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn notify(&self, event: &Event) -> Result<(), IntegrationError>;
}

/// Supplies the current user's identity, used to namespace stored analyses.
/// The value is opaque to the core and never validated.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<String>;
}

/// Notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    fn notify(&self, _event: &Event) -> Result<(), IntegrationError> {
        Ok(()) // default no-op
    }
}
