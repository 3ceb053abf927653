pub mod checkout;
pub mod identity;
pub mod traits;
pub mod webhook;

pub use checkout::HostedCheckout;
pub use identity::{resolve_owner, EnvIdentity, StaticIdentity};
pub use traits::{CheckoutProvider, CheckoutSession, IdentityProvider, Notifier, NoopNotifier};
pub use webhook::WebhookNotifier;
