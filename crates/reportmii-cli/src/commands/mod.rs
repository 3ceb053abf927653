pub mod analysis;
pub mod answer;
pub mod block;
pub mod catalog;
pub mod checkout;
pub mod completions;
pub mod config;
pub mod report;

use reportmii_core::integrations::{
    resolve_owner, EnvIdentity, HostedCheckout, Notifier, NoopNotifier, StaticIdentity, WebhookNotifier,
};
use reportmii_core::{AnalysisDb, Config, Event, StorageError, WizardSession};
use tracing::debug;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Storage, configuration and identity shared by the analysis commands.
pub struct Context {
    pub db: AnalysisDb,
    pub config: Config,
    pub owner: String,
}

impl Context {
    pub fn open(user: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let owner = match user {
            Some(user) => resolve_owner(&StaticIdentity(user.to_string())),
            None => resolve_owner(&EnvIdentity),
        };
        debug!(%owner, "opening analysis store");
        Ok(Self {
            db: AnalysisDb::open()?,
            config: Config::load()?,
            owner,
        })
    }

    pub fn load(&self, id: &str) -> Result<WizardSession, StorageError> {
        self.db
            .load_session(&self.owner, id)?
            .ok_or_else(|| StorageError::NotFound(format!("analysis {id}")))
    }

    pub fn save(&self, session: &WizardSession) -> Result<(), StorageError> {
        self.db.save_session(session)
    }

    pub fn checkout(&self) -> Result<HostedCheckout, Box<dyn std::error::Error>> {
        Ok(HostedCheckout::new(&self.config.checkout.base_url)?)
    }

    /// Webhook notifier when notifications are enabled and configured.
    pub fn notifier(&self) -> Result<Box<dyn Notifier>, Box<dyn std::error::Error>> {
        let notifications = &self.config.notifications;
        match (&notifications.webhook_url, notifications.enabled) {
            (Some(url), true) => Ok(Box::new(WebhookNotifier::new(url.clone())?)),
            _ => Ok(Box::new(NoopNotifier)),
        }
    }
}

/// Trace wizard events; visible with `RUST_LOG=debug`.
pub fn log_events(events: &[Event]) {
    for event in events {
        debug!(event = event.name(), payload = ?event, "wizard event");
    }
}
