mod config;
pub mod database;
pub mod memory;

pub use config::{CheckoutConfig, Config, NotificationsConfig, PricingConfig};
pub use database::{AnalysisDb, AnalysisSummary};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::answers::AnswerStore;
use crate::error::StorageError;

/// Durable per-analysis answer storage.
///
/// Keys are `(owner, analysis_id)`; saving then loading the same key must
/// reproduce an equal [`AnswerStore`].
pub trait AnswerPersistence {
    fn load(&self, owner: &str, analysis_id: &str) -> Result<Option<AnswerStore>, StorageError>;

    fn save(&self, owner: &str, analysis_id: &str, store: &AnswerStore) -> Result<(), StorageError>;
}

/// Returns `~/.config/reportmii[-dev]/` based on REPORTMII_ENV.
///
/// Set REPORTMII_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("REPORTMII_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("reportmii-dev")
    } else {
        base_dir.join("reportmii")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
