//! # Reportmii Core Library
//!
//! This library provides the business logic of the Reportmii analysis wizard.
//! All operations are available through the standalone CLI binary; any other
//! front end is expected to be a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Catalog**: Fixed block/question templates for business and team analyses
//! - **Blocks & Answers**: The user's working block list and validated answers
//! - **Wizard**: A six-step state machine with guarded forward moves
//! - **Storage**: SQLite answer/session storage and TOML-based configuration
//! - **Integrations**: Checkout, notification and identity collaborators
//!
//! ## Key Components
//!
//! - [`WizardSession`]: One analysis and its step state
//! - [`AnalysisWizard`]: Drives a session against its collaborators
//! - [`AnalysisDb`]: Answer and session persistence
//! - [`Config`]: Application configuration management

pub mod answers;
pub mod blocks;
pub mod catalog;
pub mod error;
pub mod events;
pub mod integrations;
pub mod progress;
pub mod scoring;
pub mod storage;
pub mod wizard;

pub use answers::{AnswerStore, AnswerValue};
pub use blocks::{Block, BlockList, PricingPolicy};
pub use catalog::{get_catalog, BlockTemplate, CatalogKind, Question, QuestionKind};
pub use error::{ConfigError, CoreError, IntegrationError, StorageError, WizardError};
pub use events::Event;
pub use progress::{all_answered, block_progress, is_block_complete, progress, BlockProgress};
pub use scoring::{AnalysisReport, ScoreBucket};
pub use storage::{AnalysisDb, AnalysisSummary, AnswerPersistence, Config, MemoryStore};
pub use wizard::{Advance, AnalysisWizard, ReportDesign, Rejected, WizardSession, WizardStep};
