use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wizard::WizardStep;

/// Every state change of an analysis session produces an Event.
/// The UI polls for events; the notifier receives the submission event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        analysis_id: String,
        catalog: String,
        at: DateTime<Utc>,
    },
    AnswerRecorded {
        analysis_id: String,
        block_id: String,
        question_index: usize,
        progress_pct: u8,
        at: DateTime<Utc>,
    },
    BlockActivated {
        block_id: String,
        paid_blocks: usize,
        at: DateTime<Utc>,
    },
    BlockDeactivated {
        block_id: String,
        paid_blocks: usize,
        at: DateTime<Utc>,
    },
    BlockAdded {
        block_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    BlockRemoved {
        block_id: String,
        dropped_answers: usize,
        at: DateTime<Utc>,
    },
    BlockMoved {
        block_id: String,
        from_index: usize,
        to_index: usize,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from: WizardStep,
        to: WizardStep,
        progress_marker: u8,
        at: DateTime<Utc>,
    },
    StepReverted {
        from: WizardStep,
        to: WizardStep,
        at: DateTime<Utc>,
    },
    /// Leaving block selection needs payment for add-on blocks first.
    CheckoutRequired {
        analysis_id: String,
        /// Add-on blocks covered once this checkout is paid.
        paid_blocks: usize,
        /// Blocks billed by this checkout.
        quantity: usize,
        amount: u64,
        currency: String,
        at: DateTime<Utc>,
    },
    CheckoutConfirmed {
        analysis_id: String,
        paid_blocks: usize,
        at: DateTime<Utc>,
    },
    /// User went back from the first step and left the wizard.
    WizardExited {
        analysis_id: String,
        at: DateTime<Utc>,
    },
    AnalysisSubmitted {
        analysis_id: String,
        owner: String,
        name: String,
        active_blocks: usize,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-readable name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "SessionStarted",
            Event::AnswerRecorded { .. } => "AnswerRecorded",
            Event::BlockActivated { .. } => "BlockActivated",
            Event::BlockDeactivated { .. } => "BlockDeactivated",
            Event::BlockAdded { .. } => "BlockAdded",
            Event::BlockRemoved { .. } => "BlockRemoved",
            Event::BlockMoved { .. } => "BlockMoved",
            Event::StepAdvanced { .. } => "StepAdvanced",
            Event::StepReverted { .. } => "StepReverted",
            Event::CheckoutRequired { .. } => "CheckoutRequired",
            Event::CheckoutConfirmed { .. } => "CheckoutConfirmed",
            Event::WizardExited { .. } => "WizardExited",
            Event::AnalysisSubmitted { .. } => "AnalysisSubmitted",
        }
    }
}
