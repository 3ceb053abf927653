//! Wizard steps and the pure transition function.
//!
//! ## State Transitions
//!
//! ```text
//! BasicInfo -> CompanyInfo -> BlockSelection -> Questionnaire -> DesignChoice -> Finalize
//! ```
//!
//! Forward moves are guarded by the current step's completion rule. Backward
//! moves are unguarded, one step at a time; going back from `BasicInfo` exits
//! the wizard. `Finalize` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WizardError;

/// Number of steps the user interacts with before `Finalize`.
const INTERACTIVE_STEPS: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    BasicInfo,
    CompanyInfo,
    BlockSelection,
    Questionnaire,
    DesignChoice,
    Finalize,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::BasicInfo,
        WizardStep::CompanyInfo,
        WizardStep::BlockSelection,
        WizardStep::Questionnaire,
        WizardStep::DesignChoice,
        WizardStep::Finalize,
    ];

    /// 1-based position in the wizard.
    pub fn index(&self) -> u8 {
        match self {
            WizardStep::BasicInfo => 1,
            WizardStep::CompanyInfo => 2,
            WizardStep::BlockSelection => 3,
            WizardStep::Questionnaire => 4,
            WizardStep::DesignChoice => 5,
            WizardStep::Finalize => 6,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index).checked_sub(1)?).copied()
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        Self::from_index(self.index() - 1)
    }

    pub fn is_terminal(&self) -> bool {
        *self == WizardStep::Finalize
    }

    /// Progress bar position for the step: 20, 40, 60, 80, 100, and 100 at `Finalize`.
    pub fn progress_marker(&self) -> u8 {
        (u16::from(self.index()) * 100 / INTERACTIVE_STEPS).min(100) as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic information",
            WizardStep::CompanyInfo => "Company information",
            WizardStep::BlockSelection => "Block selection",
            WizardStep::Questionnaire => "Questionnaire",
            WizardStep::DesignChoice => "Report design",
            WizardStep::Finalize => "Finalize",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.index(), Self::ALL.len(), self.label())
    }
}

/// Visual style of the generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportDesign {
    Classic,
    Modern,
    Compact,
}

impl fmt::Display for ReportDesign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportDesign::Classic => write!(f, "classic"),
            ReportDesign::Modern => write!(f, "modern"),
            ReportDesign::Compact => write!(f, "compact"),
        }
    }
}

impl FromStr for ReportDesign {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(ReportDesign::Classic),
            "modern" => Ok(ReportDesign::Modern),
            "compact" => Ok(ReportDesign::Compact),
            other => Err(WizardError::InvalidValue {
                field: "design".to_string(),
                message: format!("unknown design '{other}' (expected classic, modern or compact)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Next,
    Back,
}

/// Facts the guards look at, captured from a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateContext {
    pub has_name: bool,
    pub paid_blocks: usize,
    /// Add-on blocks already paid for through checkout.
    pub confirmed_paid_blocks: usize,
    /// Display percentage; the gates look at `all_answered`.
    pub progress: u8,
    /// Every question of every active block has a valid answer.
    pub all_answered: bool,
    pub design_selected: bool,
}

impl GateContext {
    fn unpaid_blocks(&self) -> usize {
        self.paid_blocks.saturating_sub(self.confirmed_paid_blocks)
    }
}

/// Outcome of an accepted step event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Moved { from: WizardStep, to: WizardStep },
    /// Stay on block selection until the add-on blocks are paid for.
    CheckoutRequired { paid_blocks: usize },
    /// Back from the first step: leave the wizard.
    Exit,
}

/// Why a step event was refused. Refusals change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejected {
    MissingName,
    IncompleteQuestionnaire { progress: u8 },
    NoDesignSelected,
    /// Add-on blocks were activated after checkout and are not paid for.
    UnpaidBlocks { unpaid: usize },
    /// The analysis is finalized.
    Submitted,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::MissingName => write!(f, "the analysis needs a name"),
            Rejected::IncompleteQuestionnaire { progress } => {
                write!(f, "questionnaire is {progress}% complete, all questions must be answered")
            }
            Rejected::NoDesignSelected => write!(f, "choose a report design first"),
            Rejected::UnpaidBlocks { unpaid } => {
                write!(f, "{unpaid} add-on block(s) still need to be paid for")
            }
            Rejected::Submitted => write!(f, "the analysis was already submitted"),
        }
    }
}

/// Apply `event` to `step`.
pub fn transition(
    step: WizardStep,
    event: StepEvent,
    ctx: &GateContext,
) -> Result<Transition, Rejected> {
    match event {
        StepEvent::Back => match step {
            WizardStep::Finalize => Err(Rejected::Submitted),
            WizardStep::BasicInfo => Ok(Transition::Exit),
            _ => Ok(Transition::Moved {
                from: step,
                to: step.previous().unwrap_or(WizardStep::BasicInfo),
            }),
        },
        StepEvent::Next => {
            match step {
                WizardStep::BasicInfo if !ctx.has_name => return Err(Rejected::MissingName),
                WizardStep::BlockSelection if ctx.unpaid_blocks() > 0 => {
                    return Ok(Transition::CheckoutRequired {
                        paid_blocks: ctx.paid_blocks,
                    })
                }
                WizardStep::Questionnaire | WizardStep::DesignChoice if ctx.unpaid_blocks() > 0 => {
                    return Err(Rejected::UnpaidBlocks {
                        unpaid: ctx.unpaid_blocks(),
                    })
                }
                WizardStep::Questionnaire | WizardStep::DesignChoice if !ctx.all_answered => {
                    return Err(Rejected::IncompleteQuestionnaire {
                        progress: ctx.progress,
                    })
                }
                WizardStep::DesignChoice if !ctx.design_selected => {
                    return Err(Rejected::NoDesignSelected)
                }
                _ => {}
            }
            step.next()
                .map(|to| Transition::Moved { from: step, to })
                .ok_or(Rejected::Submitted)
        }
    }
}
