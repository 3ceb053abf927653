//! The six-step analysis wizard.
//!
//! [`step`] holds the pure transition rules, [`WizardSession`] applies them to
//! one analysis, and [`AnalysisWizard`] wires a session to persistence,
//! checkout and notification.

mod service;
mod session;
mod step;

pub use service::{Advance, AnalysisWizard};
pub use session::{BasicInfo, CheckoutState, CompanyInfo, PendingCheckout, StepOutcome, WizardSession};
pub use step::{transition, GateContext, ReportDesign, Rejected, StepEvent, Transition, WizardStep};
