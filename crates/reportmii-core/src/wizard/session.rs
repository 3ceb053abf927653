//! One user's analysis wizard session.
//!
//! The session exclusively owns its block list and answer store. All methods
//! are synchronous and side-effect free apart from the session itself;
//! persistence and collaborators are driven by [`super::AnalysisWizard`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::step::{transition, GateContext, ReportDesign, Rejected, StepEvent, Transition, WizardStep};
use crate::answers::{AnswerStore, AnswerValue};
use crate::blocks::{BlockList, PricingPolicy};
use crate::catalog::{CatalogKind, Question};
use crate::error::WizardError;
use crate::events::Event;
use crate::progress::{all_answered, progress};

/// Step 1 fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Step 2 fields. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub employees: Option<u32>,
}

/// A checkout that was started but not yet reported as paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCheckout {
    /// Add-on blocks covered once this checkout is paid.
    pub paid_blocks: usize,
    /// Blocks billed by this checkout; earlier payments are not billed again.
    #[serde(default)]
    pub quantity: usize,
    pub amount: u64,
    pub url: Option<String>,
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    /// Add-on blocks already paid for.
    pub confirmed_blocks: usize,
    pub pending: Option<PendingCheckout>,
}

/// Result of an accepted step event together with the events it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub transition: Transition,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSession {
    analysis_id: String,
    owner: String,
    catalog: CatalogKind,
    step: WizardStep,
    basic: BasicInfo,
    company: CompanyInfo,
    blocks: BlockList,
    answers: AnswerStore,
    pricing: PricingPolicy,
    #[serde(default)]
    checkout: CheckoutState,
    design: Option<ReportDesign>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

impl WizardSession {
    /// Start a new analysis with a generated identifier.
    pub fn new(owner: impl Into<String>, catalog: CatalogKind, pricing: PricingPolicy) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), owner, catalog, pricing)
    }

    pub fn with_id(
        analysis_id: impl Into<String>,
        owner: impl Into<String>,
        catalog: CatalogKind,
        pricing: PricingPolicy,
    ) -> Self {
        Self::with_blocks(analysis_id, owner, catalog, BlockList::from_catalog(catalog), pricing)
    }

    /// Start an analysis over an explicit block list.
    pub fn with_blocks(
        analysis_id: impl Into<String>,
        owner: impl Into<String>,
        catalog: CatalogKind,
        blocks: BlockList,
        pricing: PricingPolicy,
    ) -> Self {
        let now = Utc::now();
        Self {
            analysis_id: analysis_id.into(),
            owner: owner.into(),
            catalog,
            step: WizardStep::BasicInfo,
            basic: BasicInfo::default(),
            company: CompanyInfo::default(),
            blocks,
            answers: AnswerStore::new(),
            pricing,
            checkout: CheckoutState::default(),
            design: None,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn analysis_id(&self) -> &str {
        &self.analysis_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn catalog(&self) -> CatalogKind {
        self.catalog
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn basic_info(&self) -> &BasicInfo {
        &self.basic
    }

    pub fn company_info(&self) -> &CompanyInfo {
        &self.company
    }

    pub fn blocks(&self) -> &BlockList {
        &self.blocks
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn pricing(&self) -> &PricingPolicy {
        &self.pricing
    }

    pub fn checkout(&self) -> &CheckoutState {
        &self.checkout
    }

    pub fn design(&self) -> Option<ReportDesign> {
        self.design
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// Completion percentage over active blocks.
    pub fn progress(&self) -> u8 {
        progress(self.blocks.active(), &self.answers)
    }

    pub fn paid_block_count(&self) -> usize {
        self.blocks.paid_block_count(&self.pricing)
    }

    pub fn total_addon_price(&self) -> u64 {
        self.blocks.total_addon_price(&self.pricing)
    }

    /// Add-on blocks not covered by a confirmed checkout.
    pub fn unpaid_block_count(&self) -> usize {
        self.paid_block_count()
            .saturating_sub(self.checkout.confirmed_blocks)
    }

    pub fn unpaid_addon_price(&self) -> u64 {
        self.pricing.price_of(self.unpaid_block_count())
    }

    pub fn gate_context(&self) -> GateContext {
        GateContext {
            has_name: !self.basic.name.trim().is_empty(),
            paid_blocks: self.paid_block_count(),
            confirmed_paid_blocks: self.checkout.confirmed_blocks,
            progress: self.progress(),
            all_answered: all_answered(self.blocks.active(), &self.answers),
            design_selected: self.design.is_some(),
        }
    }

    /// Whether a forward move from the current step would be accepted.
    pub fn can_advance(&self) -> bool {
        matches!(
            transition(self.step, StepEvent::Next, &self.gate_context()),
            Ok(Transition::Moved { .. })
        )
    }

    // ── Edits ────────────────────────────────────────────────────────

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.is_submitted() {
            return Err(WizardError::AlreadySubmitted(self.analysis_id.clone()));
        }
        Ok(())
    }

    /// Block edits change billing and the questionnaire, so they are only
    /// accepted up to block selection, whose gate re-checks both.
    fn ensure_blocks_editable(&self, action: &str) -> Result<(), WizardError> {
        self.ensure_editable()?;
        if self.step > WizardStep::BlockSelection {
            return Err(WizardError::WrongStep {
                action: action.to_string(),
                step: self.step,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn set_basic_info(&mut self, info: BasicInfo) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.basic = info;
        self.touch();
        Ok(())
    }

    pub fn set_company_info(&mut self, info: CompanyInfo) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.company = info;
        self.touch();
        Ok(())
    }

    pub fn select_design(&mut self, design: ReportDesign) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.design = Some(design);
        self.touch();
        Ok(())
    }

    /// Validate and store an answer in memory.
    pub fn record_answer(
        &mut self,
        block_id: &str,
        question_index: usize,
        value: AnswerValue,
    ) -> Result<Event, WizardError> {
        self.ensure_editable()?;
        let block = self
            .blocks
            .get(block_id)
            .ok_or_else(|| WizardError::UnknownBlock(block_id.to_string()))?;
        self.answers.set_answer(block, question_index, value)?;
        self.touch();

        let progress_pct = self.progress();
        debug!(analysis = %self.analysis_id, block = block_id, question = question_index, progress_pct, "answer recorded");
        Ok(Event::AnswerRecorded {
            analysis_id: self.analysis_id.clone(),
            block_id: block_id.to_string(),
            question_index,
            progress_pct,
            at: self.updated_at,
        })
    }

    /// Replace the answer store, e.g. with the persisted copy when resuming.
    pub fn replace_answers(&mut self, answers: AnswerStore) {
        self.answers = answers;
    }

    /// Switch a block on. Returns `None` when it already was active.
    pub fn activate_block(&mut self, block_id: &str) -> Result<Option<Event>, WizardError> {
        self.ensure_blocks_editable("activate a block")?;
        if !self.blocks.activate(block_id)? {
            return Ok(None);
        }
        self.touch();
        Ok(Some(Event::BlockActivated {
            block_id: block_id.to_string(),
            paid_blocks: self.paid_block_count(),
            at: self.updated_at,
        }))
    }

    /// Switch a block off. Its answers stay in the store.
    pub fn deactivate_block(&mut self, block_id: &str) -> Result<Option<Event>, WizardError> {
        self.ensure_blocks_editable("deactivate a block")?;
        if !self.blocks.deactivate(block_id)? {
            return Ok(None);
        }
        self.touch();
        Ok(Some(Event::BlockDeactivated {
            block_id: block_id.to_string(),
            paid_blocks: self.paid_block_count(),
            at: self.updated_at,
        }))
    }

    pub fn add_custom_block(
        &mut self,
        title: &str,
        questions: Vec<Question>,
    ) -> Result<Event, WizardError> {
        self.ensure_blocks_editable("add a block")?;
        let id = self.blocks.add_custom_block(title, questions)?;
        self.block_added(id)
    }

    pub fn add_custom_block_from_template(
        &mut self,
        title: &str,
        template_id: &str,
    ) -> Result<Event, WizardError> {
        self.ensure_blocks_editable("add a block")?;
        let id = self.blocks.add_custom_block_from_template(title, template_id)?;
        self.block_added(id)
    }

    fn block_added(&mut self, block_id: String) -> Result<Event, WizardError> {
        self.touch();
        let title = self
            .blocks
            .get(&block_id)
            .map(|b| b.title.clone())
            .unwrap_or_default();
        info!(analysis = %self.analysis_id, block = %block_id, %title, "custom block added");
        Ok(Event::BlockAdded {
            block_id,
            title,
            at: self.updated_at,
        })
    }

    /// Remove a custom block together with its answers.
    pub fn remove_custom_block(&mut self, block_id: &str) -> Result<Event, WizardError> {
        self.ensure_blocks_editable("remove a block")?;
        let removed = self.blocks.remove_custom_block(block_id)?;
        let dropped_answers = self.answers.remove_block(&removed.id);
        self.touch();
        info!(analysis = %self.analysis_id, block = block_id, dropped_answers, "custom block removed");
        Ok(Event::BlockRemoved {
            block_id: removed.id,
            dropped_answers,
            at: self.updated_at,
        })
    }

    pub fn move_block(&mut self, block_id: &str, new_index: usize) -> Result<Event, WizardError> {
        self.ensure_blocks_editable("move a block")?;
        let (from_index, to_index) = self.blocks.reorder(block_id, new_index)?;
        self.touch();
        Ok(Event::BlockMoved {
            block_id: block_id.to_string(),
            from_index,
            to_index,
            at: self.updated_at,
        })
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Try to move one step forward.
    ///
    /// A refused move leaves the session untouched. Leaving block selection
    /// with unpaid add-on blocks records a pending checkout instead of moving.
    /// Reaching `Finalize` submits the analysis.
    pub fn next(&mut self) -> Result<StepOutcome, Rejected> {
        let ctx = self.gate_context();
        let outcome = transition(self.step, StepEvent::Next, &ctx).inspect_err(|reason| {
            debug!(analysis = %self.analysis_id, step = ?self.step, %reason, "forward move refused");
        })?;

        let now = Utc::now();
        let mut events = Vec::new();
        match outcome {
            Transition::Moved { from, to } => {
                self.step = to;
                info!(analysis = %self.analysis_id, ?from, ?to, "step advanced");
                events.push(Event::StepAdvanced {
                    from,
                    to,
                    progress_marker: to.progress_marker(),
                    at: now,
                });
                if to.is_terminal() {
                    self.submitted_at = Some(now);
                    info!(analysis = %self.analysis_id, "analysis submitted");
                    events.push(Event::AnalysisSubmitted {
                        analysis_id: self.analysis_id.clone(),
                        owner: self.owner.clone(),
                        name: self.basic.name.clone(),
                        active_blocks: self.blocks.active_count(),
                        at: now,
                    });
                }
            }
            Transition::CheckoutRequired { paid_blocks } => {
                let quantity = self.unpaid_block_count();
                let amount = self.unpaid_addon_price();
                info!(analysis = %self.analysis_id, paid_blocks, quantity, amount, "checkout required");
                self.checkout.pending = Some(PendingCheckout {
                    paid_blocks,
                    quantity,
                    amount,
                    url: None,
                    requested_at: now,
                });
                events.push(Event::CheckoutRequired {
                    analysis_id: self.analysis_id.clone(),
                    paid_blocks,
                    quantity,
                    amount,
                    currency: self.pricing.currency.clone(),
                    at: now,
                });
            }
            Transition::Exit => {}
        }
        self.updated_at = now;
        Ok(StepOutcome {
            transition: outcome,
            events,
        })
    }

    /// Move one step back. From the first step this exits the wizard.
    pub fn back(&mut self) -> Result<StepOutcome, Rejected> {
        let outcome = transition(self.step, StepEvent::Back, &self.gate_context())?;
        let now = Utc::now();
        let event = match outcome {
            Transition::Moved { from, to } => {
                self.step = to;
                debug!(analysis = %self.analysis_id, ?from, ?to, "step reverted");
                Event::StepReverted { from, to, at: now }
            }
            _ => {
                info!(analysis = %self.analysis_id, "wizard exited");
                Event::WizardExited {
                    analysis_id: self.analysis_id.clone(),
                    at: now,
                }
            }
        };
        self.updated_at = now;
        Ok(StepOutcome {
            transition: outcome,
            events: vec![event],
        })
    }

    /// Remember where the pending checkout redirects to.
    pub fn attach_checkout_url(&mut self, url: impl Into<String>) {
        if let Some(pending) = self.checkout.pending.as_mut() {
            pending.url = Some(url.into());
        }
    }

    /// Record that the checkout collaborator reported a successful payment.
    ///
    /// # Errors
    /// Returns [`WizardError::InvalidValue`] when no checkout is pending.
    pub fn confirm_checkout(&mut self) -> Result<Event, WizardError> {
        self.ensure_editable()?;
        let pending = self.checkout.pending.take().ok_or_else(|| WizardError::InvalidValue {
            field: "checkout".to_string(),
            message: "no checkout is pending".to_string(),
        })?;
        self.checkout.confirmed_blocks = self.checkout.confirmed_blocks.max(pending.paid_blocks);
        self.touch();
        info!(analysis = %self.analysis_id, paid_blocks = pending.paid_blocks, "checkout confirmed");
        Ok(Event::CheckoutConfirmed {
            analysis_id: self.analysis_id.clone(),
            paid_blocks: pending.paid_blocks,
            at: self.updated_at,
        })
    }
}
