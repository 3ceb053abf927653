//! Drives a [`WizardSession`] against its external collaborators.
//!
//! Answer writes are persisted before the call returns. Leaving block
//! selection with unpaid add-on blocks opens a checkout. Reaching `Finalize`
//! sends the submission event to the notifier on a best-effort basis.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::session::{StepOutcome, WizardSession};
use super::step::{Rejected, Transition, WizardStep};
use crate::answers::AnswerValue;
use crate::blocks::PricingPolicy;
use crate::catalog::CatalogKind;
use crate::error::Result;
use crate::events::Event;
use crate::integrations::{CheckoutProvider, CheckoutSession, Notifier};
use crate::storage::AnswerPersistence;

/// What happened when the user pressed "next" or "back".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Advance {
    Moved { to: WizardStep, events: Vec<Event> },
    /// Payment is needed before the questionnaire opens.
    Checkout { checkout: CheckoutSession, events: Vec<Event> },
    Exited { events: Vec<Event> },
    Refused { reason: Rejected },
}

impl Advance {
    pub fn events(&self) -> &[Event] {
        match self {
            Advance::Moved { events, .. }
            | Advance::Checkout { events, .. }
            | Advance::Exited { events } => events,
            Advance::Refused { .. } => &[],
        }
    }
}

pub struct AnalysisWizard<'a> {
    persistence: &'a dyn AnswerPersistence,
    checkout: &'a dyn CheckoutProvider,
    notifier: &'a dyn Notifier,
}

impl<'a> AnalysisWizard<'a> {
    pub fn new(
        persistence: &'a dyn AnswerPersistence,
        checkout: &'a dyn CheckoutProvider,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            persistence,
            checkout,
            notifier,
        }
    }

    /// Start a new analysis and persist its (empty) answer store.
    pub fn start(
        &self,
        owner: &str,
        catalog: CatalogKind,
        pricing: PricingPolicy,
    ) -> Result<(WizardSession, Event)> {
        let session = WizardSession::new(owner, catalog, pricing);
        self.save_answers(&session)?;
        info!(analysis = %session.analysis_id(), owner, %catalog, "analysis started");
        let event = Event::SessionStarted {
            analysis_id: session.analysis_id().to_string(),
            catalog: catalog.to_string(),
            at: session.created_at(),
        };
        Ok((session, event))
    }

    /// Reload the persisted answers into `session`. Returns whether any were stored.
    pub fn resume(&self, session: &mut WizardSession) -> Result<bool> {
        match self.persistence.load(session.owner(), session.analysis_id())? {
            Some(answers) => {
                session.replace_answers(answers);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Record an answer and write the store through.
    ///
    /// # Errors
    /// Invalid answers are rejected without touching the session. If only the
    /// write fails, the answer stays recorded in memory and
    /// [`Self::save_answers`] can be retried.
    pub fn answer(
        &self,
        session: &mut WizardSession,
        block_id: &str,
        question_index: usize,
        value: AnswerValue,
    ) -> Result<Event> {
        let event = session.record_answer(block_id, question_index, value)?;
        self.save_answers(session)?;
        Ok(event)
    }

    /// Remove a custom block and persist the pruned answer store.
    pub fn remove_custom_block(&self, session: &mut WizardSession, block_id: &str) -> Result<Event> {
        let event = session.remove_custom_block(block_id)?;
        self.save_answers(session)?;
        Ok(event)
    }

    pub fn save_answers(&self, session: &WizardSession) -> Result<()> {
        self.persistence
            .save(session.owner(), session.analysis_id(), session.answers())?;
        Ok(())
    }

    /// Move forward one step, opening a checkout or submitting as needed.
    pub fn advance(&self, session: &mut WizardSession) -> Result<Advance> {
        let StepOutcome { transition, events } = match session.next() {
            Ok(outcome) => outcome,
            Err(reason) => return Ok(Advance::Refused { reason }),
        };

        match transition {
            Transition::Moved { to, .. } => {
                if to.is_terminal() {
                    self.deliver_submission(&events);
                }
                Ok(Advance::Moved { to, events })
            }
            Transition::CheckoutRequired { .. } => {
                let checkout = self.checkout.create_checkout(
                    session.analysis_id(),
                    session.unpaid_block_count(),
                    session.unpaid_addon_price(),
                    &session.pricing().currency,
                )?;
                session.attach_checkout_url(checkout.url.clone());
                info!(analysis = %session.analysis_id(), provider = self.checkout.name(), url = %checkout.url, "checkout opened");
                Ok(Advance::Checkout { checkout, events })
            }
            Transition::Exit => Ok(Advance::Exited { events }),
        }
    }

    /// Move back one step; from the first step this exits the wizard.
    pub fn retreat(&self, session: &mut WizardSession) -> Advance {
        match session.back() {
            Ok(StepOutcome {
                transition: Transition::Moved { to, .. },
                events,
            }) => Advance::Moved { to, events },
            Ok(StepOutcome { events, .. }) => Advance::Exited { events },
            Err(reason) => Advance::Refused { reason },
        }
    }

    /// The checkout collaborator reported success: record it and continue to
    /// the questionnaire.
    pub fn confirm_checkout(&self, session: &mut WizardSession) -> Result<Advance> {
        let confirmed = session.confirm_checkout()?;
        let mut advance = self.advance(session)?;
        if let Advance::Moved { events, .. } | Advance::Checkout { events, .. } = &mut advance {
            events.insert(0, confirmed);
        }
        Ok(advance)
    }

    fn deliver_submission(&self, events: &[Event]) {
        for event in events.iter().filter(|e| matches!(e, Event::AnalysisSubmitted { .. })) {
            if let Err(e) = self.notifier.notify(event) {
                warn!(notifier = self.notifier.name(), error = %e, "submission notification failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::QuestionKind;
    use crate::error::{CoreError, IntegrationError, StorageError, WizardError};
    use crate::integrations::{HostedCheckout, NoopNotifier};
    use crate::storage::MemoryStore;
    use crate::wizard::{BasicInfo, ReportDesign};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            "recording"
        }

        fn notify(&self, event: &Event) -> std::result::Result<(), IntegrationError> {
            self.seen.lock().unwrap().push(event.name().to_string());
            if self.fail {
                return Err(IntegrationError::Unavailable {
                    service: "recording".into(),
                    message: "down".into(),
                });
            }
            Ok(())
        }
    }

    struct BrokenStore;

    impl AnswerPersistence for BrokenStore {
        fn load(
            &self,
            _owner: &str,
            _analysis_id: &str,
        ) -> std::result::Result<Option<crate::answers::AnswerStore>, StorageError> {
            Ok(None)
        }

        fn save(
            &self,
            _owner: &str,
            _analysis_id: &str,
            _store: &crate::answers::AnswerStore,
        ) -> std::result::Result<(), StorageError> {
            Err(StorageError::DataDir("read-only".into()))
        }
    }

    fn checkout() -> HostedCheckout {
        HostedCheckout::new("https://pay.example.com/addons").unwrap()
    }

    fn fill(wizard: &AnalysisWizard<'_>, session: &mut WizardSession) {
        let targets: Vec<(String, usize, AnswerValue)> = session
            .blocks()
            .active()
            .flat_map(|b| {
                b.questions.iter().enumerate().map(move |(i, q)| {
                    let value = match q.kind {
                        QuestionKind::Scale => AnswerValue::Scale(3),
                        QuestionKind::Text => AnswerValue::Text("notes".into()),
                        QuestionKind::MultipleChoice => AnswerValue::Choice(q.options[0].clone()),
                    };
                    (b.id.clone(), i, value)
                })
            })
            .collect();
        for (block, idx, value) in targets {
            wizard.answer(session, &block, idx, value).unwrap();
        }
    }

    #[test]
    fn test_answers_survive_reload() {
        let store = MemoryStore::new();
        let checkout = checkout();
        let wizard = AnalysisWizard::new(&store, &checkout, &NoopNotifier);
        let (mut session, _) = wizard.start("ana", CatalogKind::Team, PricingPolicy::default()).unwrap();
        wizard
            .answer(&mut session, "team-growth", 1, AnswerValue::Scale(2))
            .unwrap();

        let mut reopened = WizardSession::with_id(
            session.analysis_id(),
            "ana",
            CatalogKind::Team,
            PricingPolicy::default(),
        );
        assert!(wizard.resume(&mut reopened).unwrap());
        assert_eq!(reopened.answers(), session.answers());
    }

    #[test]
    fn test_invalid_answer_is_not_persisted() {
        let store = MemoryStore::new();
        let checkout = checkout();
        let wizard = AnalysisWizard::new(&store, &checkout, &NoopNotifier);
        let (mut session, _) = wizard.start("ana", CatalogKind::Team, PricingPolicy::default()).unwrap();

        let err = wizard
            .answer(&mut session, "team-growth", 0, AnswerValue::Scale(6))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Wizard(WizardError::InvalidAnswerValue { .. })
        ));
        assert!(store.load("ana", session.analysis_id()).unwrap().unwrap().is_empty());
    }

    #[test]
    fn test_failed_save_keeps_state_for_retry() {
        let checkout = checkout();
        let wizard = AnalysisWizard::new(&BrokenStore, &checkout, &NoopNotifier);
        let mut session = WizardSession::new("ana", CatalogKind::Team, PricingPolicy::default());

        let err = wizard
            .answer(&mut session, "team-growth", 0, AnswerValue::Scale(4))
            .unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert_eq!(
            session.answers().get_answer("team-growth", 0),
            Some(&AnswerValue::Scale(4))
        );
        assert!(session.progress() > 0);
    }

    #[test]
    fn test_full_run_with_checkout_and_single_notification() {
        let store = MemoryStore::new();
        let checkout = checkout();
        let notifier = RecordingNotifier::default();
        let wizard = AnalysisWizard::new(&store, &checkout, &notifier);
        let (mut session, _) = wizard
            .start("ana", CatalogKind::Business, PricingPolicy::default())
            .unwrap();

        assert!(matches!(
            wizard.advance(&mut session).unwrap(),
            Advance::Refused { reason: Rejected::MissingName }
        ));
        session
            .set_basic_info(BasicInfo {
                name: "Annual".into(),
                description: String::new(),
            })
            .unwrap();
        wizard.advance(&mut session).unwrap();
        wizard.advance(&mut session).unwrap();
        session.activate_block("business-customers").unwrap();
        session.activate_block("business-sustainability").unwrap();

        let Advance::Checkout { checkout, .. } = wizard.advance(&mut session).unwrap() else {
            panic!("expected checkout");
        };
        assert_eq!(checkout.quantity, 2);
        assert_eq!(checkout.amount, 78);
        assert_eq!(session.step(), WizardStep::BlockSelection);
        assert_eq!(
            session.checkout().pending.as_ref().unwrap().url.as_deref(),
            Some(checkout.url.as_str())
        );

        let confirmed = wizard.confirm_checkout(&mut session).unwrap();
        assert!(matches!(confirmed, Advance::Moved { to: WizardStep::Questionnaire, .. }));
        assert!(matches!(confirmed.events()[0], Event::CheckoutConfirmed { paid_blocks: 2, .. }));

        fill(&wizard, &mut session);
        wizard.advance(&mut session).unwrap();
        session.select_design(ReportDesign::Classic).unwrap();
        let done = wizard.advance(&mut session).unwrap();
        assert!(matches!(done, Advance::Moved { to: WizardStep::Finalize, .. }));
        assert_eq!(*notifier.seen.lock().unwrap(), vec!["AnalysisSubmitted".to_string()]);

        assert!(matches!(
            wizard.advance(&mut session).unwrap(),
            Advance::Refused { reason: Rejected::Submitted }
        ));
        assert_eq!(notifier.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_notifier_failure_does_not_block_finalize() {
        let store = MemoryStore::new();
        let checkout = checkout();
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let wizard = AnalysisWizard::new(&store, &checkout, &notifier);
        let (mut session, _) = wizard.start("ana", CatalogKind::Team, PricingPolicy::default()).unwrap();
        session
            .set_basic_info(BasicInfo {
                name: "Pulse".into(),
                description: String::new(),
            })
            .unwrap();
        for _ in 0..3 {
            wizard.advance(&mut session).unwrap();
        }
        fill(&wizard, &mut session);
        wizard.advance(&mut session).unwrap();
        session.select_design(ReportDesign::Compact).unwrap();

        let done = wizard.advance(&mut session).unwrap();
        assert!(matches!(done, Advance::Moved { to: WizardStep::Finalize, .. }));
        assert!(session.is_submitted());
    }

    #[test]
    fn test_repeat_checkout_bills_only_unpaid_blocks() {
        let store = MemoryStore::new();
        let checkout = checkout();
        let wizard = AnalysisWizard::new(&store, &checkout, &NoopNotifier);
        let (mut session, _) = wizard
            .start("ana", CatalogKind::Business, PricingPolicy::default())
            .unwrap();
        session
            .set_basic_info(BasicInfo {
                name: "Annual".into(),
                description: String::new(),
            })
            .unwrap();
        wizard.advance(&mut session).unwrap();
        wizard.advance(&mut session).unwrap();
        session.activate_block("business-customers").unwrap();
        session.activate_block("business-sustainability").unwrap();
        wizard.advance(&mut session).unwrap();
        wizard.confirm_checkout(&mut session).unwrap();

        assert!(matches!(wizard.retreat(&mut session), Advance::Moved { to: WizardStep::BlockSelection, .. }));
        session
            .add_custom_block("Export", vec![crate::catalog::Question::scale("Foreign sales grow.")])
            .unwrap();
        let Advance::Checkout { checkout, .. } = wizard.advance(&mut session).unwrap() else {
            panic!("expected checkout");
        };
        assert_eq!(checkout.quantity, 1);
        assert_eq!(checkout.amount, 39);
        assert!(checkout.url.contains("quantity=1"));
        assert!(checkout.url.contains("amount=39"));
    }

    #[test]
    fn test_retreat_exits_from_first_step() {
        let store = MemoryStore::new();
        let checkout = checkout();
        let wizard = AnalysisWizard::new(&store, &checkout, &NoopNotifier);
        let (mut session, _) = wizard.start("ana", CatalogKind::Team, PricingPolicy::default()).unwrap();
        assert!(matches!(wizard.retreat(&mut session), Advance::Exited { .. }));
    }
}
