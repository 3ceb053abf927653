use clap::Subcommand;
use reportmii_core::integrations::NoopNotifier;
use reportmii_core::wizard::AnalysisWizard;
use reportmii_core::{AnswerValue, WizardError};

use super::{log_events, CmdResult, Context};

#[derive(Subcommand)]
pub enum AnswerAction {
    /// Answer a question
    Set {
        /// Analysis ID
        id: String,
        /// Block ID
        block: String,
        /// Question index (0-based)
        index: usize,
        /// 1-5 for scale questions, free text, or one of the listed options
        value: String,
    },
    /// Print an answer
    Get {
        /// Analysis ID
        id: String,
        /// Block ID
        block: String,
        /// Question index (0-based)
        index: usize,
    },
}

pub fn run(action: AnswerAction, user: Option<&str>) -> CmdResult {
    let ctx = Context::open(user)?;

    match action {
        AnswerAction::Set {
            id,
            block,
            index,
            value,
        } => {
            let mut session = ctx.load(&id)?;
            let question = session
                .blocks()
                .get(&block)
                .ok_or_else(|| WizardError::UnknownBlock(block.clone()))?
                .question(index)
                .ok_or_else(|| WizardError::UnknownQuestion {
                    block: block.clone(),
                    index,
                })?;
            let value = AnswerValue::parse(question.kind, &value).map_err(|reason| {
                WizardError::InvalidAnswerValue {
                    block: block.clone(),
                    question: index,
                    reason,
                }
            })?;

            let checkout = ctx.checkout()?;
            let wizard = AnalysisWizard::new(&ctx.db, &checkout, &NoopNotifier);
            let event = wizard.answer(&mut session, &block, index, value)?;
            ctx.save(&session)?;
            log_events(std::slice::from_ref(&event));
            println!("progress: {}%", session.progress());
        }
        AnswerAction::Get { id, block, index } => {
            let session = ctx.load(&id)?;
            match session.answers().get_answer(&block, index) {
                Some(value) => println!("{value}"),
                None => println!("unanswered"),
            }
        }
    }
    Ok(())
}
