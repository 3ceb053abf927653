use clap::Subcommand;
use reportmii_core::integrations::HostedCheckout;
use reportmii_core::wizard::{Advance, AnalysisWizard, WizardStep};

use super::analysis::report_advance;
use super::{CmdResult, Context};

#[derive(Subcommand)]
pub enum CheckoutAction {
    /// Create the checkout for unpaid add-on blocks
    Start {
        /// Analysis ID
        id: String,
        /// Open the payment page in the browser
        #[arg(long)]
        open: bool,
    },
    /// Report a successful payment and continue to the questionnaire
    Confirm {
        /// Analysis ID
        id: String,
    },
}

pub fn run(action: CheckoutAction, user: Option<&str>) -> CmdResult {
    let ctx = Context::open(user)?;
    let checkout = ctx.checkout()?;
    let notifier = ctx.notifier()?;
    let wizard = AnalysisWizard::new(&ctx.db, &checkout, notifier.as_ref());

    match action {
        CheckoutAction::Start { id, open } => {
            let mut session = ctx.load(&id)?;
            if session.step() != WizardStep::BlockSelection || session.unpaid_block_count() == 0 {
                println!("no checkout needed");
                return Ok(());
            }
            let advance = wizard.advance(&mut session)?;
            ctx.save(&session)?;
            if let (true, Advance::Checkout { checkout, .. }) = (open, &advance) {
                HostedCheckout::open_in_browser(checkout)?;
            }
            report_advance(&session, &advance)?;
        }
        CheckoutAction::Confirm { id } => {
            let mut session = ctx.load(&id)?;
            let advance = wizard.confirm_checkout(&mut session)?;
            ctx.save(&session)?;
            report_advance(&session, &advance)?;
        }
    }
    Ok(())
}
