use clap::Subcommand;
use reportmii_core::catalog::Question;
use reportmii_core::integrations::NoopNotifier;
use reportmii_core::progress::block_progress;
use reportmii_core::wizard::AnalysisWizard;
use reportmii_core::Event;
use serde::Serialize;

use super::{log_events, CmdResult, Context};

#[derive(Subcommand)]
pub enum BlockAction {
    /// List the blocks of an analysis
    List {
        /// Analysis ID
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Include a block in the analysis
    Activate {
        /// Analysis ID
        id: String,
        /// Block ID
        block: String,
    },
    /// Exclude a block; its answers are kept
    Deactivate {
        /// Analysis ID
        id: String,
        /// Block ID
        block: String,
    },
    /// Add a custom block
    Add {
        /// Analysis ID
        id: String,
        /// Block title
        title: String,
        /// Copy the questions of an existing block
        #[arg(long)]
        from: Option<String>,
        /// Scale question text (repeatable)
        #[arg(long = "question")]
        questions: Vec<String>,
    },
    /// Remove a custom block and its answers
    Remove {
        /// Analysis ID
        id: String,
        /// Block ID
        block: String,
    },
    /// Move a block to a new position (0-based)
    Move {
        /// Analysis ID
        id: String,
        /// Block ID
        block: String,
        index: usize,
    },
    /// Show add-on pricing for the current selection
    Price {
        /// Analysis ID
        id: String,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct PriceSummary<'a> {
    billable_blocks: usize,
    included_blocks: usize,
    paid_blocks: usize,
    confirmed_blocks: usize,
    amount: u64,
    /// Price of the add-on blocks not yet paid for.
    amount_due: u64,
    currency: &'a str,
}

pub fn run(action: BlockAction, user: Option<&str>) -> CmdResult {
    let ctx = Context::open(user)?;

    match action {
        BlockAction::List { id, json } => {
            let session = ctx.load(&id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(session.blocks())?);
                return Ok(());
            }
            for (i, block) in session.blocks().iter().enumerate() {
                let mark = if block.is_active { "x" } else { " " };
                let kind = if block.is_custom { " (custom)" } else { "" };
                let p = block_progress(block, session.answers());
                println!(
                    "{i:>2} [{mark}] {:<28} {:<32} {}/{}{kind}",
                    block.id, block.title, p.answered, p.total
                );
            }
        }
        BlockAction::Activate { id, block } => {
            let mut session = ctx.load(&id)?;
            let changed = session.activate_block(&block)?;
            ctx.save(&session)?;
            log_events(changed.as_slice());
            println!("{block} active, {} paid add-on block(s)", session.paid_block_count());
        }
        BlockAction::Deactivate { id, block } => {
            let mut session = ctx.load(&id)?;
            let changed = session.deactivate_block(&block)?;
            ctx.save(&session)?;
            log_events(changed.as_slice());
            println!("{block} inactive, {} paid add-on block(s)", session.paid_block_count());
        }
        BlockAction::Add {
            id,
            title,
            from,
            questions,
        } => {
            let mut session = ctx.load(&id)?;
            let event = match from {
                Some(template) => session.add_custom_block_from_template(&title, &template)?,
                None => session.add_custom_block(
                    &title,
                    questions.into_iter().map(Question::scale).collect(),
                )?,
            };
            ctx.save(&session)?;
            log_events(std::slice::from_ref(&event));
            if let Event::BlockAdded { block_id, .. } = &event {
                println!("{block_id}");
            }
        }
        BlockAction::Remove { id, block } => {
            let mut session = ctx.load(&id)?;
            let checkout = ctx.checkout()?;
            let wizard = AnalysisWizard::new(&ctx.db, &checkout, &NoopNotifier);
            let event = wizard.remove_custom_block(&mut session, &block)?;
            ctx.save(&session)?;
            log_events(std::slice::from_ref(&event));
            println!("removed {block}");
        }
        BlockAction::Move { id, block, index } => {
            let mut session = ctx.load(&id)?;
            let event = session.move_block(&block, index)?;
            ctx.save(&session)?;
            log_events(std::slice::from_ref(&event));
            if let Event::BlockMoved { to_index, .. } = event {
                println!("{block} moved to {to_index}");
            }
        }
        BlockAction::Price { id, json } => {
            let session = ctx.load(&id)?;
            let pricing = session.pricing();
            let summary = PriceSummary {
                billable_blocks: session.blocks().billable_count(),
                included_blocks: pricing.included_blocks,
                paid_blocks: session.paid_block_count(),
                confirmed_blocks: session.checkout().confirmed_blocks,
                amount: session.total_addon_price(),
                amount_due: session.unpaid_addon_price(),
                currency: &pricing.currency,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} billable block(s), {} included, {} add-on ({} paid): {} {}, due {}",
                    summary.billable_blocks,
                    summary.included_blocks,
                    summary.paid_blocks,
                    summary.confirmed_blocks,
                    summary.amount,
                    summary.currency,
                    summary.amount_due
                );
            }
        }
    }
    Ok(())
}
