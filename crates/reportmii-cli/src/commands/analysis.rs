//! Analysis lifecycle commands: create, inspect and step through the wizard.

use clap::Subcommand;
use reportmii_core::wizard::{Advance, AnalysisWizard, BasicInfo, CompanyInfo, ReportDesign, WizardSession};
use reportmii_core::integrations::NoopNotifier;
use reportmii_core::CatalogKind;

use super::{log_events, CmdResult, Context};

#[derive(Subcommand)]
pub enum AnalysisAction {
    /// Start a new analysis and print its ID
    New {
        /// Catalog kind: business or team (default: from config)
        #[arg(long)]
        kind: Option<String>,
        /// Analysis name
        #[arg(long)]
        name: Option<String>,
        /// Short description
        #[arg(long)]
        description: Option<String>,
    },
    /// List your analyses
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show an analysis as JSON
    Show {
        /// Analysis ID
        id: String,
    },
    /// Update basic and company information
    Info {
        /// Analysis ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        employees: Option<u32>,
    },
    /// Move to the next step
    Next {
        /// Analysis ID
        id: String,
    },
    /// Move to the previous step
    Back {
        /// Analysis ID
        id: String,
    },
    /// Choose the report design: classic, modern or compact
    Design {
        /// Analysis ID
        id: String,
        design: String,
    },
    /// Delete an analysis and its answers
    Delete {
        /// Analysis ID
        id: String,
    },
}

pub fn run(action: AnalysisAction, user: Option<&str>) -> CmdResult {
    let ctx = Context::open(user)?;

    match action {
        AnalysisAction::New {
            kind,
            name,
            description,
        } => {
            let catalog: CatalogKind = match kind {
                Some(kind) => kind.parse()?,
                None => ctx.config.catalog_kind()?,
            };
            let checkout = ctx.checkout()?;
            let notifier = ctx.notifier()?;
            let wizard = AnalysisWizard::new(&ctx.db, &checkout, notifier.as_ref());
            let (mut session, started) =
                wizard.start(&ctx.owner, catalog, ctx.config.pricing_policy())?;
            if name.is_some() || description.is_some() {
                session.set_basic_info(BasicInfo {
                    name: name.unwrap_or_default(),
                    description: description.unwrap_or_default(),
                })?;
            }
            ctx.save(&session)?;
            log_events(&[started]);
            println!("{}", session.analysis_id());
        }
        AnalysisAction::List { json } => {
            let analyses = ctx.db.list_sessions(&ctx.owner)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analyses)?);
            } else if analyses.is_empty() {
                println!("no analyses");
            } else {
                for a in &analyses {
                    let status = if a.submitted { " (submitted)" } else { "" };
                    println!(
                        "{}  {:<8}  {:<24}  {}{}",
                        a.analysis_id,
                        a.catalog,
                        a.name,
                        a.step.label(),
                        status
                    );
                }
            }
        }
        AnalysisAction::Show { id } => {
            let session = ctx.load(&id)?;
            println!("{}", serde_json::to_string_pretty(&session)?);
        }
        AnalysisAction::Info {
            id,
            name,
            description,
            company,
            industry,
            employees,
        } => {
            let mut session = ctx.load(&id)?;
            if name.is_some() || description.is_some() {
                let current = session.basic_info().clone();
                session.set_basic_info(BasicInfo {
                    name: name.unwrap_or(current.name),
                    description: description.unwrap_or(current.description),
                })?;
            }
            if company.is_some() || industry.is_some() || employees.is_some() {
                let current = session.company_info().clone();
                session.set_company_info(CompanyInfo {
                    company_name: company.or(current.company_name),
                    industry: industry.or(current.industry),
                    employees: employees.or(current.employees),
                })?;
            }
            ctx.save(&session)?;
            print_status(&session);
        }
        AnalysisAction::Next { id } => {
            let mut session = ctx.load(&id)?;
            let checkout = ctx.checkout()?;
            let notifier = ctx.notifier()?;
            let wizard = AnalysisWizard::new(&ctx.db, &checkout, notifier.as_ref());
            let advance = wizard.advance(&mut session)?;
            ctx.save(&session)?;
            report_advance(&session, &advance)?;
        }
        AnalysisAction::Back { id } => {
            let mut session = ctx.load(&id)?;
            let checkout = ctx.checkout()?;
            let wizard = AnalysisWizard::new(&ctx.db, &checkout, &NoopNotifier);
            let advance = wizard.retreat(&mut session);
            ctx.save(&session)?;
            report_advance(&session, &advance)?;
        }
        AnalysisAction::Design { id, design } => {
            let design: ReportDesign = design.parse()?;
            let mut session = ctx.load(&id)?;
            session.select_design(design)?;
            ctx.save(&session)?;
            println!("design: {design}");
        }
        AnalysisAction::Delete { id } => {
            if ctx.db.delete_session(&ctx.owner, &id)? {
                println!("deleted {id}");
            } else {
                return Err(format!("analysis not found: {id}").into());
            }
        }
    }
    Ok(())
}

fn print_status(session: &WizardSession) {
    println!(
        "step {} ({}%), questionnaire {}%",
        session.step(),
        session.step().progress_marker(),
        session.progress()
    );
}

/// Print the outcome of a step move. Refusals are reported as errors.
pub fn report_advance(session: &WizardSession, advance: &Advance) -> CmdResult {
    log_events(advance.events());
    match advance {
        Advance::Moved { .. } => {
            print_status(session);
            if session.is_submitted() {
                println!("analysis submitted");
            }
        }
        Advance::Checkout { checkout, .. } => {
            println!(
                "checkout required: {} add-on block(s), {} {}",
                checkout.quantity, checkout.amount, checkout.currency
            );
            println!("{}", checkout.url);
            println!(
                "run `reportmii-cli checkout confirm {}` once paid",
                session.analysis_id()
            );
        }
        Advance::Exited { .. } => println!("left the wizard"),
        Advance::Refused { reason } => return Err(format!("cannot move: {reason}").into()),
    }
    Ok(())
}
