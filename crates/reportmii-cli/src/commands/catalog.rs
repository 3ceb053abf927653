use clap::Subcommand;
use reportmii_core::catalog::{get_catalog, CatalogKind, QuestionKind, DEFAULT_ACTIVE_BLOCKS};

use super::CmdResult;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// Show the blocks and questions of a catalog
    Show {
        /// Catalog kind: business or team
        kind: String,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: CatalogAction) -> CmdResult {
    match action {
        CatalogAction::Show { kind, json } => {
            let kind: CatalogKind = kind.parse()?;
            let templates = get_catalog(kind);
            if json {
                println!("{}", serde_json::to_string_pretty(&templates)?);
                return Ok(());
            }

            println!("{kind} catalog ({} blocks, first {DEFAULT_ACTIVE_BLOCKS} active by default)", templates.len());
            for (i, template) in templates.iter().enumerate() {
                println!();
                println!("{:>2}. {} [{}]", i + 1, template.title, template.id);
                if !template.description.is_empty() {
                    println!("    {}", template.description);
                }
                for (q, question) in template.questions.iter().enumerate() {
                    let hint = match question.kind {
                        QuestionKind::Scale => "1-5".to_string(),
                        QuestionKind::Text => "text".to_string(),
                        QuestionKind::MultipleChoice => question.options.join(" | "),
                    };
                    println!("    {q}: {} ({hint})", question.text);
                }
            }
        }
    }
    Ok(())
}
