use reportmii_core::AnalysisReport;

use super::{CmdResult, Context};

pub fn run(id: &str, json: bool, user: Option<&str>) -> CmdResult {
    let ctx = Context::open(user)?;
    let session = ctx.load(id)?;
    let report = AnalysisReport::build(&session);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
