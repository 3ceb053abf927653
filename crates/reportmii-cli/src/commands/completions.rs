use clap::Command;
use clap_complete::{generate, Shell};

use super::CmdResult;

pub fn run(shell: Shell, cmd: &mut Command) -> CmdResult {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut std::io::stdout());
    Ok(())
}
