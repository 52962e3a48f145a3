//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod cached;
pub mod transfer;

use pductl_config::Config;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, config: &Config) -> Result<(), CliError> {
    match cmd {
        Command::Fetch => transfer::fetch(global, config).await,
        Command::Set(args) => transfer::set(&args, global, config).await,
        Command::Show(args) => cached::show(&args, global, config),
        Command::Get(args) => cached::get(&args, global, config),
    }
}
