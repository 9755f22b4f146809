//! Command dispatch: bridges CLI args -> SDK calls -> output formatting.

pub mod clusters;
pub mod cm;
pub mod command;
pub mod hosts;
pub mod services;

use clustermgr_core::ApiRoot;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, root: &ApiRoot, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Echo { message } => cm::echo(root, &message, global).await,
        Command::Version => cm::version(root, global).await,
        Command::Config(args) => cm::handle_config(root, args, global).await,
        Command::Clusters(args) => clusters::handle(root, args, global).await,
        Command::Hosts(args) => hosts::handle(root, args, global).await,
        Command::Services(args) => services::handle(root, args, global).await,
        Command::Command(args) => command::handle(root, args, global).await,
        // Generated in main without a connection
        Command::Completions(_) => Ok(()),
    }
}
