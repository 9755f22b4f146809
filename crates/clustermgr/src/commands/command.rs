//! Server command handlers: show, wait, abort.

use std::time::Duration;

use clustermgr_core::{ApiCommand, ApiRoot};
use tracing::info;

use crate::cli::{CommandArgs, CommandCommand, GlobalOpts, WaitArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(root: &ApiRoot, args: CommandArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CommandCommand::Show { id } => {
            let cmd = root.get_command(id).await?;
            output::print_output(&render(&cmd, global), global.quiet);
            Ok(())
        }

        CommandCommand::Wait { id, timeout } => {
            let cmd = root.get_command(id).await?;
            let done = cmd.wait(timeout.map(Duration::from_secs)).await?;
            finish(&done, global)
        }

        CommandCommand::Abort { id } => {
            let cmd = root.get_command(id).await?;
            let aborted = cmd.abort().await?;
            output::print_output(&render(&aborted, global), global.quiet);
            Ok(())
        }
    }
}

/// Report a freshly issued command, waiting for it when asked.
pub async fn follow(cmd: &ApiCommand, wait: &WaitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !wait.wait {
        output::print_output(&render(cmd, global), global.quiet);
        return Ok(());
    }
    info!(id = cmd.id(), name = cmd.name(), "waiting for command");
    let done = cmd.wait(wait.wait_timeout.map(Duration::from_secs)).await?;
    finish(&done, global)
}

/// Print a waited-on command; a finished, unsuccessful one is an error.
fn finish(cmd: &ApiCommand, global: &GlobalOpts) -> Result<(), CliError> {
    output::print_output(&render(cmd, global), global.quiet);
    if !cmd.is_active() && cmd.success() == Some(false) {
        return Err(CliError::CommandFailed {
            id: cmd.id().unwrap_or_default(),
            message: cmd.result_message().unwrap_or("no result message").to_owned(),
        });
    }
    Ok(())
}

fn render(cmd: &ApiCommand, global: &GlobalOpts) -> String {
    let color = output::should_color(global.color);
    output::render_single(
        global.output,
        cmd,
        |c| {
            output::detail_block(&[
                ("Id", c.id().map(|v| v.to_string())),
                ("Name", c.name().map(str::to_owned)),
                (
                    "Status",
                    Some(output::outcome_label(c.success(), c.is_active(), color)),
                ),
                ("Started", c.start_time().map(|t| t.to_rfc3339())),
                ("Ended", c.end_time().map(|t| t.to_rfc3339())),
                ("Result", c.result_message().map(str::to_owned)),
            ])
        },
        |c| output::cell(c.id()),
    )
}
