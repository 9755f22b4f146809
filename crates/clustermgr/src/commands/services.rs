//! Service command handlers.

use tabled::Tabled;

use clustermgr_core::{ApiRoot, ApiService, View};

use crate::cli::{GlobalOpts, OutputFormat, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    service_type: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Stale Config")]
    stale: String,
}

fn row(s: &ApiService) -> ServiceRow {
    ServiceRow {
        name: output::cell(s.name()),
        service_type: output::cell(s.service_type()),
        state: output::cell(s.service_state()),
        health: output::cell(s.health_summary()),
        stale: output::cell(s.config_stale()),
    }
}

fn name_of(s: &ApiService) -> String {
    s.name().unwrap_or_default().to_owned()
}

pub async fn handle(root: &ApiRoot, args: ServicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ServicesCommand::List { cluster } => {
            let view = (global.output != OutputFormat::Plain).then_some(View::Full);
            let services = root.get_all_services(&cluster, view).await?;
            let out = output::render_list(global.output, &services, row, name_of);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
