//! Host command handlers.

use tabled::Tabled;

use clustermgr_core::{ApiHost, ApiRoot, View};

use crate::cli::{GlobalOpts, HostsArgs, HostsCommand, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Host Id")]
    host_id: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Rack")]
    rack: String,
    #[tabled(rename = "Health")]
    health: String,
}

fn row(h: &ApiHost) -> HostRow {
    HostRow {
        host_id: output::cell(h.host_id()),
        hostname: output::cell(h.hostname()),
        ip: output::cell(h.ip_address()),
        rack: output::cell(h.rack_id()),
        health: output::cell(h.health_summary()),
    }
}

fn detail(h: &ApiHost) -> String {
    let roles = h
        .role_refs()
        .iter()
        .filter_map(|r| r.role_name().map(str::to_owned))
        .collect::<Vec<_>>();
    output::detail_block(&[
        ("Host Id", h.host_id().map(str::to_owned)),
        ("Hostname", h.hostname().map(str::to_owned)),
        ("IP", h.ip_address().map(str::to_owned)),
        ("Rack", h.rack_id().map(str::to_owned)),
        ("Health", h.health_summary().map(str::to_owned)),
        ("Maintenance", h.maintenance_mode().map(|m| m.to_string())),
        ("Roles", (!roles.is_empty()).then(|| roles.join(", "))),
    ])
}

fn id_of(h: &ApiHost) -> String {
    h.host_id().unwrap_or_default().to_owned()
}

pub async fn handle(root: &ApiRoot, args: HostsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        HostsCommand::List => {
            let view = (global.output != OutputFormat::Plain).then_some(View::Full);
            let hosts = root.get_all_hosts(view).await?;
            let out = output::render_list(global.output, &hosts, row, id_of);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HostsCommand::Show { host_id } => {
            let host = root.get_host(&host_id).await?;
            let out = output::render_single(global.output, &host, detail, id_of);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
