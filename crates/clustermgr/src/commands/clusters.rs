//! Cluster command handlers.

use tabled::Tabled;

use clustermgr_core::{ApiCluster, ApiRoot, View};

use crate::cli::{ClustersArgs, ClustersCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::command;

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Full Version")]
    full_version: String,
    #[tabled(rename = "Maintenance")]
    maintenance: String,
}

fn row(c: &ApiCluster) -> ClusterRow {
    ClusterRow {
        name: output::cell(c.name()),
        display_name: output::cell(c.display_name()),
        version: output::cell(c.version()),
        full_version: output::cell(c.full_version()),
        maintenance: output::cell(c.maintenance_mode()),
    }
}

fn detail(c: &ApiCluster) -> String {
    output::detail_block(&[
        ("Name", c.name().map(str::to_owned)),
        ("Display Name", c.display_name().map(str::to_owned)),
        ("Version", c.version().map(str::to_owned)),
        ("Full Version", c.full_version().map(str::to_owned)),
        ("Maintenance", c.maintenance_mode().map(|m| m.to_string())),
        ("Status", c.entity_status().map(str::to_owned)),
    ])
}

fn name_of(c: &ApiCluster) -> String {
    c.name().unwrap_or_default().to_owned()
}

pub async fn handle(root: &ApiRoot, args: ClustersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ClustersCommand::List => {
            let out = list(root, global.output).await?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClustersCommand::Show { name } => {
            let cluster = root.get_cluster(&name).await?;
            let out = output::render_single(global.output, &cluster, detail, name_of);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClustersCommand::Start { name, wait } => {
            let cmd = root.get_cluster(&name).await?.start().await?;
            command::follow(&cmd, &wait, global).await
        }

        ClustersCommand::Stop { name, wait } => {
            let cmd = root.get_cluster(&name).await?.stop().await?;
            command::follow(&cmd, &wait, global).await
        }
    }
}

async fn list(root: &ApiRoot, format: OutputFormat) -> Result<String, CliError> {
    let view = match format {
        OutputFormat::Table | OutputFormat::Plain => None,
        _ => Some(View::Full),
    };
    let clusters = root.get_all_clusters(view).await?;
    Ok(output::render_list(format, &clusters, row, name_of))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clustermgr_core::ConnectionConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, ApiRoot) {
        let server = MockServer::start().await;
        let addr = server.address();
        let config = ConnectionConfig::new(addr.ip().to_string()).port(addr.port());
        let root = ApiRoot::connect(&config).unwrap();
        (server, root)
    }

    #[tokio::test]
    async fn plain_list_prints_names() {
        let (server, root) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v19/clusters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "c1", "version": "CDH5"}, {"name": "c2", "version": "CDH6"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = list(&root, OutputFormat::Plain).await.unwrap();
        assert_eq!(out, "c1\nc2");
    }

    #[tokio::test]
    async fn json_list_requests_full_view() {
        let (server, root) = setup().await;
        Mock::given(method("GET"))
            .and(path("/api/v19/clusters"))
            .and(query_param("view", "full"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"name": "c1", "version": "CDH5", "maintenanceMode": true}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let out = list(&root, OutputFormat::JsonCompact).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            parsed,
            json!([{"name": "c1", "version": "CDH5", "maintenanceMode": true}])
        );
    }
}
