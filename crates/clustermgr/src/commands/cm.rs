//! Server-level handlers: echo, version, Cluster Manager config.

use std::collections::BTreeMap;

use tabled::Tabled;

use clustermgr_core::{
    ApiObject, ApiRoot, ApiVersionInfo, ConfigMap, FullConfigMap, SerializeOptions,
};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn echo(root: &ApiRoot, message: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let reply = root.echo(message).await?;
    let out = output::render_single(
        global.output,
        &reply,
        |r| r.message().unwrap_or_default().to_owned(),
        |r| r.message().unwrap_or_default().to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn version(root: &ApiRoot, global: &GlobalOpts) -> Result<(), CliError> {
    let info = root.get_version_info().await?;
    let out = output::render_single(global.output, &info, version_detail, |v| {
        v.version().unwrap_or_default().to_owned()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn version_detail(v: &ApiVersionInfo) -> String {
    output::detail_block(&[
        ("Version", v.version().map(str::to_owned)),
        ("Snapshot", Some(v.is_snapshot().to_string())),
        ("Built By", v.build_user().map(str::to_owned)),
        ("Built At", v.build_timestamp().map(str::to_owned)),
        ("Git Hash", v.git_hash().map(str::to_owned)),
    ])
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct FullConfigRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Default")]
    default: String,
    #[tabled(rename = "Required")]
    required: bool,
}

pub async fn handle_config(root: &ApiRoot, args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ConfigCommand::Show { full } = args.command;
    let out = if full {
        render_full_config(&root.get_cm_full_config().await?, global.output)
    } else {
        render_config(&root.get_cm_config().await?, global.output)
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_config(config: &ConfigMap, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => output::render_table(
            &config
                .iter()
                .map(|(k, v)| ConfigRow {
                    name: k.clone(),
                    value: output::cell(v.as_deref()),
                })
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Plain => config.keys().cloned().collect::<Vec<_>>().join("\n"),
        structured => output::render_value(structured, &serde_json::json!(config)),
    }
}

fn render_full_config(config: &FullConfigMap, format: OutputFormat) -> String {
    match format {
        OutputFormat::Table => output::render_table(
            &config
                .iter()
                .map(|(k, c)| FullConfigRow {
                    name: k.clone(),
                    value: output::cell(c.value()),
                    default: output::cell(c.default_value()),
                    required: c.is_required(),
                })
                .collect::<Vec<_>>(),
        ),
        OutputFormat::Plain => config.keys().cloned().collect::<Vec<_>>().join("\n"),
        structured => {
            let map: BTreeMap<&str, serde_json::Value> = config
                .iter()
                .map(|(k, c)| {
                    (
                        k.as_str(),
                        c.entity().to_json_with(&SerializeOptions::full()),
                    )
                })
                .collect();
            output::render_value(structured, &serde_json::json!(map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unset_values_render_as_null() {
        let mut config = ConfigMap::new();
        config.insert("PARCEL_REPO".into(), None);
        config.insert("TSQUERY_STREAMS_LIMIT".into(), Some("1000".into()));

        let out = render_config(&config, OutputFormat::JsonCompact);
        assert_eq!(out, r#"{"PARCEL_REPO":null,"TSQUERY_STREAMS_LIMIT":"1000"}"#);

        let table = render_config(&config, OutputFormat::Table);
        assert!(table.contains("TSQUERY_STREAMS_LIMIT"));
        assert!(table.contains('-'));
    }
}
