//! Output formatting: table, JSON, YAML, plain.
//!
//! Entities render through their full JSON form (read-only attributes
//! included) for the structured formats and through `tabled` rows for
//! tables.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use clustermgr_core::{ApiObject, SerializeOptions};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Success/failure label for a finished command.
pub fn outcome_label(success: Option<bool>, active: bool, color: bool) -> String {
    let (text, good) = match (active, success) {
        (true, _) => ("RUNNING", None),
        (false, Some(true)) => ("SUCCEEDED", Some(true)),
        (false, Some(false)) => ("FAILED", Some(false)),
        (false, None) => ("FINISHED", None),
    };
    if !color {
        return text.to_owned();
    }
    match good {
        Some(true) => text.green().to_string(),
        Some(false) => text.red().to_string(),
        None => text.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of API objects in the chosen format.
///
/// `plain` calls `id_fn` on each item to emit one identifier per line.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: ApiObject,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
        structured => {
            let values: Vec<serde_json::Value> = data.iter().map(full_json).collect();
            render_value(structured, &serde_json::Value::Array(values))
        }
    }
}

/// Render a single API object in the chosen format.
///
/// Table rendering uses `detail_fn`, which returns a pre-formatted
/// key/value block.
pub fn render_single<T: ApiObject>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String {
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Plain => id_fn(data),
        structured => render_value(structured, &full_json(data)),
    }
}

/// Render arbitrary JSON. Tables fall back to pretty JSON.
pub fn render_value(format: OutputFormat, value: &serde_json::Value) -> String {
    match format {
        OutputFormat::JsonCompact => serde_json::to_string(value).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(value).unwrap_or_default(),
        OutputFormat::Plain => match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        OutputFormat::Table | OutputFormat::Json => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
    }
}

/// Build an aligned `key: value` block, skipping absent values.
pub fn detail_block(pairs: &[(&str, Option<String>)]) -> String {
    let width = pairs
        .iter()
        .filter(|(_, v)| v.is_some())
        .map(|(k, _)| k.len())
        .max()
        .unwrap_or(0);
    pairs
        .iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| format!("{k:<width$}  {v}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

/// Rounded table from `Tabled` rows.
pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn full_json<T: ApiObject>(data: &T) -> serde_json::Value {
    data.entity().to_json_with(&SerializeOptions::full())
}

/// `-` for an absent cell.
pub fn cell(value: Option<impl ToString>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clustermgr_core::ApiCluster;
    use pretty_assertions::assert_eq;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn clusters() -> Vec<ApiCluster> {
        vec![ApiCluster::new("c1", "CDH5"), ApiCluster::new("c2", "CDH6")]
    }

    #[test]
    fn plain_lists_identifiers() {
        let out = render_list(
            OutputFormat::Plain,
            &clusters(),
            |c| Row {
                name: cell(c.name()),
            },
            |c| c.name().unwrap_or_default().to_owned(),
        );
        assert_eq!(out, "c1\nc2");
    }

    #[test]
    fn compact_json_lists_objects() {
        let out = render_list(
            OutputFormat::JsonCompact,
            &clusters()[..1],
            |c| Row {
                name: cell(c.name()),
            },
            |_| String::new(),
        );
        assert_eq!(out, r#"[{"name":"c1","version":"CDH5"}]"#);
    }

    #[test]
    fn table_contains_rows() {
        let out = render_list(
            OutputFormat::Table,
            &clusters(),
            |c| Row {
                name: cell(c.name()),
            },
            |_| String::new(),
        );
        assert!(out.contains("Name"));
        assert!(out.contains("c2"));
    }

    #[test]
    fn detail_block_skips_missing() {
        let out = detail_block(&[
            ("Name", Some("c1".into())),
            ("Display", None),
            ("Id", Some("7".into())),
        ]);
        assert_eq!(out, "Name  c1\nId    7");
    }

    #[test]
    fn outcome_without_color() {
        assert_eq!(outcome_label(Some(true), false, false), "SUCCEEDED");
        assert_eq!(outcome_label(None, true, false), "RUNNING");
        assert_eq!(outcome_label(Some(false), false, false), "FAILED");
    }
}
