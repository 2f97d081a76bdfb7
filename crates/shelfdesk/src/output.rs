//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Report a completed mutation on stderr.
pub fn success(message: &str, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    if should_color(global.color_mode()) {
        eprintln!("{} {message}", "✓".green().bold());
    } else {
        eprintln!("✓ {message}");
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive; `empty` is shown instead of an
///   empty table
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    empty: &str,
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, serde_json::Error>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table if data.is_empty() => Ok(empty.to_owned()),
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// the `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, serde_json::Error>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
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

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_structured<T: serde::Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::JsonCompact => serde_json::to_string(data),
        OutputFormat::Yaml => {
            // Round-trip through serde_json::Value so YAML and JSON share one
            // error type.
            let value = serde_json::to_value(data)?;
            Ok(serde_yaml::to_string(&value).unwrap_or_default())
        }
        _ => serde_json::to_string_pretty(data),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Item {
        id: u64,
        name: &'static str,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Name")]
        name: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![Item { id: 1, name: "Dune" }, Item { id: 2, name: "Emma" }]
    }

    fn render(format: OutputFormat, data: &[Item]) -> String {
        render_list(
            format,
            data,
            "No items.",
            |i| ItemRow {
                id: i.id,
                name: i.name,
            },
            |i| i.id.to_string(),
        )
        .unwrap()
    }

    #[test]
    fn table_has_headers_and_rows() {
        let out = render(OutputFormat::Table, &items());
        assert!(out.contains("ID"));
        assert!(out.contains("Dune"));
        assert!(out.contains('╭'));
    }

    #[test]
    fn empty_table_shows_message() {
        assert_eq!(render(OutputFormat::Table, &[]), "No items.");
        assert_eq!(render(OutputFormat::Json, &[]), "[]");
    }

    #[test]
    fn plain_lists_ids() {
        assert_eq!(render(OutputFormat::Plain, &items()), "1\n2");
    }

    #[test]
    fn structured_formats() {
        let compact = render(OutputFormat::JsonCompact, &items());
        assert_eq!(compact, r#"[{"id":1,"name":"Dune"},{"id":2,"name":"Emma"}]"#);

        let yaml = render(OutputFormat::Yaml, &items());
        assert!(yaml.contains("name: Dune"));
    }
}
