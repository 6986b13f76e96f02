use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use solid_oidc_auth::conformance::{CheckStatus, ReportEntry};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_report(title: &str, entries: &[ReportEntry], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(entries),
        OutputFormat::Table => {
            println!("{}", title.cyan().bold());
            println!("{}", report_table(entries));
            println!("{}", summary(entries));
            Ok(())
        }
    }
}

fn report_table(entries: &[ReportEntry]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["", "Check", "Level", "Description", "Inspected"]);
    for entry in entries {
        builder.push_record([
            status_mark(entry.status),
            entry.label.clone(),
            entry.level.clone().unwrap_or_else(|| "-".to_string()),
            entry.description.clone().unwrap_or_else(|| entry.message.clone()),
            inspected_text(&entry.inspected),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn status_mark(status: CheckStatus) -> String {
    match status {
        CheckStatus::Pass => "✓".green().to_string(),
        CheckStatus::Fail => "✗".red().to_string(),
        CheckStatus::Skip => "-".dimmed().to_string(),
    }
}

fn inspected_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn summary(entries: &[ReportEntry]) -> String {
    let count = |status: CheckStatus| entries.iter().filter(|e| e.status == status).count();
    format!(
        "{} passed, {} failed, {} skipped",
        count(CheckStatus::Pass).to_string().green(),
        count(CheckStatus::Fail).to_string().red(),
        count(CheckStatus::Skip)
    )
}
