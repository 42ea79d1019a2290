//! Output formatting for formatted values.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output, one value per block
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::host::{LookupChain, Value};
use crate::printers::ValuePrinter;

/// How a value ended up being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// A printer claimed the value.
    Formatted,
    /// No printer claimed it; the host's default rendering is used.
    Default,
    /// Building or walking the printer failed.
    Failed,
}

/// One rendered variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedValue {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedChild>,
    /// Children left out because of the configured limit.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub elided: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One rendered child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedChild {
    pub label: String,
    pub value: String,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl RenderedValue {
    fn new(name: &str, type_name: String, outcome: Outcome, summary: String) -> Self {
        Self {
            name: name.to_string(),
            type_name,
            outcome,
            summary,
            children: Vec::new(),
            elided: 0,
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

/// Format `value` through `chain`, rendering at most `limit` children.
pub fn render_value<V: Value>(
    name: &str,
    value: &V,
    chain: &LookupChain<V>,
    limit: Option<usize>,
) -> RenderedValue {
    let type_name = value.value_type().to_string();
    let printer = match chain.format(value) {
        Ok(Some(printer)) => printer,
        Ok(None) => {
            return RenderedValue::new(name, type_name, Outcome::Default, value.to_string());
        }
        Err(err) => {
            let mut rendered = RenderedValue::new(name, type_name, Outcome::Failed, String::new());
            rendered.error = Some(err.to_string());
            return rendered;
        }
    };

    let mut rendered = RenderedValue::new(name, type_name, Outcome::Formatted, printer.summary());
    let total = printer.num_children();
    for child in printer.children().take(limit.unwrap_or(total)) {
        match child {
            Ok(child) => rendered.children.push(RenderedChild {
                label: child.label,
                value: child.value.to_string(),
            }),
            Err(err) => {
                rendered.outcome = Outcome::Failed;
                rendered.error = Some(err.to_string());
                break;
            }
        }
    }
    if rendered.error.is_none() {
        rendered.elided = total.saturating_sub(rendered.children.len());
    }
    rendered
}

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON document.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub snapshot: String,
    pub namespace: String,
    pub values: Vec<RenderedValue>,
    pub failed: usize,
}

/// Serialize rendered values as a pretty-printed JSON report.
pub fn to_json(snapshot: &str, namespace: &str, values: &[RenderedValue]) -> anyhow::Result<String> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        snapshot: snapshot.to_string(),
        namespace: namespace.to_string(),
        values: values.to_vec(),
        failed: values.iter().filter(|v| v.failed()).count(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// Write rendered values in JSON format.
pub fn write_json(snapshot: &str, namespace: &str, values: &[RenderedValue]) -> anyhow::Result<()> {
    println!("{}", to_json(snapshot, namespace, values)?);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write rendered values in pretty (human-readable) format.
pub fn write_pretty(snapshot: &str, values: &[RenderedValue]) {
    // Header
    println!();
    print!("  ");
    print!("{}", "eigenprint".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();
    print!("  {}", "Snapshot: ".dimmed());
    println!("{}", snapshot);
    println!();

    print!("{}", format_values(values));

    let failed = values.iter().filter(|v| v.failed()).count();
    if failed > 0 {
        println!(
            "  {}",
            format!("{} of {} values failed to format", failed, values.len()).red()
        );
        println!();
    }
}

/// Pretty text for `values`, one block per value.
pub fn format_values(values: &[RenderedValue]) -> String {
    let mut out = String::new();
    for value in values {
        write_value(&mut out, value);
        out.push('\n');
    }
    out
}

fn write_value(out: &mut String, value: &RenderedValue) {
    let _ = write!(out, "  {} = ", value.name.bold());
    match value.outcome {
        Outcome::Formatted => {
            let _ = writeln!(out, "{}", value.summary);
        }
        Outcome::Default => {
            let _ = writeln!(out, "{}", value.summary.dimmed());
        }
        Outcome::Failed if value.summary.is_empty() => {
            let _ = writeln!(out, "{}", format!("<error: {}>", error_text(value)).red());
            return;
        }
        Outcome::Failed => {
            let _ = writeln!(out, "{}", value.summary);
        }
    }

    for child in &value.children {
        let _ = writeln!(out, "      {} = {}", child.label.blue(), child.value);
    }
    if value.elided > 0 {
        let plural = if value.elided != 1 { "s" } else { "" };
        let _ = writeln!(
            out,
            "      {}",
            format!("... {} more element{}", value.elided, plural).dimmed()
        );
    }
    if value.outcome == Outcome::Failed {
        let _ = writeln!(out, "      {}", format!("<error: {}>", error_text(value)).red());
    }
}

fn error_text(value: &RenderedValue) -> &str {
    value.error.as_deref().unwrap_or("unknown error")
}
