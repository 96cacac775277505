//! Self-contained HTML report.

use super::Report;
use crate::error::{AppError, Result};
use snapdelta_engine::{AttributeChange, ModifiedObject};
use std::fmt::Write;
use std::path::Path;

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:2rem;color:#1f2328}\
h1{font-size:1.5rem}h2{font-size:1.2rem;margin-top:2rem}\
table{border-collapse:collapse;margin:.5rem 0 1.5rem}\
th,td{border:1px solid #d0d7de;padding:.3rem .6rem;text-align:left;vertical-align:top}\
th{background:#f6f8fa}.add{color:#1a7f37}.del{color:#cf222e}\
.key{font-family:monospace}ul.values{margin:0;padding-left:1rem}\
.warn{background:#fff8c5;padding:.5rem;border:1px solid #d4a72c}";

/// Render the report as a single HTML page.
pub fn render_html(report: &Report<'_>) -> String {
    let mut out = String::with_capacity(16 * 1024);
    // Writing into a String cannot fail.
    let _ = write_page(&mut out, report);
    out
}

/// Render and write the HTML page.
pub fn write_html(report: &Report<'_>, path: &Path) -> Result<()> {
    std::fs::write(path, render_html(report)).map_err(|e| AppError::write(path, e))
}

fn write_page(out: &mut String, report: &Report<'_>) -> std::fmt::Result {
    let s = &report.summary;
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\"><head><meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Snapshot diff</title><style>{}</style></head><body>", STYLE)?;
    writeln!(out, "<h1>Snapshot diff</h1>")?;
    writeln!(
        out,
        "<p>Generated {}</p>",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    writeln!(out, "<table><tr><th></th><th>Path</th><th>Objects</th><th>Payloads</th><th>Skipped</th></tr>")?;
    for (title, info) in [("Old", &report.old), ("New", &report.new)] {
        writeln!(
            out,
            "<tr><th>{}</th><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            title,
            escape(&info.path),
            info.objects,
            info.stats.payloads,
            info.stats.skipped_payloads
        )?;
    }
    writeln!(out, "</table>")?;

    if report.skipped_payloads() > 0 {
        let labels: Vec<String> = report
            .old
            .skipped_payloads
            .iter()
            .chain(report.new.skipped_payloads)
            .map(|label| escape(label))
            .collect();
        writeln!(
            out,
            "<p class=\"warn\">{} malformed payload(s) skipped: {}</p>",
            report.skipped_payloads(),
            labels.join(", ")
        )?;
    }

    writeln!(
        out,
        "<table><tr><th>Added</th><th>Deleted</th><th>Modified</th><th>Unchanged</th><th>Attribute changes</th></tr>"
    )?;
    writeln!(
        out,
        "<tr><td class=\"add\">{}</td><td class=\"del\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr></table>",
        s.added, s.deleted, s.modified, s.unchanged, s.attribute_changes
    )?;

    write_key_list(out, "Added objects", "add", &report.diff.added)?;
    write_key_list(out, "Deleted objects", "del", &report.diff.deleted)?;

    if !report.diff.modified.is_empty() {
        writeln!(out, "<h2>Modified objects ({})</h2>", report.diff.modified.len())?;
        for modified in &report.diff.modified {
            write_modified(out, modified)?;
        }
    }

    writeln!(out, "</body></html>")
}

fn write_key_list(out: &mut String, title: &str, class: &str, keys: &[String]) -> std::fmt::Result {
    if keys.is_empty() {
        return Ok(());
    }
    writeln!(out, "<h2>{} ({})</h2><ul class=\"{}\">", title, keys.len(), class)?;
    for key in keys {
        writeln!(out, "<li class=\"key\">{}</li>", escape(key))?;
    }
    writeln!(out, "</ul>")
}

fn write_modified(out: &mut String, modified: &ModifiedObject) -> std::fmt::Result {
    writeln!(out, "<h3 class=\"key\">{}</h3>", escape(&modified.key))?;
    writeln!(
        out,
        "<table><tr><th>Attribute</th><th>Removed</th><th>Added</th><th>Old values</th><th>New values</th></tr>"
    )?;
    for change in &modified.changes {
        write_change(out, change)?;
    }
    writeln!(out, "</table>")
}

fn write_change(out: &mut String, change: &AttributeChange) -> std::fmt::Result {
    write!(out, "<tr><td>{}</td>", escape(&change.attribute))?;
    write_values(out, "del", &change.removed)?;
    write_values(out, "add", &change.added)?;
    write_values(out, "", &change.old_values)?;
    write_values(out, "", &change.new_values)?;
    writeln!(out, "</tr>")
}

fn write_values(out: &mut String, class: &str, values: &[String]) -> std::fmt::Result {
    write!(out, "<td class=\"{}\"><ul class=\"values\">", class)?;
    for value in values {
        write!(out, "<li>{}</li>", escape(value))?;
    }
    write!(out, "</ul></td>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
