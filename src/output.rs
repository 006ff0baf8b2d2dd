//! CLI output formatting for a completed render run.
//!
//! # Output Format
//!
//! One block per resource, in visiting order. The header is the resource's
//! address; indented lines list the pages written (relative to the output
//! root) and the input files that were skipped (relative to the input root).
//! Resources that produced nothing and skipped nothing are left out.
//!
//! ```text
//! <https://example.org/>
//!     → index@en.html
//!     → index@fr.html
//! <https://example.org/people>
//!     → people/index@en.html
//!     Skipped: people/notes.txt
//!
//! Rendered 3 pages for 2 resources (1 file skipped)
//! ```
//!
//! `format_*` functions are pure and return lines for testability;
//! [`print_report`] writes them to stdout.

use crate::walk::RenderReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

pub fn format_report(report: &RenderReport, input_root: &Path, output_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for resource in &report.resources {
        if resource.written.is_empty() && resource.skipped.is_empty() {
            continue;
        }
        lines.push(format!("<{}>", resource.address));
        for page in &resource.written {
            lines.push(format!("{}→ {}", indent(1), display_relative(page, output_root)));
        }
        for file in &resource.skipped {
            lines.push(format!(
                "{}Skipped: {}",
                indent(1),
                display_relative(file, input_root)
            ));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    let rendered_resources = report
        .resources
        .iter()
        .filter(|r| !r.written.is_empty())
        .count();
    let mut summary = format!(
        "Rendered {} for {}",
        plural(report.pages_written(), "page", "pages"),
        plural(rendered_resources, "resource", "resources"),
    );
    let skipped = report.files_skipped();
    if skipped > 0 {
        summary.push_str(&format!(" ({} skipped)", plural(skipped, "file", "files")));
    }
    lines.push(summary);
    lines
}

pub fn print_report(report: &RenderReport, input_root: &Path, output_root: &Path) {
    for line in format_report(report, input_root, output_root) {
        println!("{}", line);
    }
}
