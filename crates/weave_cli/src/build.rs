//! `weave build`: bring every artifact up to date.

use std::path::Path;

use crate::pipeline::{open_session, BuildReport};
use crate::GlobalArgs;

/// Runs the `weave build` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = open_session(global)?;
    if !global.quiet {
        eprintln!("   Building {}", session.config().project.name);
    }
    let report = session.build()?;
    if !global.quiet {
        print_report(&report);
    }
    Ok(0)
}

/// Prints one line per touched artifact and a summary line.
pub fn print_report(report: &BuildReport) {
    for path in &report.written {
        eprintln!("      Wrote {}", display(path));
    }
    for path in &report.deleted {
        eprintln!("    Deleted {}", display(path));
    }
    eprintln!("   {}", summary(report));
}

/// One-line summary of a build.
pub fn summary(report: &BuildReport) -> String {
    format!(
        "Finished {} governor{}: {} written, {} unchanged, {} deleted",
        report.governors,
        if report.governors == 1 { "" } else { "s" },
        report.written.len(),
        report.unchanged,
        report.deleted.len()
    )
}

fn display(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(|p| p.display().to_string()))
        .unwrap_or_else(|| path.display().to_string())
}
