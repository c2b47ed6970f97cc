//! `weave status`: build, then list every item and the engine counters.

use weave_metadata::{CacheStats, MetadataEngine};

use crate::pipeline::open_session;
use crate::GlobalArgs;

/// Runs the `weave status` command.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = open_session(global)?;
    let report = session.build()?;
    if !global.quiet {
        eprintln!("   {}", crate::build::summary(&report));
    }
    for line in item_lines(session.engine()) {
        println!("{line}");
    }
    println!("{}", stats_line(&session.engine().stats()));
    Ok(0)
}

/// One line per cached item: state, MID, and artifact if any.
pub fn item_lines(engine: &MetadataEngine) -> Vec<String> {
    engine
        .cached_ids()
        .into_iter()
        .filter_map(|mid| engine.peek(&mid))
        .map(|item| {
            let state = if item.is_valid() { "valid" } else { "invalid" };
            match item.artifact() {
                Some(path) => format!("{state:<8}{} -> {}", item.id(), path.display()),
                None => format!("{state:<8}{}", item.id()),
            }
        })
        .collect()
}

/// The engine counters as one line.
pub fn stats_line(stats: &CacheStats) -> String {
    format!("cache: {stats}")
}
