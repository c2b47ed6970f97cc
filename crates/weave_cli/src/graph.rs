//! `weave graph`: build, then print the dependency registry.

use weave_graph::GraphSnapshot;
use weave_metadata::MetadataEngine;

use crate::pipeline::open_session;
use crate::{GlobalArgs, GraphArgs, GraphFormat};

/// Runs the `weave graph` command.
pub fn run(args: &GraphArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = open_session(global)?;
    session.build()?;
    let output = match args.format {
        GraphFormat::Text => render_text(session.engine()),
        GraphFormat::Dot => GraphSnapshot::from_registry(&session.engine().registry()).to_dot(),
    };
    print!("{output}");
    Ok(0)
}

/// Renders every edge as `upstream -> downstream`, followed by a cycle report.
pub fn render_text(engine: &MetadataEngine) -> String {
    let registry = engine.registry();
    let mut out = String::new();
    for (upstream, downstream) in registry.edges() {
        out.push_str(&format!("{upstream} -> {downstream}\n"));
    }
    let cycles = GraphSnapshot::from_registry(&registry).cycles();
    if cycles.is_empty() {
        out.push_str("no cycles\n");
    } else {
        for cycle in cycles {
            let names: Vec<&str> = cycle.iter().map(|m| m.as_str()).collect();
            out.push_str(&format!("cycle: {}\n", names.join(" -> ")));
        }
    }
    out
}
