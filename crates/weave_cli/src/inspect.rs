//! `weave metadata`: build, then print one metadata item.

use weave_common::MetadataId;
use weave_metadata::MetadataItem;

use crate::pipeline::open_session;
use crate::{GlobalArgs, MetadataArgs, ReportFormat};

/// Runs the `weave metadata` command.
pub fn run(args: &MetadataArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mid = MetadataId::parse(&args.mid)?;
    let session = open_session(global)?;
    session.build()?;
    let item = session.engine().get(&mid)?;
    match args.format {
        ReportFormat::Text => print!("{}", render_text(&item)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json(&item)?)?),
    }
    Ok(0)
}

/// Human-readable description of an item.
pub fn render_text(item: &MetadataItem) -> String {
    let mut out = format!("id:       {}\n", item.id());
    out.push_str(&format!(
        "state:    {}\n",
        if item.is_valid() { "valid" } else { "invalid" }
    ));
    out.push_str(&format!("hash:     {}\n", item.hash()));
    if let Some(path) = item.artifact() {
        out.push_str(&format!("artifact: {}\n", path.display()));
    }
    if let Some(payload) = item.payload() {
        out.push('\n');
        out.push_str(&payload.rendered);
    }
    out
}

/// Machine-readable description of an item.
pub fn render_json(item: &MetadataItem) -> Result<serde_json::Value, serde_json::Error> {
    let members = match item.members() {
        Some(m) => serde_json::to_value(m)?,
        None => serde_json::Value::Null,
    };
    Ok(serde_json::json!({
        "id": item.id().as_str(),
        "valid": item.is_valid(),
        "hash": item.hash().to_string(),
        "artifact": item.artifact().map(|p| p.display().to_string()),
        "members": members,
    }))
}
