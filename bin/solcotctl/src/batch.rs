//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Administrative CLI for quoting and catalog maintenance."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use serde_json::json;
use solcot_engine::io::load_inputs_from_jsonl;
use solcot_logging::{log_quote_event, EventOutcome, QuoteLogContext};
use tracing::info;

use crate::Context;

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON Lines file with one quote input per line.
    #[arg(long, value_name = "FILE")]
    inputs: PathBuf,

    /// Also write reports for each quote under DIR/<quote_id>.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

/// Every input is attempted against the same snapshot; the command fails at the
/// end if any of them was rejected.
pub fn run(ctx: &Context, args: BatchArgs) -> Result<()> {
    let inputs = load_inputs_from_jsonl(&args.inputs)
        .with_context(|| format!("failed to read inputs {}", args.inputs.display()))?;
    let store = ctx.catalog_store()?;
    let snapshot = store.snapshot()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut rejected = 0usize;
    for (index, input) in inputs.iter().enumerate() {
        let record = match solcot_engine::quote(&snapshot, input) {
            Ok(summary) => {
                if let Some(dir) = &args.export {
                    summary
                        .exporter()
                        .export_all(&dir.join(summary.quote_id.to_string()))?;
                }
                json!({"index": index, "quote": summary})
            }
            Err(err) => {
                rejected += 1;
                log_quote_event(
                    Some(&QuoteLogContext::new().with_department(input.department.key())),
                    "batch.rejected",
                    &format!("input {index}: {err}"),
                    EventOutcome::Rejected,
                );
                json!({
                    "index": index,
                    "error": {"kind": err.kind(), "message": err.to_string()}
                })
            }
        };
        writeln!(out, "{}", serde_json::to_string(&record)?)?;
    }
    out.flush()?;

    info!(total = inputs.len(), rejected, "batch finished");
    if rejected > 0 {
        return Err(anyhow!("{rejected} of {} inputs were rejected", inputs.len()));
    }
    Ok(())
}
