//! Draft commands

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tabled::Tabled;
use ticketform::infrastructure::FileDraftStore;
use ticketform::ports::DraftStore;
use ticketform::DraftSnapshot;

use super::Context;
use crate::output;
use crate::DraftCommands;

#[derive(Debug, Serialize)]
struct DraftReport {
    key: String,
    path: String,
    fresh: bool,
    #[serde(flatten)]
    snapshot: DraftSnapshot,
}

#[derive(Tabled)]
struct ValueRow {
    field: String,
    value: String,
}

pub fn handle(ctx: &Context, action: DraftCommands) -> Result<()> {
    match action {
        DraftCommands::Show { dir, config } => {
            let config = ctx.form_config(config)?;
            let store = FileDraftStore::new(ctx.profile.draft_dir(dir)?);
            let key = config.persistence.storage_key.as_str();

            let Some(json) = store.get(key)? else {
                output::note(&format!("No draft stored under {}", key));
                return Ok(());
            };
            let snapshot = DraftSnapshot::from_json(&json)?;
            let report = DraftReport {
                key: key.to_string(),
                path: store.path_for(key).display().to_string(),
                fresh: snapshot.is_fresh(Utc::now(), config.persistence.freshness()),
                snapshot,
            };

            if ctx.format.is_table() {
                println!(
                    "Draft {} (step {}, saved {})",
                    report.key, report.snapshot.step, report.snapshot.timestamp
                );
                if !report.fresh {
                    output::failure("Draft is stale and will be discarded on next load");
                }
            }
            let rows = report
                .snapshot
                .form_data
                .iter()
                .map(|(field, value)| ValueRow { field: field.clone(), value: value.first().to_string() })
                .collect();
            ctx.format.print_rows(&report, rows);
        }
        DraftCommands::Clear { dir, config } => {
            let config = ctx.form_config(config)?;
            let store = FileDraftStore::new(ctx.profile.draft_dir(dir)?);
            store.remove(&config.persistence.storage_key)?;
            output::success(&format!("Draft {} cleared", config.persistence.storage_key));
        }
    }
    Ok(())
}
