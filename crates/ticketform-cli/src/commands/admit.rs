//! Admit command

use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::Tabled;
use ticketform::infrastructure::ObjectUrlRegistry;
use ticketform::{FileCandidate, FileUploadTracker};

use super::Context;
use crate::output;

#[derive(Debug, Serialize)]
struct Report {
    accepted: Vec<AcceptedFile>,
    rejected: Vec<RejectedFile>,
    notification: Option<String>,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct AcceptedFile {
    name: String,
    size: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    mime_type: String,
    icon: String,
}

#[derive(Debug, Serialize)]
struct RejectedFile {
    name: String,
    reason: String,
}

/// Parse `name:size:mime`; the name may itself contain colons
pub fn parse_candidate(spec: &str) -> Result<FileCandidate> {
    let mut parts = spec.rsplitn(3, ':');
    let (Some(mime), Some(size), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(anyhow!("expected name:size:mime, got {:?}", spec));
    };
    let size: u64 = size.parse().with_context(|| format!("invalid size in {:?}", spec))?;
    Ok(FileCandidate::new(name, size, mime))
}

pub fn handle(ctx: &Context, config: Option<PathBuf>, files: Vec<String>) -> Result<()> {
    let config = ctx.form_config(config)?;
    let candidates = files
        .iter()
        .map(|f| parse_candidate(f))
        .collect::<Result<Vec<_>>>()?;

    let mut tracker = FileUploadTracker::new(config.upload, Arc::new(ObjectUrlRegistry::new()));
    let admission = tracker.add_files(candidates);

    let report = Report {
        accepted: tracker
            .files()
            .iter()
            .map(|f| AcceptedFile {
                name: f.name().to_string(),
                size: f.formatted_size(),
                mime_type: f.mime_type().to_string(),
                icon: f.icon().to_string(),
            })
            .collect(),
        rejected: admission
            .rejected
            .iter()
            .map(|r| RejectedFile { name: r.file.name.clone(), reason: r.reason.to_string() })
            .collect(),
        notification: admission.notification(),
    };

    if !ctx.format.is_table() {
        ctx.format.print(&report);
        return Ok(());
    }

    if report.accepted.is_empty() {
        output::note("No files selected");
    }
    let count = report.accepted.len();
    ctx.format.print_rows(&report, report.accepted.clone());
    match &report.notification {
        Some(message) => output::failure(message),
        None => output::success(&format!("{} file(s) accepted", count)),
    }
    Ok(())
}
