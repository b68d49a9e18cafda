//! Validate command

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;
use ticketform::domain::aggregates::ErrorMap;
use ticketform::ValidationEngine;

use super::{filled_form, Context};
use crate::output;

#[derive(Debug, Serialize)]
struct Report {
    valid: bool,
    first_invalid: Option<String>,
    errors: ErrorMap,
}

#[derive(Tabled)]
struct ErrorRow {
    field: String,
    message: String,
}

pub fn handle(ctx: &Context, config: Option<PathBuf>, values: PathBuf) -> Result<()> {
    let config = ctx.form_config(config)?;
    let mut form = filled_form(&config, &values)?;

    let mut engine = ValidationEngine::new();
    let valid = engine.validate_form(&mut form);
    let report = Report {
        valid,
        first_invalid: form.first_invalid_field().map(|f| f.to_string()),
        errors: engine.errors().clone(),
    };

    let rows: Vec<ErrorRow> = report
        .errors
        .iter()
        .flat_map(|(field, messages)| {
            messages.iter().map(move |m| ErrorRow { field: field.clone(), message: m.clone() })
        })
        .collect();
    ctx.format.print_rows(&report, rows);

    if valid {
        if ctx.format.is_table() {
            output::success("All fields valid");
        }
        Ok(())
    } else {
        bail!("{} field(s) failed validation", report.errors.len())
    }
}
