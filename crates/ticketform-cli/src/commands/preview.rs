//! Preview command

use anyhow::Result;
use std::path::PathBuf;
use ticketform::{PreviewData, PreviewRenderer};

use super::{filled_form, Context};

pub fn handle(ctx: &Context, config: Option<PathBuf>, values: PathBuf) -> Result<()> {
    let config = ctx.form_config(config)?;
    let form = filled_form(&config, &values)?;
    let data = PreviewData::from_form(&form, &[]);

    if ctx.format.is_table() {
        println!("{}", PreviewRenderer::render_data(&data));
    } else {
        ctx.format.print(&data);
    }
    Ok(())
}
