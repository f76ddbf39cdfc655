//! `folio config`: print (or write) the effective configuration.

use std::path::Path;

use anyhow::Result;
use folio_config::{validate, write_config, FolioConfig};

use crate::terminal_output::{note_info, note_success, note_warn};

pub async fn run(config: &FolioConfig, path: &Path, init: bool) -> Result<()> {
    note_info(&format!("Config file: {}", path.display()));
    print!("{}", serde_yaml::to_string(config)?);

    for warning in validate(config).warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }

    if init {
        write_config(config, path).await?;
        note_success(&format!("Wrote {}", path.display()));
    }
    Ok(())
}
