//! `folio ask`: one question, one answer.

use std::path::Path;

use anyhow::{bail, Result};
use folio_chat::SendOutcome;
use folio_config::FolioConfig;

use crate::session::build_session;
use crate::terminal_output::render_message;
use crate::ModeFlags;

pub async fn run(config: &FolioConfig, config_dir: &Path, flags: &ModeFlags, question: &str) -> Result<()> {
    let chat = build_session(config, config_dir, flags);
    // Settle the mode first so the answer comes from the engine that won.
    chat.initialize_engine().await;

    match chat.send_message(question).await {
        SendOutcome::Replied(message) | SendOutcome::Command(message) => {
            println!("{}", render_message(&message));
            Ok(())
        }
        SendOutcome::Ignored => bail!("Nothing to ask"),
        SendOutcome::RateLimited(e) | SendOutcome::Failed(e) => Err(e.into()),
    }
}
