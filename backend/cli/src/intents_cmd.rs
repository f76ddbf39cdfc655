//! `folio intents`: the rule engine's intent table, in match order.

use anyhow::Result;
use folio_engine::{respond, Intent};

use crate::terminal_output::render_table;

pub fn run() -> Result<()> {
    let rows: Vec<Vec<String>> = Intent::ALL
        .iter()
        .enumerate()
        .map(|(i, intent)| {
            let actions = respond(Some(*intent))
                .actions
                .iter()
                .map(|a| a.label.clone())
                .collect::<Vec<_>>()
                .join(", ");
            vec![(i + 1).to_string(), intent.to_string(), actions, intent.pattern().to_string()]
        })
        .collect();
    print!("{}", render_table(&["#", "Intent", "Actions", "Pattern"], &rows));
    Ok(())
}
