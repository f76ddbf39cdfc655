//! `folio chat`: interactive session.
//!
//! Lines starting with `/` are slash commands, `!N` runs the Nth action of
//! the latest bot message, and `:open`, `:close`, `:cancel`, `:quit` drive
//! the session itself.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use folio_chat::SendOutcome;
use folio_config::FolioConfig;
use folio_core::{Action, ChatEvent, Message, MessageId, Role};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::session::build_session;
use crate::terminal_output::{note_error, note_info, render_actions, render_message, speaker, stream_write};
use crate::ModeFlags;

const SHORTCUTS: [&str; 3] = ["Show me your projects", "Download resume", "How can I contact you?"];

/// One line of REPL input.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Quit,
    Open,
    Close,
    Cancel,
    /// 1-based action number.
    RunAction(usize),
    Send(&'a str),
}

fn parse_input(line: &str) -> ReplInput<'_> {
    let trimmed = line.trim();
    match trimmed {
        ":quit" | ":q" | ":exit" => ReplInput::Quit,
        ":open" => ReplInput::Open,
        ":close" => ReplInput::Close,
        ":cancel" => ReplInput::Cancel,
        _ => match trimmed.strip_prefix('!').map(str::parse::<usize>) {
            Some(Ok(n)) if n > 0 => ReplInput::RunAction(n),
            _ => ReplInput::Send(trimmed),
        },
    }
}

/// Actions of the most recent non-system bot message.
fn latest_actions(messages: &[Message]) -> Vec<Action> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Bot && !m.is_system && !m.streaming)
        .map(|m| m.actions.clone())
        .unwrap_or_default()
}

/// Writes transcript events to `out` until the session goes away. Tokens of
/// a streamed reply are written in place; whole messages are written when
/// appended or completed.
async fn render_events<W: Write>(
    mut events: broadcast::Receiver<ChatEvent>,
    out: &mut W,
) -> std::io::Result<()> {
    let mut streamed: HashSet<MessageId> = HashSet::new();

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Transcript renderer fell behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            ChatEvent::MessageAppended { message } if message.role == Role::User => {}
            ChatEvent::MessageAppended { message } if message.streaming => {}
            ChatEvent::MessageAppended { message } => writeln!(out, "{}", render_message(&message))?,
            ChatEvent::Token { id, token } => {
                if streamed.insert(id) {
                    stream_write(&mut *out, &format!("{} ", speaker(&Message::bot("", Vec::new()))))?;
                }
                stream_write(&mut *out, &token)?;
            }
            ChatEvent::MessageCompleted { message } => {
                if streamed.remove(&message.id) {
                    writeln!(out)?;
                    if !message.actions.is_empty() {
                        writeln!(out, "{}", render_actions(&message.actions))?;
                    }
                } else {
                    writeln!(out, "{}", render_message(&message))?;
                }
            }
            ChatEvent::MessageRemoved { id } => {
                if streamed.remove(&id) {
                    writeln!(out)?;
                }
            }
            ChatEvent::ModeChanged { mode } => debug!(%mode, "Mode changed"),
            ChatEvent::VisibilityChanged { open } => debug!(open, "Visibility changed"),
        }
        out.flush()?;
    }
    Ok(())
}

pub async fn run(config: &FolioConfig, config_dir: &Path, flags: &ModeFlags) -> Result<()> {
    let chat = build_session(config, config_dir, flags);

    // Subscribe before anything can publish; greeting and diagnostics were
    // appended earlier and come from the snapshot.
    let events = chat.subscribe();
    for message in chat.snapshot().messages {
        println!("{}", render_message(&message));
    }
    let renderer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        if let Err(e) = render_events(events, &mut stdout).await {
            warn!(error = %e, "Transcript renderer stopped");
        }
    });

    note_info(&format!("Try: {}", SHORTCUTS.join(" · ")));
    note_info("Commands: /theme, /jump, /download, /help · !N runs an action · :quit exits");

    let _ = chat.open();
    let auto_init = chat.spawn_auto_init();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            ReplInput::Quit => break,
            ReplInput::Open => {
                let _ = chat.open();
            }
            ReplInput::Close => chat.close(),
            ReplInput::Cancel => {
                if !chat.cancel_initialization() {
                    note_info("Nothing is loading");
                }
            }
            ReplInput::RunAction(n) => {
                let actions = latest_actions(&chat.snapshot().messages);
                match actions.get(n - 1) {
                    Some(action) => {
                        if let Err(e) = chat.handle_action(action) {
                            note_error(&e.to_string());
                        }
                    }
                    None => note_error(&format!("No action !{n} on the last reply")),
                }
            }
            ReplInput::Send(text) => match chat.send_message(text).await {
                SendOutcome::Failed(e) => debug!(error = %e, "Reply failed"),
                outcome => debug!(?outcome, "Message handled"),
            },
        }
        // Let the renderer catch up before the next prompt.
        tokio::task::yield_now().await;
    }

    chat.cancel_initialization();
    auto_init.abort();
    renderer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal_output::strip_ansi;
    use folio_engine::InitOutcome;

    #[test]
    fn parses_repl_input() {
        assert_eq!(parse_input(" :q "), ReplInput::Quit);
        assert_eq!(parse_input("!2"), ReplInput::RunAction(2));
        assert_eq!(parse_input("!0"), ReplInput::Send("!0"));
        assert_eq!(parse_input("!wow"), ReplInput::Send("!wow"));
        assert_eq!(parse_input("/theme dark"), ReplInput::Send("/theme dark"));
    }

    #[test]
    fn latest_actions_skip_system_notices() {
        let messages = vec![
            Message::bot("Hi", vec![Action::jump("#work", "View Projects")]),
            Message::system("Local AI model ready!"),
        ];
        assert_eq!(latest_actions(&messages).len(), 1);
        assert!(latest_actions(&[]).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn renderer_subscribed_before_open_shows_loading_notice() {
        let dir = std::env::temp_dir().join(format!("folio-chat-{}", uuid::Uuid::new_v4()));
        let flags = ModeFlags { seed: Some(3), ..Default::default() };
        let chat = build_session(&FolioConfig::default(), &dir, &flags);

        let events = chat.subscribe();
        let outcome = chat.open().expect("first open starts initialization").await.unwrap();
        assert!(matches!(outcome, InitOutcome::Ready(_)));
        // Closes the event stream once the buffered events are drained.
        drop(chat);

        let mut out = Vec::new();
        render_events(events, &mut out).await.unwrap();
        let text = strip_ansi(&String::from_utf8(out).unwrap());
        let loading = text.find("Loading on-device model (~1.5GB)...").expect("loading notice");
        let ready = text.find("Local AI model ready!").expect("ready notice");
        assert!(loading < ready);
    }
}
