/// Built-in command handlers.
///
/// Handlers only decide; the chat controller performs the returned action.
use anyhow::Result;
use async_trait::async_trait;
use folio_core::{Action, ThemeMode};
use tracing::debug;

use crate::dispatch::{CommandContext, CommandHandler, CommandResponse};
use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

// ---------------------------------------------------------------------------
// /help
// ---------------------------------------------------------------------------

pub struct HelpHandler {
    pub registry: CommandRegistry,
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(&self, _ctx: &CommandContext, _inv: &CommandInvocation) -> Result<CommandResponse> {
        let mut lines = vec!["Available commands:".to_string()];
        for cmd in self.registry.all() {
            lines.push(format!("  {}: {}", cmd.usage(), cmd.description));
        }
        Ok(CommandResponse::reply(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// /theme [dark|light]
// ---------------------------------------------------------------------------

pub struct ThemeHandler;

#[async_trait]
impl CommandHandler for ThemeHandler {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        let theme = match inv.arg(0) {
            None => ctx.current_theme.toggled(),
            Some(raw) => match raw.parse::<ThemeMode>() {
                Ok(theme) => theme,
                Err(_) => {
                    debug!(theme = raw, "Rejected theme argument");
                    return Ok(CommandResponse::reply(format!(
                        "Unknown theme `{raw}`. Use /theme dark or /theme light"
                    )));
                }
            },
        };
        Ok(CommandResponse::with_action(
            format!("Switched to {theme} mode"),
            Action::theme(theme, format!("{theme} mode")),
        ))
    }
}

// ---------------------------------------------------------------------------
// /jump <target>
// ---------------------------------------------------------------------------

pub struct JumpHandler;

#[async_trait]
impl CommandHandler for JumpHandler {
    async fn handle(&self, _ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        let target = inv.arg(0).map(|t| t.trim_start_matches('#')).unwrap_or_default();
        if target.is_empty() {
            return Ok(CommandResponse::reply("Usage: /jump <target>, e.g. /jump work"));
        }
        Ok(CommandResponse::with_action(
            format!("Jumped to {target} section"),
            Action::jump(format!("#{target}"), target),
        ))
    }
}

// ---------------------------------------------------------------------------
// /download resume
// ---------------------------------------------------------------------------

pub struct DownloadHandler;

#[async_trait]
impl CommandHandler for DownloadHandler {
    async fn handle(&self, ctx: &CommandContext, inv: &CommandInvocation) -> Result<CommandResponse> {
        match inv.arg(0) {
            Some(what) if what.eq_ignore_ascii_case("resume") => Ok(CommandResponse::with_action(
                "Resume download started",
                Action::download_as(ctx.resume_path.clone(), "Download Resume", ctx.resume_filename.clone()),
            )),
            Some(other) => Ok(CommandResponse::reply(format!(
                "Nothing to download for `{other}`. Try /download resume"
            ))),
            None => Ok(CommandResponse::reply("Usage: /download resume")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{detect_command, SlashInput};
    use crate::build_default_dispatcher;
    use folio_core::ActionType;

    fn ctx() -> CommandContext {
        CommandContext {
            current_theme: ThemeMode::Dark,
            resume_path: "assets/resume.pdf".into(),
            resume_filename: "Lukas_Nilsson_Resume.pdf".into(),
        }
    }

    async fn run(text: &str) -> CommandResponse {
        let inv = match detect_command(text, &CommandRegistry::new()) {
            Some(SlashInput::Command(inv)) => inv,
            other => panic!("not a command: {other:?}"),
        };
        build_default_dispatcher().dispatch(&ctx(), &inv).await.unwrap()
    }

    #[tokio::test]
    async fn test_theme_explicit_and_toggle() {
        let explicit = run("/theme light").await;
        assert_eq!(explicit.text, "Switched to light mode");
        assert_eq!(explicit.action.unwrap().target, "light");

        let toggled = run("/theme").await;
        assert_eq!(toggled.text, "Switched to light mode");
    }

    #[tokio::test]
    async fn test_invalid_theme_has_no_action() {
        let resp = run("/theme purple").await;
        assert!(resp.action.is_none());
        assert!(resp.text.contains("purple"));
    }

    #[tokio::test]
    async fn test_jump_prefixes_hash_once() {
        let resp = run("/jump #contact").await;
        assert_eq!(resp.text, "Jumped to contact section");
        let action = resp.action.unwrap();
        assert_eq!(action.action_type, ActionType::Jump);
        assert_eq!(action.target, "#contact");

        assert!(run("/jump").await.action.is_none());
    }

    #[tokio::test]
    async fn test_download_resume() {
        let resp = run("/download resume").await;
        assert_eq!(resp.text, "Resume download started");
        let action = resp.action.unwrap();
        assert_eq!(action.target, "assets/resume.pdf");
        assert_eq!(action.suggested_filename(), "Lukas_Nilsson_Resume.pdf");
        assert!(run("/download cv").await.action.is_none());
    }

    #[tokio::test]
    async fn test_help_lists_usage() {
        let resp = run("/help").await;
        assert!(resp.text.contains("/theme [dark|light]"));
        assert!(resp.text.contains("/download <resume>"));
    }
}
