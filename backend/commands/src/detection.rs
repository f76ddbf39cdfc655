/// Slash command detection for chat input.
use crate::registry::CommandRegistry;
use crate::types::{CommandArg, CommandInvocation};

/// What a `/`-prefixed input resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashInput {
    Command(CommandInvocation),
    /// Slash-prefixed but not a registered alias; holds the name without '/'.
    Unknown(String),
}

/// Detect a slash command at the start of a message.
/// Returns `None` if it's a normal message.
pub fn detect_command(text: &str, registry: &CommandRegistry) -> Option<SlashInput> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (alias_part, rest) = trimmed
        .split_once(|c: char| c.is_whitespace())
        .map(|(a, r)| (a, r.trim()))
        .unwrap_or((trimmed, ""));

    let Some(def) = registry.find_by_alias(alias_part) else {
        return Some(SlashInput::Unknown(alias_part.trim_start_matches('/').to_string()));
    };

    Some(SlashInput::Command(CommandInvocation {
        key: def.key.clone(),
        args: parse_args(rest, &def.args),
        raw_args: rest.to_string(),
    }))
}

/// One whitespace-separated token per declared arg; extra tokens are dropped.
fn parse_args(text: &str, arg_defs: &[CommandArg]) -> Vec<String> {
    if text.is_empty() || arg_defs.is_empty() {
        return vec![];
    }

    let mut result = Vec::new();
    let mut remaining = text.trim();

    for _ in arg_defs {
        if remaining.is_empty() { break; }
        let (token, rest) = remaining
            .split_once(|c: char| c.is_whitespace())
            .map(|(t, r)| (t.to_string(), r.trim()))
            .unwrap_or((remaining.to_string(), ""));
        result.push(token);
        remaining = rest;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(text: &str) -> CommandInvocation {
        match detect_command(text, &CommandRegistry::new()) {
            Some(SlashInput::Command(inv)) => inv,
            other => panic!("expected a command for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert!(detect_command("what are your skills?", &CommandRegistry::new()).is_none());
    }

    #[test]
    fn test_theme_with_and_without_arg() {
        let inv = command("/theme dark");
        assert_eq!(inv.key, "theme");
        assert_eq!(inv.arg(0), Some("dark"));

        assert!(command("  /theme  ").args.is_empty());
    }

    #[test]
    fn test_extra_tokens_are_ignored() {
        let inv = command("/jump work please");
        assert_eq!(inv.args, vec!["work"]);
        assert_eq!(inv.raw_args, "work please");
    }

    #[test]
    fn test_unknown_slash_name() {
        assert_eq!(
            detect_command("/dance now", &CommandRegistry::new()),
            Some(SlashInput::Unknown("dance".into()))
        );
    }
}
