/// Slash command registry for the chat drawer.
use crate::types::{CommandArg, CommandDef};

fn arg(name: &str, description: &str, required: bool, choices: &[&str]) -> CommandArg {
    CommandArg {
        name: name.to_string(),
        description: description.to_string(),
        required,
        choices: choices.iter().map(|s| s.to_string()).collect(),
    }
}

/// Build the built-in command list.
pub fn builtin_commands() -> Vec<CommandDef> {
    vec![
        CommandDef {
            key: "theme".into(),
            description: "Switch the site theme (toggles when no mode is given).".into(),
            text_aliases: vec!["/theme".into()],
            args: vec![arg("mode", "Theme mode", false, &["dark", "light"])],
        },
        CommandDef {
            key: "jump".into(),
            description: "Scroll to a page section.".into(),
            text_aliases: vec!["/jump".into(), "/goto".into()],
            args: vec![arg("target", "Section id, e.g. work or contact", true, &[])],
        },
        CommandDef {
            key: "download".into(),
            description: "Download a file.".into(),
            text_aliases: vec!["/download".into()],
            args: vec![arg("file", "What to download", true, &["resume"])],
        },
        CommandDef {
            key: "help".into(),
            description: "Show available commands.".into(),
            text_aliases: vec!["/help".into(), "/commands".into()],
            args: vec![],
        },
    ]
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

pub struct CommandRegistry {
    commands: Vec<CommandDef>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: builtin_commands() }
    }

    pub fn all(&self) -> &[CommandDef] {
        &self.commands
    }

    /// Find a command by slash-text alias (e.g. "/theme").
    pub fn find_by_alias(&self, alias: &str) -> Option<&CommandDef> {
        let lower = alias.to_lowercase();
        self.commands.iter().find(|c| {
            c.text_aliases.iter().any(|a| a.to_lowercase() == lower)
        })
    }

    /// Find a command by its key.
    pub fn find_by_key(&self, key: &str) -> Option<&CommandDef> {
        self.commands.iter().find(|c| c.key == key)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_are_case_insensitive() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find_by_alias("/THEME").unwrap().key, "theme");
        assert_eq!(registry.find_by_alias("/goto").unwrap().key, "jump");
        assert!(registry.find_by_alias("/dance").is_none());
    }

    #[test]
    fn test_usage_lines() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.find_by_key("theme").unwrap().usage(), "/theme [dark|light]");
        assert_eq!(registry.find_by_key("jump").unwrap().usage(), "/jump <target>");
    }

    #[test]
    fn test_every_alias_is_slash_prefixed() {
        for def in builtin_commands() {
            assert!(def.text_aliases.iter().all(|a| a.starts_with('/')), "{}", def.key);
        }
    }
}
