/// Slash command types.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Arg
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandArg {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub choices: Vec<String>,
}

// ---------------------------------------------------------------------------
// Command definition
// ---------------------------------------------------------------------------

/// A slash command entry in the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDef {
    /// Unique key (e.g. "theme", "jump").
    pub key: String,
    pub description: String,
    /// Slash aliases (must start with '/').
    pub text_aliases: Vec<String>,
    pub args: Vec<CommandArg>,
}

impl CommandDef {
    /// Primary alias (first in list), or key if none.
    pub fn primary_alias(&self) -> &str {
        self.text_aliases.first().map(|s| s.as_str()).unwrap_or(&self.key)
    }

    /// `/jump <target>` style usage line.
    pub fn usage(&self) -> String {
        let mut usage = self.primary_alias().to_string();
        for arg in &self.args {
            let label = if arg.choices.is_empty() {
                arg.name.clone()
            } else {
                arg.choices.join("|")
            };
            if arg.required {
                usage.push_str(&format!(" <{label}>"));
            } else {
                usage.push_str(&format!(" [{label}]"));
            }
        }
        usage
    }
}

// ---------------------------------------------------------------------------
// Parsed invocation
// ---------------------------------------------------------------------------

/// A detected and parsed slash-command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub key: String,
    /// Positional arguments parsed from remaining text.
    pub args: Vec<String>,
    /// Full remaining text after the command name.
    pub raw_args: String,
}

impl CommandInvocation {
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|s| s.as_str())
    }
}
