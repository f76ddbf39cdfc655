pub mod detection;
pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod types;

use std::sync::Arc;

pub use detection::{detect_command, SlashInput};
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler, CommandResponse};
pub use handlers::{DownloadHandler, HelpHandler, JumpHandler, ThemeHandler};
pub use registry::{builtin_commands, CommandRegistry};
pub use types::{CommandArg, CommandDef, CommandInvocation};

/// Build a dispatcher pre-wired with all built-in handlers.
pub fn build_default_dispatcher() -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher.register("theme", Arc::new(ThemeHandler));
    dispatcher.register("jump", Arc::new(JumpHandler));
    dispatcher.register("download", Arc::new(DownloadHandler));
    dispatcher.register("help", Arc::new(HelpHandler { registry: CommandRegistry::new() }));
    dispatcher
}

/// Reply for a slash command that matched nothing in the registry.
pub fn unknown_command_reply(name: &str, registry: &CommandRegistry) -> String {
    let known: Vec<_> = registry
        .all()
        .iter()
        .filter(|c| c.key != "help")
        .map(|c| c.primary_alias())
        .collect();
    let list = match known.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{}, or {}", rest.join(", "), last),
        None => String::new(),
    };
    format!("Unknown command: /{name}. Try {list}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_command_reply_lists_commands() {
        let reply = unknown_command_reply("dance", &CommandRegistry::new());
        assert_eq!(reply, "Unknown command: /dance. Try /theme, /jump, or /download");
    }
}
