//! In-channel trigger commands.
//!
//! Maps trigger words (the first word of a channel message) to typed
//! [`BotCommand`] values the dispatcher can act on. Matching is exact and
//! case-sensitive.

use std::collections::HashMap;

/// A command the bot performs when triggered in its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Leave the server, using any remaining words as the quit reason.
    Quit,
}

pub const QUIT_TRIGGER: &str = "!QUIT";

/// Trigger word → command lookup.
#[derive(Debug, Clone)]
pub struct CommandTable {
    commands: HashMap<String, BotCommand>,
}

impl CommandTable {
    pub fn empty() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    pub fn register(&mut self, trigger: &str, command: BotCommand) {
        self.commands.insert(trigger.to_string(), command);
    }

    /// Resolve a trigger word. Returns `None` for anything not registered.
    pub fn lookup(&self, trigger: &str) -> Option<BotCommand> {
        self.commands.get(trigger).copied()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(QUIT_TRIGGER, BotCommand::Quit);
        table
    }
}
