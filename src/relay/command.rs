//! Chat command parsing

use crate::feed::normalize_symbol;
use thiserror::Error;

/// A parsed relay command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Quote for one symbol
    Price(String),
    /// Board for the session's watchlist
    Prices,
    /// BTC/ETH overview plus stream status
    Market,
    Add(String),
    Remove(String),
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("not a command")]
    NotACommand,
    #[error("unknown command /{0}")]
    Unknown(String),
    #[error("missing coin symbol, e.g. /{command} {example}")]
    MissingSymbol {
        command: &'static str,
        example: &'static str,
    },
}

impl Command {
    /// Parse `/name [arg]`; a `@botname` suffix on the name is ignored
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let mut parts = text.split_whitespace();
        let head = parts.next().ok_or(CommandError::NotACommand)?;
        let name = head.strip_prefix('/').ok_or(CommandError::NotACommand)?;
        let name = name.split('@').next().unwrap_or_default().to_lowercase();
        let arg = parts.next().map(normalize_symbol);

        let with_symbol = |command: &'static str, example: &'static str| {
            arg.clone()
                .ok_or(CommandError::MissingSymbol { command, example })
        };

        match name.as_str() {
            "start" => Ok(Command::Start),
            "help" => Ok(Command::Help),
            "price" | "xiaofa" => with_symbol("price", "BTC").map(Command::Price),
            "prices" => Ok(Command::Prices),
            "market" => Ok(Command::Market),
            "add" => with_symbol("add", "DOGE").map(Command::Add),
            "remove" => with_symbol("remove", "DOGE").map(Command::Remove),
            "list" => Ok(Command::List),
            _ => Err(CommandError::Unknown(name)),
        }
    }
}
