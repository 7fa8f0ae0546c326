use anyhow::{Result, bail};

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Connect,
    Disconnect,
    Refresh,
    Status,
    SwitchSepolia,
    Send { to: String, amount: String },
    Token { token: String, holder: Option<String> },
    Help,
    Quit,
}

pub(crate) const HELP: &str = "commands: connect | disconnect | refresh | status | switch-sepolia | \
send <to> <amount> | token <address> [holder] | help | quit";

impl Command {
    /// Parses a command line. Blank lines yield `None`.
    pub(crate) fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("connect", []) => Command::Connect,
            ("disconnect", []) => Command::Disconnect,
            ("refresh", []) => Command::Refresh,
            ("status", []) => Command::Status,
            ("switch-sepolia", []) => Command::SwitchSepolia,
            ("send", [to, amount]) => Command::Send {
                to: (*to).to_owned(),
                amount: (*amount).to_owned(),
            },
            ("send", _) => bail!("usage: send <to> <amount>"),
            ("token", [token]) => Command::Token {
                token: (*token).to_owned(),
                holder: None,
            },
            ("token", [token, holder]) => Command::Token {
                token: (*token).to_owned(),
                holder: Some((*holder).to_owned()),
            },
            ("token", _) => bail!("usage: token <address> [holder]"),
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            (other, []) => bail!("unknown command '{other}'"),
            (other, _) => bail!("'{other}' takes no arguments or is unknown"),
        };
        Ok(Some(command))
    }
}
