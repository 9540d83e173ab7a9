/// Slash commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Appeal,
    Pending,
    View(Option<String>),
    Approve(Option<String>),
    Reject(Option<String>),
    Stats,
    Unknown(String),
}

impl Command {
    /// Parse `/name[@BotName] [arg]`. Returns `None` for text that is not a
    /// command at all, or one addressed to a bot other than `bot_username`.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Command> {
        let rest = text.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let head = parts.next()?;
        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }
        if let (Some(mention), Some(own)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(own.trim_start_matches('@')) {
                return None;
            }
        }
        let name = name.to_lowercase();
        let arg = parts.next().map(str::to_string);

        let cmd = match name.as_str() {
            "start" => Command::Start,
            "appeal" => Command::Appeal,
            "pending" => Command::Pending,
            "view" => Command::View(arg),
            "approve" => Command::Approve(arg),
            "reject" => Command::Reject(arg),
            "stats" => Command::Stats,
            _ => Command::Unknown(name),
        };
        Some(cmd)
    }
}
