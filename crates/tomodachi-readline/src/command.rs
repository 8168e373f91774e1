//! REPL input parsing.

use std::path::PathBuf;

/// Slash commands offered for completion, in display order.
pub const COMMANDS: [&str; 7] = [
    "/quiz", "/image", "/summary", "/reset", "/age", "/name", "/history",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Quiz,
    Image(PathBuf),
    Summary,
    Reset,
    Age(u32),
    Name(String),
    History,
    /// Plain text sent to the characters.
    Chat(String),
    /// A slash command with missing or bad arguments.
    Usage(&'static str),
}

impl Command {
    /// Parses one trimmed REPL line. Unknown slash words are chat text.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line == "quit" || line == "exit" {
            return Self::Quit;
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head {
            "/quiz" => Self::Quiz,
            "/summary" => Self::Summary,
            "/reset" => Self::Reset,
            "/history" => Self::History,
            "/image" if rest.is_empty() => Self::Usage("/image <path>"),
            "/image" => Self::Image(PathBuf::from(rest)),
            "/age" => match rest.parse::<u32>() {
                Ok(age) => Self::Age(age),
                Err(_) => Self::Usage("/age <数字>"),
            },
            "/name" if rest.is_empty() => Self::Usage("/name <名前>"),
            "/name" => Self::Name(rest.to_string()),
            _ => Self::Chat(line.to_string()),
        }
    }
}
