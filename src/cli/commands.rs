use crate::ui::suggestions;

pub const HELP_TEXT: &str = r"Available commands:
/help        - Show this help message
/suggest <n> - Ask suggested prompt number n
/stop        - Hint: press Ctrl-C while a reply is streaming
/exit        - Exit the application";

#[derive(Debug, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Exit,
    Suggest(&'static str),
    Stop,
    Invalid(String),
    Unknown(String),
}

impl SlashCommand {
    pub fn parse(input: &str) -> Self {
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        match cmd {
            "/help" => Self::Help,
            "/exit" | "/quit" => Self::Exit,
            "/stop" => Self::Stop,
            "/suggest" => {
                let number = parts.next().and_then(|n| n.parse::<usize>().ok());
                match number.and_then(suggestions::suggestion) {
                    Some(text) => Self::Suggest(text),
                    None => Self::Invalid(format!(
                        "Usage: /suggest <1-{}>",
                        suggestions::PROMPT_SUGGESTIONS.len()
                    )),
                }
            }
            _ => Self::Unknown(cmd.to_string()),
        }
    }
}
