use crate::core::{Conversation, Message, MessageId, Role};

pub const PROMPT: &str = "\u{276f} ";

const ERROR_ICON: &str = "[x] ";

fn label(message: &Message) -> &'static str {
    if message.is_error() {
        return ERROR_ICON;
    }
    match message.role {
        Role::User => "you: ",
        Role::Assistant => "bot: ",
        Role::System => "system: ",
    }
}

/// Wraps one message to `width` columns behind its role label.
#[must_use]
pub fn render_message(message: &Message, width: usize) -> String {
    let first = label(message);
    let rest = " ".repeat(first.chars().count());
    let options = textwrap::Options::new(width.max(first.len() + 1))
        .initial_indent(first)
        .subsequent_indent(&rest);

    message
        .content
        .lines()
        .enumerate()
        .flat_map(|(i, line)| {
            let options = if i == 0 {
                options.clone()
            } else {
                options.clone().initial_indent(&rest)
            };
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, options)
                    .into_iter()
                    .map(std::borrow::Cow::into_owned)
                    .collect()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[must_use]
pub fn terminal_width() -> u16 {
    terminal_size::terminal_size().map_or(80, |(terminal_size::Width(w), _)| w)
}

/// Tracks how much of the in-progress reply has already been printed.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    current: Option<MessageId>,
    printed: usize,
}

impl ReplyPrinter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the latest assistant message not yet handed out.
    ///
    /// Reconciled replies only ever grow, so the unseen part is a suffix.
    pub fn delta<'a>(&mut self, conversation: &'a Conversation) -> Option<&'a str> {
        let last = conversation.last()?;
        if last.role != Role::Assistant || last.is_error() {
            return None;
        }

        if self.current != Some(last.id) {
            self.current = Some(last.id);
            self.printed = 0;
        }

        let fresh = last.content.get(self.printed..)?;
        if fresh.is_empty() {
            return None;
        }
        self.printed = last.content.len();
        Some(fresh)
    }

    #[must_use]
    pub const fn has_output(&self) -> bool {
        self.current.is_some() && self.printed > 0
    }
}
