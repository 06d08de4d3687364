pub mod suggestions;
pub mod transcript;

pub use suggestions::{SuggestionLayout, render_suggestions};
pub use transcript::{ReplyPrinter, render_message, terminal_width};
