pub const TITLE: &str = "Caltech Course Bot";

pub const SUGGESTIONS_LABEL: &str = "Don't know what to ask? Try these prompts!";

pub const PROMPT_SUGGESTIONS: [&str; 3] = [
    "Are there any tennis courses at Caltech?",
    "I like philosophizing time travel. Are there any classes about this?",
    "What do students think about Caltech's intro CS courses?",
];

/// Narrower viewports stack the suggestions. Measured in terminal columns.
pub const STACKED_BELOW: u16 = 96;

const COLUMN_GAP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionLayout {
    Stacked,
    SideBySide,
}

impl SuggestionLayout {
    #[must_use]
    pub const fn for_width(width: u16) -> Self {
        if width < STACKED_BELOW {
            Self::Stacked
        } else {
            Self::SideBySide
        }
    }
}

/// Looks up a suggestion by its 1-based number as shown on screen.
#[must_use]
pub fn suggestion(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| PROMPT_SUGGESTIONS.get(index).copied())
}

#[must_use]
pub fn render_suggestions(width: u16) -> String {
    let mut out = format!("{SUGGESTIONS_LABEL}\n\n");
    match SuggestionLayout::for_width(width) {
        SuggestionLayout::Stacked => render_stacked(&mut out, usize::from(width)),
        SuggestionLayout::SideBySide => render_side_by_side(&mut out, usize::from(width)),
    }
    out
}

fn numbered_lines(number: usize, text: &str, width: usize) -> Vec<String> {
    let first = format!("[{number}] ");
    let rest = " ".repeat(first.len());
    let options = textwrap::Options::new(width.max(first.len() + 1))
        .initial_indent(&first)
        .subsequent_indent(&rest);
    textwrap::wrap(text, options)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect()
}

fn render_stacked(out: &mut String, width: usize) {
    for (i, text) in PROMPT_SUGGESTIONS.iter().enumerate() {
        for line in numbered_lines(i + 1, text, width) {
            out.push_str(&line);
            out.push('\n');
        }
    }
}

fn render_side_by_side(out: &mut String, width: usize) {
    let count = PROMPT_SUGGESTIONS.len();
    let column_width = (width.saturating_sub(COLUMN_GAP * (count - 1)) / count).max(8);

    let columns: Vec<Vec<String>> = PROMPT_SUGGESTIONS
        .iter()
        .enumerate()
        .map(|(i, text)| numbered_lines(i + 1, text, column_width))
        .collect();
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0);
    let gap = " ".repeat(COLUMN_GAP);

    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                let cell = column.get(row).map_or("", String::as_str);
                format!("{cell:<column_width$}")
            })
            .collect();
        out.push_str(cells.join(&gap).trim_end());
        out.push('\n');
    }
}
