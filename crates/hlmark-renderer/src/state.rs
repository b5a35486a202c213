//! State structs tracking context during event processing.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

use crate::backend::Footnote;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Language of current code block (e.g., "rust", "python").
    language: Option<String>,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    /// Start a new code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    /// Check if we're inside a code block.
    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Append text to the code block buffer.
    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    /// Whether we're inside the table header row.
    in_head: bool,
    /// Column alignments for current table.
    alignments: Vec<Alignment>,
    /// Current column index in table row.
    cell_index: usize,
}

impl TableState {
    /// Start a new table with column alignments.
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Get the alignment style for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for tracking image alt text capture.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
}

impl ImageState {
    /// Start capturing image alt text.
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.alt_text.clear();
    }

    /// End image capture and return the alt text.
    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.alt_text)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// State for footnote numbering and definition capture.
///
/// Definitions are rendered into their own buffer: while one is open, the
/// renderer's main output is parked here and restored when it closes.
#[derive(Default)]
pub(crate) struct FootnoteState {
    /// Label to number, assigned in order of first reference.
    numbers: HashMap<String, usize>,
    /// Completed definitions as (label, html), in source order.
    definitions: Vec<(String, String)>,
    /// Open definition label and the parked outer output.
    open: Option<(String, String)>,
}

impl FootnoteState {
    /// Number for `label`, assigning the next one on first use.
    pub(crate) fn number(&mut self, label: &str) -> usize {
        let next = self.numbers.len() + 1;
        *self.numbers.entry(label.to_owned()).or_insert(next)
    }

    /// Open a definition, parking the current outer output.
    pub(crate) fn start_definition(&mut self, label: &str, outer: String) {
        self.open = Some((label.to_owned(), outer));
    }

    /// Close the open definition with its rendered body.
    ///
    /// Returns the parked outer output, or `None` if no definition was open.
    pub(crate) fn end_definition(&mut self, body: String) -> Option<String> {
        let (label, outer) = self.open.take()?;
        self.definitions.push((label, body));
        Some(outer)
    }

    /// Take the collected footnotes ordered by number.
    ///
    /// Definitions that were never referenced are numbered after the
    /// referenced ones, in source order. References without a definition
    /// produce no entry.
    pub(crate) fn take_footnotes(&mut self) -> Vec<Footnote> {
        let definitions = std::mem::take(&mut self.definitions);
        let mut footnotes: Vec<Footnote> = definitions
            .into_iter()
            .map(|(label, html)| Footnote {
                number: self.number(&label),
                label,
                html,
            })
            .collect();
        footnotes.sort_by_key(|footnote| footnote.number);
        footnotes
    }
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    push_escaped(&mut result, s);
    result
}

/// Append `s` to `out` with HTML special characters escaped.
pub(crate) fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        push_escaped_char(out, c);
    }
}

pub(crate) fn push_escaped_char(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        _ => out.push(c),
    }
}
