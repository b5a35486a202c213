//! Syntax highlighting for code blocks.
//!
//! The pipeline for one block:
//!
//! 1. resolve a grammar for the language hint, falling back to plain text
//! 2. tokenize the code lazily ([`Lexer::tokenize`])
//! 3. merge adjacent tokens of equal scope ([`coalesce`])
//! 4. write the tokens as HTML ([`Formatter::format`])
//!
//! A [`Highlighter`] owns the grammars and the formatter. Build it once and
//! hand it to a [`HighlightProcessor`], which plugs the pipeline into
//! [`MarkdownRenderer`](crate::MarkdownRenderer).

mod formatter;
mod lexer;

use std::collections::HashMap;

use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;

use crate::code_block::{CodeBlockProcessor, ProcessResult};

pub use formatter::{FALLBACK_STYLE, Formatter, FormatterOptions};
pub use lexer::{Coalesce, Lexer, Token, Tokens, coalesce};

/// Highlighting error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HighlightError {
    /// The configured color style does not exist.
    #[error("unable to set up output formatter: unknown style {0:?}")]
    Setup(String),

    #[error("tokenizing failed at line {line}: {message}")]
    Tokenize { line: usize, message: String },

    #[error("formatting failed: {0}")]
    Format(String),
}

impl From<std::fmt::Error> for HighlightError {
    fn from(err: std::fmt::Error) -> Self {
        Self::Format(err.to_string())
    }
}

/// Bundled grammars plus a configured formatter.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    formatter: Formatter,
}

impl Highlighter {
    /// Build the formatter and load the bundled grammars.
    pub fn new(options: FormatterOptions) -> Result<Self, HighlightError> {
        let formatter = Formatter::new(options, &ThemeSet::load_defaults())?;
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            formatter,
        })
    }

    /// Lexer for a language hint.
    ///
    /// The hint is matched against grammar names and file extensions,
    /// ignoring case. Empty or unknown hints get the plain-text grammar,
    /// which classifies nothing.
    pub fn resolve(&self, language: &str) -> Lexer<'_> {
        let syntax = if language.is_empty() {
            None
        } else {
            self.syntaxes.find_syntax_by_token(language)
        }
        .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        tracing::debug!(language, syntax = %syntax.name, "Resolved code block grammar");
        Lexer::new(&self.syntaxes, syntax)
    }

    /// Highlight `code` as a complete `<pre>` block.
    ///
    /// Nothing is returned on failure, so callers never see a partial block.
    pub fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightError> {
        let lexer = self.resolve(language);
        let mut html = String::with_capacity(code.len() * 2);
        self.formatter
            .format(language, coalesce(lexer.tokenize(code)), &mut html)?;
        Ok(html)
    }
}

/// Code block processor that highlights every block.
///
/// Failures are logged and recorded as warnings; the block then falls back
/// to the backend's plain rendering.
pub struct HighlightProcessor {
    highlighter: Result<Highlighter, HighlightError>,
    warnings: Vec<String>,
}

impl HighlightProcessor {
    /// Wrap the result of [`Highlighter::new`].
    ///
    /// A setup error is kept and reported for each block instead of
    /// highlighting it.
    pub fn new(highlighter: Result<Highlighter, HighlightError>) -> Self {
        Self {
            highlighter,
            warnings: Vec::new(),
        }
    }
}

impl CodeBlockProcessor for HighlightProcessor {
    fn process(
        &mut self,
        language: &str,
        _attrs: &HashMap<String, String>,
        source: &str,
        index: usize,
    ) -> ProcessResult {
        tracing::debug!(index, language, "Highlighting code block");
        let result = match &self.highlighter {
            Ok(highlighter) => highlighter.highlight(language, source),
            Err(err) => Err(err.clone()),
        };

        match result {
            Ok(html) => ProcessResult::Inline(html),
            Err(err) => {
                tracing::error!("Error parsing code block: {err}");
                self.warnings.push(format!("Error parsing code block: {err}"));
                ProcessResult::PassThrough
            }
        }
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
