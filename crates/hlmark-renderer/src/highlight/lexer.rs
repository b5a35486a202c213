//! Lazy tokenization of code into scope-tagged tokens.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::iter::Enumerate;

use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::HighlightError;

/// A run of source text sharing one classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token<'a> {
    /// Source text, including any trailing newline.
    pub text: Cow<'a, str>,
    /// Innermost scope below the syntax's root scope.
    ///
    /// `None` for text the grammar leaves unclassified.
    pub scope: Option<Scope>,
    /// Zero-based source line the token belongs to.
    pub line: usize,
}

/// A grammar bound to the syntax set it was loaded from.
pub struct Lexer<'s> {
    syntaxes: &'s SyntaxSet,
    syntax: &'s SyntaxReference,
}

impl<'s> Lexer<'s> {
    pub fn new(syntaxes: &'s SyntaxSet, syntax: &'s SyntaxReference) -> Self {
        Self { syntaxes, syntax }
    }

    /// Display name of the grammar (e.g. "Python", "Plain Text").
    pub fn name(&self) -> &str {
        &self.syntax.name
    }

    /// Tokenize `code` lazily, one source line at a time.
    pub fn tokenize<'a>(&'a self, code: &'a str) -> Tokens<'a> {
        Tokens {
            syntaxes: self.syntaxes,
            lines: LinesWithEndings::from(code).enumerate(),
            state: ParseState::new(self.syntax),
            stack: ScopeStack::new(),
            pending: VecDeque::new(),
            failed: false,
        }
    }
}

/// Iterator over the tokens of one code block.
///
/// Stops after the first error.
pub struct Tokens<'a> {
    syntaxes: &'a SyntaxSet,
    lines: Enumerate<LinesWithEndings<'a>>,
    state: ParseState,
    stack: ScopeStack,
    pending: VecDeque<Token<'a>>,
    failed: bool,
}

impl<'a> Tokens<'a> {
    fn tokenize_line(&mut self, number: usize, line: &'a str) -> Result<(), HighlightError> {
        let ops = self
            .state
            .parse_line(line, self.syntaxes)
            .map_err(|err| HighlightError::Tokenize {
                line: number + 1,
                message: err.to_string(),
            })?;

        let mut cursor = 0;
        for (offset, op) in ops {
            if offset > cursor {
                self.push(number, &line[cursor..offset]);
                cursor = offset;
            }
            self.stack
                .apply(&op)
                .map_err(|err| HighlightError::Tokenize {
                    line: number + 1,
                    message: format!("{err:?}"),
                })?;
        }
        if cursor < line.len() {
            self.push(number, &line[cursor..]);
        }
        Ok(())
    }

    fn push(&mut self, line: usize, text: &'a str) {
        let scope = match self.stack.as_slice() {
            [_root, .., innermost] => Some(*innermost),
            _ => None,
        };
        self.pending.push_back(Token {
            text: Cow::Borrowed(text),
            scope,
            line,
        });
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Token<'a>, HighlightError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.failed {
                return None;
            }
            let (number, line) = self.lines.next()?;
            if let Err(err) = self.tokenize_line(number, line) {
                self.failed = true;
                self.pending.clear();
                return Some(Err(err));
            }
        }
    }
}

/// Merge adjacent tokens on the same line that share a scope.
///
/// Grammars often emit several consecutive runs with the same
/// classification; merging them yields one span per run of equal style.
/// Tokens on different lines are never merged.
pub fn coalesce<'a, I>(tokens: I) -> Coalesce<'a, I::IntoIter>
where
    I: IntoIterator<Item = Result<Token<'a>, HighlightError>>,
{
    Coalesce {
        tokens: tokens.into_iter(),
        held: None,
    }
}

/// Iterator returned by [`coalesce`].
pub struct Coalesce<'a, I> {
    tokens: I,
    held: Option<Token<'a>>,
}

impl<'a, I> Iterator for Coalesce<'a, I>
where
    I: Iterator<Item = Result<Token<'a>, HighlightError>>,
{
    type Item = Result<Token<'a>, HighlightError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = match self.tokens.next() {
                Some(Ok(token)) => token,
                Some(Err(err)) => {
                    self.held = None;
                    return Some(Err(err));
                }
                None => return self.held.take().map(Ok),
            };

            match self.held.take() {
                Some(mut held) if held.scope == token.scope && held.line == token.line => {
                    held.text.to_mut().push_str(&token.text);
                    self.held = Some(held);
                }
                Some(held) => {
                    self.held = Some(token);
                    return Some(Ok(held));
                }
                None => self.held = Some(token),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scope(name: &str) -> Option<Scope> {
        Some(Scope::new(name).unwrap())
    }

    fn token(text: &str, scope: Option<Scope>, line: usize) -> Result<Token<'_>, HighlightError> {
        Ok(Token {
            text: Cow::Borrowed(text),
            scope,
            line,
        })
    }

    fn texts(tokens: Vec<Token<'_>>) -> Vec<String> {
        tokens.into_iter().map(|t| t.text.into_owned()).collect()
    }

    #[test]
    fn test_plain_text_is_unclassified() {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let lexer = Lexer::new(&syntaxes, syntaxes.find_syntax_plain_text());
        let tokens: Vec<_> = lexer
            .tokenize("a < b\nc\n")
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(tokens.iter().all(|t| t.scope.is_none()));
        assert_eq!(tokens.first().map(|t| t.line), Some(0));
        assert_eq!(tokens.last().map(|t| t.line), Some(1));
        assert_eq!(texts(tokens).concat(), "a < b\nc\n");
    }

    #[test]
    fn test_python_keyword_is_classified() {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let python = syntaxes.find_syntax_by_token("python").unwrap();
        let lexer = Lexer::new(&syntaxes, python);
        assert_eq!(lexer.name(), "Python");

        let tokens: Vec<_> = coalesce(lexer.tokenize("def f(): pass\n"))
            .collect::<Result<_, _>>()
            .unwrap();
        let def = tokens.iter().find(|t| t.text == "def").unwrap();
        assert!(def.scope.is_some());
        assert_eq!(texts(tokens).concat(), "def f(): pass\n");
    }

    #[test]
    fn test_tokenize_empty_code() {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let lexer = Lexer::new(&syntaxes, syntaxes.find_syntax_plain_text());
        assert_eq!(lexer.tokenize("").count(), 0);
    }

    #[test]
    fn test_tokenize_without_trailing_newline() {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let go = syntaxes.find_syntax_by_token("go").unwrap();
        let lexer = Lexer::new(&syntaxes, go);
        let tokens: Vec<_> = lexer
            .tokenize("x := 1")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(texts(tokens).concat(), "x := 1");
    }

    #[test]
    fn test_coalesce_merges_same_scope() {
        let keyword = scope("keyword.control");
        let merged: Vec<_> = coalesce(vec![
            token("i", keyword, 0),
            token("f", keyword, 0),
            token(" ", None, 0),
            token("x", None, 0),
        ])
        .collect::<Result<_, _>>()
        .unwrap();

        assert_eq!(texts(merged), vec!["if", " x"]);
    }

    #[test]
    fn test_coalesce_keeps_lines_apart() {
        let comment = scope("comment.block");
        let merged: Vec<_> = coalesce(vec![
            token("/* a\n", comment, 0),
            token("b */", comment, 1),
        ])
        .collect::<Result<_, _>>()
        .unwrap();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].line, 1);
    }

    #[test]
    fn test_coalesce_keeps_scopes_apart() {
        let merged: Vec<_> = coalesce(vec![
            token("\"", scope("punctuation.definition.string"), 0),
            token("hi", scope("string.quoted"), 0),
        ])
        .collect::<Result<_, _>>()
        .unwrap();

        assert_eq!(texts(merged), vec!["\"", "hi"]);
    }

    #[test]
    fn test_coalesce_passes_errors_through() {
        let error = HighlightError::Format("boom".to_owned());
        let mut tokens = coalesce(vec![token("a", None, 0), Err(error.clone())]);
        assert_eq!(tokens.next(), Some(Err(error)));
        assert_eq!(tokens.next(), None);
    }
}
