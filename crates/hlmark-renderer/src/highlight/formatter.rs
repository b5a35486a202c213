//! HTML formatting of token streams.

use std::fmt::Write;

use syntect::highlighting::{Color, FontStyle, Highlighter as StyleResolver, Style, Theme, ThemeSet};
use syntect::html::{ClassStyle, css_for_theme_with_class_style};
use syntect::parsing::Scope;

use super::{HighlightError, Token};
use crate::state::{escape_html, push_escaped};

/// Color style used when none is configured.
pub const FALLBACK_STYLE: &str = "InspiredGitHub";

/// Formatter configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatterOptions {
    /// Emit CSS classes instead of inline `style` attributes.
    pub with_classes: bool,
    /// Tab stop width in columns.
    pub tab_width: usize,
    /// Name of the bundled color style.
    pub style: String,
}

impl Default for FormatterOptions {
    fn default() -> Self {
        Self {
            with_classes: true,
            tab_width: 4,
            style: FALLBACK_STYLE.to_owned(),
        }
    }
}

#[cfg(test)]
thread_local! {
    static SETUP_CALLS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Number of formatters built on the current thread.
#[cfg(test)]
pub(crate) fn setup_calls() -> usize {
    SETUP_CALLS.with(std::cell::Cell::get)
}

/// Writes token streams as HTML.
///
/// Output shape:
///
/// ```text
/// <pre class="highlight"><code class="language-go">
///   <span class="line"><span class="keyword control go">if</span> x</span>
///   ...
/// </code></pre>
/// ```
///
/// (whitespace added for readability; the real output has none between
/// tags). Class names are the dot-separated parts of the token's scope.
pub struct Formatter {
    options: FormatterOptions,
    theme: Theme,
}

impl Formatter {
    /// Build a formatter, resolving the configured style from `themes`.
    pub fn new(options: FormatterOptions, themes: &ThemeSet) -> Result<Self, HighlightError> {
        let theme = themes
            .themes
            .get(options.style.as_str())
            .cloned()
            .ok_or_else(|| HighlightError::Setup(options.style.clone()))?;

        #[cfg(test)]
        SETUP_CALLS.with(|calls| calls.set(calls.get() + 1));

        Ok(Self { options, theme })
    }

    /// Format `tokens` as a highlighted code block appended to `out`.
    ///
    /// Returns the first error in the stream; `out` then holds whatever was
    /// written before it.
    pub fn format<'a, I>(&self, language: &str, tokens: I, out: &mut String) -> Result<(), HighlightError>
    where
        I: IntoIterator<Item = Result<Token<'a>, HighlightError>>,
    {
        let resolver = (!self.options.with_classes).then(|| StyleResolver::new(&self.theme));

        self.open_block(language, out)?;

        let mut line = None;
        for token in tokens {
            let token = token?;
            if line != Some(token.line) {
                if line.is_some() {
                    out.push_str("</span>");
                }
                out.push_str(r#"<span class="line">"#);
                line = Some(token.line);
            }

            match (token.scope, &resolver) {
                (None, _) => push_escaped(out, &token.text),
                (Some(scope), None) => {
                    write!(out, r#"<span class="{}">"#, scope_classes(scope))?;
                    push_escaped(out, &token.text);
                    out.push_str("</span>");
                }
                (Some(scope), Some(resolver)) => {
                    let style = resolver.style_for_stack(&[scope]);
                    write!(out, r#"<span style="{}">"#, inline_style(style))?;
                    push_escaped(out, &token.text);
                    out.push_str("</span>");
                }
            }
        }
        if line.is_some() {
            out.push_str("</span>");
        }

        out.push_str("</code></pre>");
        Ok(())
    }

    fn open_block(&self, language: &str, out: &mut String) -> Result<(), HighlightError> {
        out.push_str(r#"<pre class="highlight""#);
        if !self.options.with_classes {
            out.push_str(r#" style=""#);
            if let Some(background) = self.theme.settings.background {
                write!(out, "background-color:{};", hex(background))?;
            }
            write!(out, r#"tab-size:{}""#, self.options.tab_width)?;
        }
        out.push('>');

        if language.is_empty() {
            out.push_str("<code>");
        } else {
            write!(out, r#"<code class="language-{}">"#, escape_html(language))?;
        }
        Ok(())
    }

    /// CSS rules for the configured style, matching the classes emitted in
    /// class mode.
    pub fn stylesheet(&self) -> Result<String, HighlightError> {
        let mut css = css_for_theme_with_class_style(&self.theme, ClassStyle::Spaced)
            .map_err(|err| HighlightError::Format(err.to_string()))?;
        write!(
            css,
            "\n.highlight {{ tab-size: {0}; -moz-tab-size: {0}; }}\n",
            self.options.tab_width
        )?;
        Ok(css)
    }
}

/// `string.quoted.double.go` → `string quoted double go`.
fn scope_classes(scope: Scope) -> String {
    scope.build_string().replace('.', " ")
}

fn inline_style(style: Style) -> String {
    let mut css = format!("color:{}", hex(style.foreground));
    if style.font_style.contains(FontStyle::BOLD) {
        css.push_str(";font-weight:bold");
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        css.push_str(";font-style:italic");
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        css.push_str(";text-decoration:underline");
    }
    css
}

fn hex(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use pretty_assertions::assert_eq;

    fn formatter(options: FormatterOptions) -> Formatter {
        Formatter::new(options, &ThemeSet::load_defaults()).unwrap()
    }

    fn token<'a>(text: &'a str, scope: Option<&str>, line: usize) -> Result<Token<'a>, HighlightError> {
        Ok(Token {
            text: Cow::Borrowed(text),
            scope: scope.map(|name| Scope::new(name).unwrap()),
            line,
        })
    }

    #[test]
    fn test_default_options() {
        let options = FormatterOptions::default();
        assert!(options.with_classes);
        assert_eq!(options.tab_width, 4);
        assert_eq!(options.style, FALLBACK_STYLE);
    }

    #[test]
    fn test_unknown_style_fails_setup() {
        let options = FormatterOptions {
            style: "no-such-style".to_owned(),
            ..FormatterOptions::default()
        };
        let err = Formatter::new(options, &ThemeSet::load_defaults())
            .err()
            .unwrap();
        assert_eq!(err, HighlightError::Setup("no-such-style".to_owned()));
        assert!(err.to_string().contains("unable to set up output formatter"));
    }

    #[test]
    fn test_format_unclassified_text() {
        let mut out = String::new();
        formatter(FormatterOptions::default())
            .format("text", vec![token("a < b\n", None, 0)], &mut out)
            .unwrap();
        assert_eq!(
            out,
            r#"<pre class="highlight"><code class="language-text"><span class="line">a &lt; b
</span></code></pre>"#
        );
    }

    #[test]
    fn test_format_with_classes() {
        let mut out = String::new();
        formatter(FormatterOptions::default())
            .format(
                "python",
                vec![
                    token("if", Some("keyword.control.python"), 0),
                    token(" x\n", None, 0),
                    token("pass", Some("keyword.control.flow.python"), 1),
                ],
                &mut out,
            )
            .unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<pre class="highlight"><code class="language-python">"#,
                r#"<span class="line"><span class="keyword control python">if</span> x"#,
                "\n</span>",
                r#"<span class="line"><span class="keyword control flow python">pass</span></span>"#,
                "</code></pre>"
            )
        );
    }

    #[test]
    fn test_format_without_language() {
        let mut out = String::new();
        formatter(FormatterOptions::default())
            .format("", Vec::new(), &mut out)
            .unwrap();
        assert_eq!(out, r#"<pre class="highlight"><code></code></pre>"#);
    }

    #[test]
    fn test_format_inline_styles() {
        let options = FormatterOptions {
            with_classes: false,
            ..FormatterOptions::default()
        };
        let mut out = String::new();
        formatter(options)
            .format("c", vec![token("// hi", Some("comment.line.c"), 0)], &mut out)
            .unwrap();
        assert!(out.contains("tab-size:4"));
        assert!(out.contains(r#"<span style="color:#"#));
        assert!(!out.contains("comment line"));
    }

    #[test]
    fn test_format_stops_at_error() {
        let mut out = String::new();
        let result = formatter(FormatterOptions::default()).format(
            "text",
            vec![
                token("ok\n", None, 0),
                Err(HighlightError::Format("broken".to_owned())),
                token("never\n", None, 1),
            ],
            &mut out,
        );
        assert_eq!(result, Err(HighlightError::Format("broken".to_owned())));
        assert!(out.contains("ok"));
        assert!(!out.contains("never"));
    }

    #[test]
    fn test_stylesheet_includes_tab_width() {
        let css = formatter(FormatterOptions::default()).stylesheet().unwrap();
        assert!(css.contains("tab-size: 4"));
        assert!(css.contains(".comment"));
    }

    #[test]
    fn test_inline_style_font_flags() {
        let style = Style {
            foreground: Color { r: 255, g: 0, b: 16, a: 255 },
            background: Color::WHITE,
            font_style: FontStyle::BOLD | FontStyle::ITALIC,
        };
        assert_eq!(
            inline_style(style),
            "color:#ff0010;font-weight:bold;font-style:italic"
        );
    }
}
