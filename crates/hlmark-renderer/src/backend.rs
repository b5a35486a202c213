//! Render backend trait for format-specific rendering.
//!
//! The generic renderer walks the event stream and handles shared structure
//! (paragraphs, lists, tables, inline formatting). Elements whose markup is a
//! matter of output flavour are delegated to a backend.

/// A footnote collected during rendering, ready to be emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Footnote {
    /// Footnote number, assigned in order of first reference.
    pub number: usize,
    /// Label as written in the source (`[^label]`).
    pub label: String,
    /// Rendered body of the definition.
    pub html: String,
}

/// Backend trait for format-specific rendering operations.
///
/// Implementations provide format-specific rendering for:
/// - Code blocks that no processor claimed
/// - Blockquotes
/// - Images
/// - Math spans
/// - Footnote references and the trailing footnote section
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// # Arguments
    ///
    /// * `lang` - Optional language identifier (e.g., "rust", "python")
    /// * `content` - The code content
    /// * `out` - Output buffer to write to
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String);

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String);

    /// Render an image.
    ///
    /// # Arguments
    ///
    /// * `src` - Image source URL
    /// * `alt` - Alt text for the image
    /// * `title` - Optional title attribute
    /// * `out` - Output buffer to write to
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a math span. `display` is true for `$$...$$`.
    fn math(source: &str, display: bool, out: &mut String);

    /// Render a reference to footnote `number`.
    fn footnote_reference(label: &str, number: usize, out: &mut String);

    /// Render the collected footnotes at the end of the document.
    ///
    /// Called only when at least one footnote was defined.
    fn footnotes(footnotes: &[Footnote], return_links: bool, out: &mut String);

    /// Render a hard break.
    ///
    /// Default uses `<br>`.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a horizontal rule.
    ///
    /// Default uses `<hr>`.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }
}
