//! HTML backend for markdown rendering.

use std::fmt::Write;

use crate::backend::{Footnote, RenderBackend};
use crate::state::escape_html;

/// HTML render backend.
///
/// Produces HTML5 with:
/// - `<pre><code>` for code blocks no processor claimed
/// - `<blockquote>` for blockquotes
/// - `<img>` for images
/// - MathJax-style delimiters for math spans
/// - A trailing `<div class="footnotes">` section
pub struct HtmlBackend;

impl RenderBackend for HtmlBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(out, "<pre><code>{}</code></pre>", escape_html(content)).unwrap();
        }
    }

    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    fn image(src: &str, alt: &str, title: &str, out: &mut String) {
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    fn math(source: &str, display: bool, out: &mut String) {
        let source = escape_html(source);
        if display {
            write!(out, r#"<span class="math display">\[{source}\]</span>"#).unwrap();
        } else {
            write!(out, r#"<span class="math inline">\({source}\)</span>"#).unwrap();
        }
    }

    fn footnote_reference(label: &str, number: usize, out: &mut String) {
        let label = escape_html(label);
        write!(
            out,
            r##"<sup class="footnote-ref" id="fnref:{label}"><a href="#fn:{label}">{number}</a></sup>"##
        )
        .unwrap();
    }

    fn footnotes(footnotes: &[Footnote], return_links: bool, out: &mut String) {
        out.push_str(r#"<div class="footnotes"><hr><ol>"#);
        for footnote in footnotes {
            let label = escape_html(&footnote.label);
            write!(out, r#"<li id="fn:{label}">{}"#, footnote.html).unwrap();
            if return_links {
                write!(
                    out,
                    r##"<a class="footnote-return" href="#fnref:{label}"><sup>[return]</sup></a>"##
                )
                .unwrap();
            }
            out.push_str("</li>");
        }
        out.push_str("</ol></div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        HtmlBackend::code_block(Some("rust"), "fn main() {}", &mut out);
        assert_eq!(
            out,
            r#"<pre><code class="language-rust">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        HtmlBackend::code_block(None, "a < b", &mut out);
        assert_eq!(out, "<pre><code>a &lt; b</code></pre>");
    }

    #[test]
    fn test_blockquote() {
        let mut out = String::new();
        HtmlBackend::blockquote_start(&mut out);
        out.push_str("content");
        HtmlBackend::blockquote_end(&mut out);
        assert_eq!(out, "<blockquote>content</blockquote>");
    }

    #[test]
    fn test_image() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt text", "", &mut out);
        assert_eq!(out, r#"<img src="image.png" alt="Alt text">"#);
    }

    #[test]
    fn test_image_with_title() {
        let mut out = String::new();
        HtmlBackend::image("image.png", "Alt text", "Image title", &mut out);
        assert_eq!(
            out,
            r#"<img src="image.png" title="Image title" alt="Alt text">"#
        );
    }

    #[test]
    fn test_inline_math() {
        let mut out = String::new();
        HtmlBackend::math("a < b", false, &mut out);
        assert_eq!(out, r#"<span class="math inline">\(a &lt; b\)</span>"#);
    }

    #[test]
    fn test_display_math() {
        let mut out = String::new();
        HtmlBackend::math("x^2", true, &mut out);
        assert_eq!(out, r#"<span class="math display">\[x^2\]</span>"#);
    }

    #[test]
    fn test_footnote_reference() {
        let mut out = String::new();
        HtmlBackend::footnote_reference("note", 3, &mut out);
        assert_eq!(
            out,
            r##"<sup class="footnote-ref" id="fnref:note"><a href="#fn:note">3</a></sup>"##
        );
    }

    fn sample_footnotes() -> Vec<Footnote> {
        vec![Footnote {
            number: 1,
            label: "a".to_owned(),
            html: "<p>Body.</p>".to_owned(),
        }]
    }

    #[test]
    fn test_footnotes_with_return_links() {
        let mut out = String::new();
        HtmlBackend::footnotes(&sample_footnotes(), true, &mut out);
        assert_eq!(
            out,
            concat!(
                r#"<div class="footnotes"><hr><ol>"#,
                r#"<li id="fn:a"><p>Body.</p>"#,
                r##"<a class="footnote-return" href="#fnref:a"><sup>[return]</sup></a></li>"##,
                "</ol></div>"
            )
        );
    }

    #[test]
    fn test_footnotes_without_return_links() {
        let mut out = String::new();
        HtmlBackend::footnotes(&sample_footnotes(), false, &mut out);
        assert!(!out.contains("footnote-return"));
        assert!(out.contains(r#"<li id="fn:a"><p>Body.</p></li>"#));
    }
}
