//! Markdown to HTML rendering with syntax-highlighted code blocks.
//!
//! This crate provides a generic [`MarkdownRenderer`] that walks the
//! pulldown-cmark event stream and delegates output-specific markup to a
//! [`RenderBackend`].
//!
//! # Architecture
//!
//! - [`HtmlBackend`]: Produces HTML5 fragments
//! - [`CodeBlockProcessor`]: Hook for replacing code block output
//! - [`highlight::HighlightProcessor`]: Processor that highlights code blocks
//!
//! Shared functionality (tables, lists, inline formatting, typography) is
//! handled by the generic renderer, while flavour-specific elements (code
//! blocks, blockquotes, images, math, footnotes) are delegated to the backend.
//!
//! # Example
//!
//! ```
//! use hlmark_renderer::highlight::{FormatterOptions, HighlightProcessor, Highlighter};
//! use hlmark_renderer::{HtmlBackend, MarkdownRenderer};
//!
//! let highlighter = Highlighter::new(FormatterOptions::default());
//! let result = MarkdownRenderer::<HtmlBackend>::new()
//!     .with_processor(HighlightProcessor::new(highlighter))
//!     .render_markdown("# Hello\n\n```go\nfunc main() {}\n```\n");
//!
//! assert!(result.html.starts_with("<h1>Hello</h1>"));
//! assert!(result.html.contains(r#"<pre class="highlight"><code class="language-go">"#));
//! ```

mod backend;
mod code_block;
pub mod highlight;
mod html;
mod renderer;
mod scripts;
mod smart;
mod state;
mod util;

pub use backend::{Footnote, RenderBackend};
pub use code_block::{CodeBlockProcessor, ProcessResult};
pub use html::HtmlBackend;
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::escape_html;
