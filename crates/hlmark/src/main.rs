//! hlmark - Markdown to HTML converter.
//!
//! Reads Markdown from stdin and writes an HTML fragment to stdout, with
//! fenced code blocks syntax-highlighted.

mod error;
mod output;

use std::io::{self, IsTerminal, Read, Write};

use clap::Parser;
use hlmark_renderer::highlight::{FormatterOptions, HighlightError, HighlightProcessor, Highlighter};
use hlmark_renderer::{HtmlBackend, MarkdownRenderer};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

use error::CliError;
use output::Output;

/// hlmark - Convert Markdown on stdin to HTML on stdout.
#[derive(Parser)]
#[command(name = "hlmark", version, about)]
struct Cli;

fn main() {
    let _cli = Cli::parse();
    let output = Output::new();

    log_subscriber(io::stderr, io::stderr().is_terminal()).init();

    let highlighter = Highlighter::new(FormatterOptions::default());

    if let Err(err) = run(io::stdin().lock(), io::stdout().lock(), highlighter) {
        output.error(&err.to_string());
        std::process::exit(1);
    }
}

/// Subscriber printing warnings and errors as bare message lines.
fn log_subscriber<W>(writer: W, ansi: bool) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("warn"))
        .with_writer(writer)
        .with_ansi(ansi)
        .without_time()
        .with_target(false)
        .with_level(false)
        .finish()
}

/// Convert all of `input` and write the HTML to `output`.
fn run<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    highlighter: Result<Highlighter, HighlightError>,
) -> Result<(), CliError> {
    let mut source = Vec::new();
    input.read_to_end(&mut source).map_err(CliError::Read)?;
    tracing::debug!(bytes = source.len(), "Read markdown from stdin");
    let markdown = String::from_utf8_lossy(&source);

    let result = MarkdownRenderer::<HtmlBackend>::new()
        .with_processor(HighlightProcessor::new(highlighter))
        .render_markdown(&markdown);
    tracing::debug!(warnings = result.warnings.len(), "Rendered markdown");

    output
        .write_all(result.html.as_bytes())
        .and_then(|()| output.flush())
        .map_err(CliError::Write)
}
