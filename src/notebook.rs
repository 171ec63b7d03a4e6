//! Notebook rendering and export
//!
//! Notebook content is markdown with optional TeX math. Rendering produces a
//! standalone HTML document that loads MathJax so `$...$` and `$$...$$`
//! expressions typeset in a browser.

use crate::error::{MyIqError, Result};
use crate::session::NotebookSession;
use anyhow::Context;
use pulldown_cmark::{html, Options, Parser};
use pulldown_cmark_escape::escape_html;
use std::path::Path;

const MATHJAX_SCRIPT: &str = r#"<script type="text/javascript" id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>"#;

/// Placeholder text markdown leaves alone; `{}` is the span index
const MATH_PLACEHOLDER: &str = "MYIQMATHSPAN{}X";

/// Render markdown to an HTML fragment
///
/// `$...$` and `$$...$$` spans are passed through verbatim (HTML-escaped)
/// so emphasis and escape rules do not mangle the TeX before MathJax sees
/// it.
pub fn render_body(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let (protected, spans) = protect_math(markdown);
    let parser = Parser::new_ext(&protected, options);
    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);

    for (i, span) in spans.iter().enumerate() {
        body = body.replace(&MATH_PLACEHOLDER.replace("{}", &i.to_string()), &escape(span));
    }
    body
}

/// Replace math spans with placeholders, returning the spans in order
fn protect_math(markdown: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(markdown.len());
    let mut spans = Vec::new();
    let mut rest = markdown;

    while let Some(pos) = rest.find('$') {
        if rest[..pos].ends_with('\\') {
            out.push_str(&rest[..=pos]);
            rest = &rest[pos + 1..];
            continue;
        }
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let end = if tail.starts_with("$$") {
            tail[2..].find("$$").map(|i| i + 4)
        } else {
            let inner = &tail[1..];
            match inner.find(['$', '\n']) {
                Some(i) if inner[i..].starts_with('$') && i > 0 && !inner.starts_with(' ') => {
                    Some(i + 2)
                }
                _ => None,
            }
        };

        match end {
            Some(len) => {
                out.push_str(&MATH_PLACEHOLDER.replace("{}", &spans.len().to_string()));
                spans.push(tail[..len].to_string());
                rest = &tail[len..];
            }
            None => {
                out.push('$');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    (out, spans)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // writing into a String cannot fail
    let _ = escape_html(&mut out, text);
    out
}

/// Render markdown to a complete HTML document with MathJax loaded
///
/// # Examples
///
/// ```
/// use myiq::notebook::render_html;
///
/// let page = render_html("Notes", "# Title\n\n$$E = mc^2$$");
/// assert!(page.contains("<h1>Title</h1>"));
/// assert!(page.contains("MathJax-script"));
/// ```
pub fn render_html(title: &str, markdown: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{}\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        MATHJAX_SCRIPT,
        render_body(markdown)
    )
}

/// Export formats supported by the notebook
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Html,
    #[value(name = "md")]
    Markdown,
}

impl ExportFormat {
    /// File extension used for this format
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Html => "html",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Default export file name: the title with path separators replaced
///
/// # Examples
///
/// ```
/// use myiq::notebook::default_export_name;
/// use myiq::session::NotebookSession;
///
/// let nb = NotebookSession::with_id("n1", "Q1/Q2 plan", "");
/// assert_eq!(default_export_name(&nb, "md"), "Q1_Q2 plan.md");
/// ```
pub fn default_export_name(notebook: &NotebookSession, ext: &str) -> String {
    let stem: String = notebook
        .title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "Untitled" } else { &stem };
    format!("{}.{}", stem, ext)
}

/// Write a notebook rendered as HTML
pub fn export_html(notebook: &NotebookSession, path: &Path) -> Result<()> {
    let page = render_html(&notebook.title, &notebook.content);
    write_export(path, &page)
}

/// Write a notebook's raw markdown
pub fn export_markdown(notebook: &NotebookSession, path: &Path) -> Result<()> {
    write_export(path, &notebook.content)
}

/// Export in the given format
pub fn export(notebook: &NotebookSession, format: ExportFormat, path: &Path) -> Result<()> {
    match format {
        ExportFormat::Html => export_html(notebook, path),
        ExportFormat::Markdown => export_markdown(notebook, path),
    }
}

fn write_export(path: &Path, contents: &str) -> Result<()> {
    if path.is_dir() {
        return Err(MyIqError::Export(format!("{} is a directory", path.display())).into());
    }
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Exported notebook");
    Ok(())
}
