//! Attachment text extraction
//!
//! Turns a file on disk into a short text excerpt suitable for inclusion in
//! a prompt. [`parse_file`] never fails: unsupported types and extraction
//! errors come back as bracketed sentinel strings that are attached and
//! stored like any other content.

use crate::error::{MyIqError, Result};
use std::io::BufReader;
use std::path::Path;

/// Maximum characters kept from text-like and document files
pub const MAX_TEXT_CHARS: usize = 1000;

/// Data rows kept from CSV files, after the header
pub const CSV_PREVIEW_ROWS: usize = 5;

/// Sentinel returned for file types that cannot be extracted
pub const UNSUPPORTED: &str = "[Unsupported file type]";

/// File kinds the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain text, markdown, source code, notebooks
    Text,
    Csv,
    Pdf,
    Docx,
    Unsupported,
}

/// Classify a path by its lowercase extension
///
/// # Examples
///
/// ```
/// use myiq::extract::{detect_kind, FileKind};
/// use std::path::Path;
///
/// assert_eq!(detect_kind(Path::new("notes.TXT")), FileKind::Text);
/// assert_eq!(detect_kind(Path::new("photo.png")), FileKind::Unsupported);
/// ```
pub fn detect_kind(path: &Path) -> FileKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "md" | "py" | "ipynb" => FileKind::Text,
        "csv" => FileKind::Csv,
        "pdf" => FileKind::Pdf,
        "docx" => FileKind::Docx,
        _ => FileKind::Unsupported,
    }
}

/// Extract a prompt-sized excerpt from a file
///
/// Returns `"[Unsupported file type]"` for unknown extensions and
/// `"[Error parsing file: <reason>]"` when extraction fails.
pub fn parse_file(path: &Path) -> String {
    match extract_text(path) {
        Ok(Some(text)) => text,
        Ok(None) => UNSUPPORTED.to_string(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to parse attachment: {:#}", e);
            format!("[Error parsing file: {:#}]", e)
        }
    }
}

/// Extract text, returning `None` for unsupported file types
///
/// # Errors
///
/// Returns error if the file cannot be read or decoded
pub fn extract_text(path: &Path) -> Result<Option<String>> {
    let text = match detect_kind(path) {
        FileKind::Text => truncate_chars(&read_plaintext(path)?, MAX_TEXT_CHARS),
        FileKind::Csv => csv_preview(&read_plaintext(path)?, CSV_PREVIEW_ROWS),
        FileKind::Pdf => truncate_chars(extract_pdf(path)?.trim(), MAX_TEXT_CHARS),
        FileKind::Docx => truncate_chars(extract_docx(path)?.trim(), MAX_TEXT_CHARS),
        FileKind::Unsupported => return Ok(None),
    };
    tracing::debug!(path = %path.display(), chars = text.chars().count(), "Extracted attachment");
    Ok(Some(text))
}

fn read_plaintext(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    })
}

/// First `max` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn csv_preview(text: &str, rows: usize) -> String {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .take(rows + 1)
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_pdf(path: &Path) -> Result<String> {
    // pdf-extract panics on some malformed files
    let owned = path.to_path_buf();
    match std::panic::catch_unwind(move || pdf_extract::extract_text(&owned)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(MyIqError::Extraction(format!("PDF: {}", e)).into()),
        Err(_) => {
            Err(MyIqError::Extraction("PDF extraction panicked (malformed file)".into()).into())
        }
    }
}

fn extract_docx(path: &Path) -> Result<String> {
    use quick_xml::events::Event;

    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| MyIqError::Extraction(format!("DOCX zip: {}", e)))?;
    let doc = archive
        .by_name("word/document.xml")
        .map_err(|e| MyIqError::Extraction(format!("DOCX missing document.xml: {}", e)))?;

    let mut reader = quick_xml::Reader::from_reader(BufReader::new(doc));
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_run_text = true;
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_run_text => {
                if let Ok(s) = e.unescape() {
                    text.push_str(&s);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(MyIqError::Extraction(format!("DOCX XML: {}", e)).into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind(Path::new("a.py")), FileKind::Text);
        assert_eq!(detect_kind(Path::new("a.ipynb")), FileKind::Text);
        assert_eq!(detect_kind(Path::new("a.Csv")), FileKind::Csv);
        assert_eq!(detect_kind(Path::new("a.pdf")), FileKind::Pdf);
        assert_eq!(detect_kind(Path::new("a.docx")), FileKind::Docx);
        assert_eq!(detect_kind(Path::new("a.jpg")), FileKind::Unsupported);
        assert_eq!(detect_kind(Path::new("Makefile")), FileKind::Unsupported);
    }

    #[test]
    fn test_text_truncated_to_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("long.txt");
        std::fs::write(&path, "é".repeat(1500)).unwrap();

        let text = parse_file(&path);
        assert_eq!(text.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_short_text_kept_whole() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "notes.md", "# Notes\nbuy milk");
        assert_eq!(parse_file(&path), "# Notes\nbuy milk");
    }

    #[test]
    fn test_csv_header_and_five_rows() {
        let dir = temp_dir();
        let mut body = String::from("a,b\n");
        for i in 0..10 {
            body.push_str(&format!("{},{}\n", i, i * 2));
        }
        let path = create_test_file(&dir, "data.csv", &body);

        let text = parse_file(&path);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "a,b");
        assert_eq!(lines[5], "4,8");
    }

    #[test]
    fn test_unsupported_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [0x89, 0x50, 0x4e, 0x47]).unwrap();
        assert_eq!(parse_file(&path), UNSUPPORTED);
    }

    #[test]
    fn test_missing_file_is_error_sentinel() {
        let text = parse_file(Path::new("/nonexistent/notes.txt"));
        assert!(text.starts_with("[Error parsing file:"));
        assert!(text.ends_with(']'));
    }

    #[test]
    fn test_invalid_docx_is_error_sentinel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "not a zip").unwrap();
        assert!(parse_file(&path).starts_with("[Error parsing file: DOCX zip"));
    }

    #[test]
    fn test_docx_paragraph_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(
                "word/document.xml",
                zip::write::SimpleFileOptions::default(),
            )
            .unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>
<w:p><w:r><w:t>Second &amp; last</w:t></w:r></w:p>
</w:body>
</w:document>"#,
            )
            .unwrap();
        writer.finish().unwrap();

        assert_eq!(parse_file(&path), "Hello world\nSecond & last");
    }

    #[test]
    fn test_truncate_chars_boundaries() {
        assert_eq!(truncate_chars("abc", 5), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
