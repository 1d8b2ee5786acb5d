use std::io::{Cursor, Read};

/// Mimetypes accepted by the upload pipeline.
pub const PDF: &str = "application/pdf";
pub const DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const PLAIN_TEXT: &str = "text/plain";

pub const ALLOWED_MIME_TYPES: [&str; 4] = [PDF, DOCX, PLAIN_TEXT, PPTX];

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("{0}")]
    Pdf(#[from] lopdf::Error),
    #[error("{0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Pulls plain text out of an uploaded file. Empty extractions yield a
/// "No text extracted from ..." marker rather than an error; callers decide
/// what a hard failure means for them.
pub fn extract_text(mimetype: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    match mimetype {
        PDF => extract_pdf(bytes),
        DOCX => extract_docx(bytes),
        PPTX => extract_pptx(bytes),
        PLAIN_TEXT => Ok(String::from_utf8_lossy(bytes).into_owned()),
        other => Err(ExtractError::UnsupportedType(other.to_string())),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let document = lopdf::Document::load_mem(bytes)?;
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document.extract_text(&pages)?;
    let text = text.trim();
    if text.is_empty() {
        Ok("No text extracted from PDF".to_string())
    } else {
        Ok(text.to_string())
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    let text = decode_entities(scan_tag_text(&xml, "w:t").trim());
    if text.is_empty() {
        Ok("No text extracted from DOCX".to_string())
    } else {
        Ok(text)
    }
}

fn extract_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut slide_names: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    slide_names.sort();

    let mut collected = String::new();
    for name in slide_names {
        let mut xml = String::new();
        archive.by_name(&name)?.read_to_string(&mut xml)?;
        collected.push_str(&scan_tag_text(&xml, "a:t"));
    }

    let text = decode_entities(collected.trim());
    if text.is_empty() {
        Ok("No text extracted from PPTX".to_string())
    } else {
        Ok(text)
    }
}

/// Collects the text bodies of every `<tag ...>text</tag>` occurrence.
/// A deliberate non-parse: OOXML text runs are flat, so a scan is enough
/// and keeps format internals out of scope.
fn scan_tag_text(xml: &str, tag: &str) -> String {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut out = String::new();
    let mut rest = xml;

    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(gt) = after.find('>') else { break };
        let head = &after[..gt];
        // Reject longer tag names sharing this prefix (w:t vs w:tab).
        if !(head.is_empty() || head.starts_with(' ') || head.starts_with('/')) {
            rest = after;
            continue;
        }
        if head.ends_with('/') {
            rest = &after[gt + 1..];
            continue;
        }
        let body = &after[gt + 1..];
        let Some(end) = body.find(&close) else { break };
        out.push_str(&body[..end]);
        out.push(' ');
        rest = &body[end + close.len()..];
    }
    out
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
