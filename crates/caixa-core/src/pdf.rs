//! Text-only PDF rendering of the registration form.
//!
//! The writer emits a minimal PDF 1.4 document: one Helvetica font with
//! WinAnsi encoding, one content stream per A4 page and a computed xref
//! table. Characters outside Latin-1 are written as `?`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::form::RegistrationForm;

pub const PDF_MIME_TYPE: &str = "application/pdf";

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 56;
const TITLE_SIZE: u32 = 16;
const BODY_SIZE: u32 = 11;
const LEADING: u32 = 16;
/// Characters per body line at 11pt Helvetica within the margins.
const WRAP_COLUMNS: usize = 90;

const TITLE: &str = "Ficha cadastral";

/// Base64 payload ready for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDocument {
    pub file_name: String,
    pub mime_type: String,
    pub content_base64: String,
}

impl ExportedDocument {
    pub fn pdf(file_name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: PDF_MIME_TYPE.to_owned(),
            content_base64: STANDARD.encode(bytes),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.content_base64)
    }
}

/// Renders the form and wraps it for download.
pub fn export_registration_pdf(form: &RegistrationForm) -> ExportedDocument {
    ExportedDocument::pdf(registration_file_name(form), &render_registration_pdf(form))
}

/// `ficha-cadastral[-<legal name slug>].pdf`
pub fn registration_file_name(form: &RegistrationForm) -> String {
    let mut slug = String::new();
    for ch in form.legal_name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        String::from("ficha-cadastral.pdf")
    } else {
        format!("ficha-cadastral-{slug}.pdf")
    }
}

/// One `Label: value` line group per non-empty field, word-wrapped.
pub fn registration_lines(form: &RegistrationForm) -> Vec<String> {
    form.labelled_fields()
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .flat_map(|(label, value)| {
            value
                .trim()
                .lines()
                .enumerate()
                .flat_map(move |(index, line)| {
                    let text = if index == 0 {
                        format!("{label}: {}", line.trim())
                    } else {
                        format!("  {}", line.trim())
                    };
                    wrap(&text, WRAP_COLUMNS)
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn render_registration_pdf(form: &RegistrationForm) -> Vec<u8> {
    let lines = registration_lines(form);
    let body_top = PAGE_HEIGHT - MARGIN - TITLE_SIZE - LEADING;
    let lines_per_page = ((body_top - MARGIN) / LEADING).max(1) as usize;

    let mut pages: Vec<Vec<u8>> = Vec::new();
    let empty: &[String] = &[];
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![empty]
    } else {
        lines.chunks(lines_per_page).collect()
    };

    for (index, chunk) in chunks.iter().enumerate() {
        let mut content = Vec::new();
        if index == 0 {
            push_text(&mut content, "F2", TITLE_SIZE, MARGIN, PAGE_HEIGHT - MARGIN - TITLE_SIZE, TITLE);
        }
        let mut y = body_top;
        for line in chunk.iter() {
            push_text(&mut content, "F1", BODY_SIZE, MARGIN, y, line);
            y -= LEADING;
        }
        pages.push(content);
    }

    write_document(&pages)
}

fn push_text(out: &mut Vec<u8>, font: &str, size: u32, x: u32, y: u32, text: &str) {
    out.extend_from_slice(format!("BT /{font} {size} Tf {x} {y} Td (").as_bytes());
    out.extend_from_slice(&encode_win_ansi(text));
    out.extend_from_slice(b") Tj ET\n");
}

/// Latin-1 bytes with PDF string escapes.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                bytes.push(b'\\');
                bytes.push(ch as u8);
            }
            '\t' => bytes.push(b' '),
            ch if (ch as u32) < 0x20 => {}
            ch if (ch as u32) <= 0x7e || ((ch as u32) >= 0xa0 && (ch as u32) <= 0xff) => {
                bytes.push(ch as u32 as u8)
            }
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

/// Greedy word wrap by characters; leading indentation is repeated on
/// continuation lines and words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let indent = text.chars().take_while(|ch| *ch == ' ').collect::<String>();
    let room = width.saturating_sub(indent.len()).max(1);
    let mut lines = Vec::new();
    let mut current = indent.clone();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars = word.chars().collect::<Vec<_>>();
        while chars.len() > room {
            if current_len > 0 {
                lines.push(std::mem::replace(&mut current, indent.clone()));
                current_len = 0;
            }
            let rest = chars.split_off(room);
            current.extend(chars);
            lines.push(std::mem::replace(&mut current, indent.clone()));
            chars = rest;
        }

        if current_len > 0 && current_len + 1 + chars.len() > room {
            lines.push(std::mem::replace(&mut current, indent.clone()));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

fn write_document(pages: &[Vec<u8>]) -> Vec<u8> {
    // Objects: 1 catalog, 2 page tree, 3 body font, 4 title font, then a
    // (page, content) pair per page.
    let page_ids = (0..pages.len())
        .map(|index| 5 + index * 2)
        .collect::<Vec<_>>();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()).into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    for (page_id, content) in page_ids.iter().zip(pages) {
        objects.push(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page_id + 1
            )
            .into_bytes(),
        );
        let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        stream.extend_from_slice(content);
        stream.extend_from_slice(b"\nendstream");
        objects.push(stream);
    }

    let mut out = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, object) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        out.extend_from_slice(object);
        out.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}
