//! PDF writer: lays a flat sequence of text lines onto A4 pages.
//!
//! Single column, built-in Helvetica, no images. Lines longer than the page
//! width are word-wrapped; a new page starts whenever the current one fills.
//! Content streams are left uncompressed.
//!
//! CPU-bound: callers on the async runtime must go through `tokio::task::spawn_blocking`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use thiserror::Error;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 56;
const FONT_SIZE: i64 = 11;
const LEADING: i64 = 15;
/// Conservative character budget for a Helvetica 11pt line inside the margins.
pub const MAX_LINE_CHARS: usize = 90;
pub const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LEADING) as usize;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode page content: {0}")]
    Encode(String),

    #[error("failed to serialize document: {0}")]
    Write(String),
}

/// Renders `lines` in order and returns the serialized PDF bytes.
/// `title` is recorded in the document information dictionary as a UTF-16
/// text string, so it survives even where Helvetica cannot draw it.
pub fn render_lines(title: &str, lines: &[String]) -> Result<Vec<u8>, RenderError> {
    let wrapped: Vec<String> = lines
        .iter()
        .flat_map(|line| wrap_line(line, MAX_LINE_CHARS))
        .collect();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    // An empty document still gets one blank page.
    let pages: Vec<&[String]> = if wrapped.is_empty() {
        vec![&wrapped[..]]
    } else {
        wrapped.chunks(LINES_PER_PAGE).collect()
    };

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page_lines in pages {
        let page_id = add_page(&mut doc, pages_id, page_lines)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(utf16_text_string(title), StringFormat::Hexadecimal),
        "Producer" => Object::string_literal(env!("CARGO_PKG_NAME")),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| RenderError::Write(e.to_string()))?;
    Ok(buffer)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    lines: &[String],
) -> Result<ObjectId, RenderError> {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new(
            "Td",
            vec![MARGIN.into(), (PAGE_HEIGHT - MARGIN - FONT_SIZE).into()],
        ),
    ];
    for line in lines {
        if !line.is_empty() {
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_text(line))],
            ));
        }
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let encoded = Content { operations }
        .encode()
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// Maps text onto single-byte WinAnsi (cp1252) codes; anything else becomes `?`.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> u8 {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
        0x09 => b' ',
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => b'?',
    }
}

/// PDF text string: UTF-16BE with a byte order mark.
fn utf16_text_string(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    bytes
}

/// Word-wraps `line` to at most `width` characters, keeping its leading indent
/// on continuation lines. Words longer than a line are split.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.chars().count() <= width {
        return vec![line.to_string()];
    }

    let indent: String = line
        .chars()
        .take_while(|c| *c == ' ')
        .take(width / 4)
        .collect();
    let indent_len = indent.chars().count();

    let mut out = Vec::new();
    let mut current = indent.clone();
    let mut current_len = indent_len;

    for word in line.split_whitespace() {
        let mut rest: Vec<char> = word.chars().collect();
        while !rest.is_empty() {
            let at_line_start = current_len == indent_len;
            let sep = usize::from(!at_line_start);

            if current_len + sep + rest.len() <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current_len += sep + rest.len();
                current.extend(rest.drain(..));
                break;
            }

            if at_line_start {
                let take = (width - current_len).min(rest.len());
                current.extend(rest.drain(..take));
            }
            out.push(std::mem::replace(&mut current, indent.clone()));
            current_len = indent_len;
        }
    }

    if current_len > indent_len || out.is_empty() {
        out.push(current);
    }
    out
}
